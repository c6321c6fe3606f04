//! Interface graph model
//!
//! A [`Graph`] owns every [`Interface`] by id. Interfaces own their parents
//! and member lists; nothing in the model points back into the graph, so any
//! derived view (mixin set, emission order) is recomputed from ids.

use crate::error::CoreError;
use crate::types::{collection_element_type, IdlType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Property bag attached to an annotation, e.g. `{"via": "Node"}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotation(pub BTreeMap<String, serde_json::Value>);

impl Annotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Marked as displaced to another interface
    pub fn is_displaced(&self) -> bool {
        self.0.contains_key("via")
    }

    pub fn is_suppressed(&self) -> bool {
        self.0.contains_key("suppressed")
    }
}

pub type Annotations = BTreeMap<String, Annotation>;

/// Extended attributes; flags carry no value
pub type ExtAttrs = BTreeMap<String, Option<String>>;

/// Anything the annotation filter can keep or drop
pub trait Annotated {
    fn annotations(&self) -> &Annotations;
}

macro_rules! impl_annotated {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Annotated for $ty {
                fn annotations(&self) -> &Annotations {
                    &self.annotations
                }
            }

            impl $ty {
                /// Attach a bare annotation
                pub fn annotated(self, name: impl Into<String>) -> Self {
                    self.with_annotation(name, Annotation::new())
                }

                pub fn with_annotation(mut self, name: impl Into<String>, annotation: Annotation) -> Self {
                    self.annotations.insert(name.into(), annotation);
                    self
                }
            }
        )*
    };
}

impl_annotated!(Interface, Parent, Attribute, Operation, Constant);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parent {
    #[serde(rename = "type")]
    pub type_: IdlType,
    #[serde(default)]
    pub annotations: Annotations,
}

impl Parent {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_: IdlType::new(type_name),
            annotations: Annotations::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: IdlType,
    #[serde(default)]
    pub optional: bool,
}

impl Argument {
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_: IdlType::new(type_name),
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

fn default_true() -> bool {
    true
}

/// One side (or both sides) of an attribute accessor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: IdlType,
    #[serde(default = "default_true")]
    pub is_getter: bool,
    #[serde(default)]
    pub is_setter: bool,
    /// Replaceable setters are treated as absent
    #[serde(default)]
    pub replaceable: bool,
    #[serde(default)]
    pub get_raises: Option<IdlType>,
    #[serde(default)]
    pub set_raises: Option<IdlType>,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub ext_attrs: ExtAttrs,
}

impl Attribute {
    pub fn getter(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_: IdlType::new(type_name),
            is_getter: true,
            is_setter: false,
            replaceable: false,
            get_raises: None,
            set_raises: None,
            annotations: Annotations::new(),
            ext_attrs: ExtAttrs::new(),
        }
    }

    pub fn setter(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            is_getter: false,
            is_setter: true,
            ..Self::getter(id, type_name)
        }
    }

    pub fn replaceable(mut self) -> Self {
        self.replaceable = true;
        self
    }

    /// Name used for emitted accessors, honoring `DartName`
    pub fn dom_name(&self) -> &str {
        ext_attr_value(&self.ext_attrs, "DartName").unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub id: String,
    /// Return type
    #[serde(rename = "type")]
    pub type_: IdlType,
    #[serde(default)]
    pub arguments: Vec<Argument>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub raises: Option<IdlType>,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub ext_attrs: ExtAttrs,
}

impl Operation {
    pub fn new(id: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_: IdlType::new(return_type),
            arguments: Vec::new(),
            is_static: false,
            raises: None,
            annotations: Annotations::new(),
            ext_attrs: ExtAttrs::new(),
        }
    }

    pub fn with_arg(mut self, id: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.arguments.push(Argument::new(id, type_name));
        self
    }

    pub fn with_optional_arg(mut self, id: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.arguments.push(Argument::new(id, type_name).optional());
        self
    }

    pub fn static_op(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Emitted name, honoring `DartName`
    pub fn name(&self) -> &str {
        ext_attr_value(&self.ext_attrs, "DartName").unwrap_or(&self.id)
    }

    /// `(return type, name, parameter types)` key used to deduplicate overloads
    pub fn signature(&self) -> String {
        let params: Vec<&str> = self.arguments.iter().map(|a| a.type_.id.as_str()).collect();
        format!("{} {}({})", self.type_.id, self.name(), params.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: IdlType,
    pub value: String,
    #[serde(default)]
    pub annotations: Annotations,
}

impl Constant {
    pub fn new(
        id: impl Into<String>,
        type_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            type_: IdlType::new(type_name),
            value: value.into(),
            annotations: Annotations::new(),
        }
    }
}

/// A named API contract node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interface {
    pub id: String,
    /// `parents[0]` is the primary parent; the rest are secondary
    #[serde(default)]
    pub parents: Vec<Parent>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default)]
    pub constants: Vec<Constant>,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub ext_attrs: ExtAttrs,
    /// IDL module, used to pick the emitted package
    #[serde(default)]
    pub module: Option<String>,
    /// JavaScript constructor name when it differs from `id`
    #[serde(default)]
    pub js_name: Option<String>,
    #[serde(default)]
    pub constructor: Option<Vec<Argument>>,
}

impl Interface {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parents: Vec::new(),
            attributes: Vec::new(),
            operations: Vec::new(),
            constants: Vec::new(),
            annotations: Annotations::new(),
            ext_attrs: ExtAttrs::new(),
            module: None,
            js_name: None,
            constructor: None,
        }
    }

    pub fn with_parent(mut self, type_name: impl Into<String>) -> Self {
        self.parents.push(Parent::new(type_name));
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_constant(mut self, constant: Constant) -> Self {
        self.constants.push(constant);
        self
    }

    pub fn with_ext_attr(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        self.ext_attrs.insert(name.into(), value.map(str::to_string));
        self
    }

    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_constructor(mut self, arguments: Vec<Argument>) -> Self {
        self.constructor = Some(arguments);
        self
    }

    pub fn primary_parent(&self) -> Option<&Parent> {
        self.parents.first()
    }

    pub fn secondary_parents(&self) -> &[Parent] {
        self.parents.get(1..).unwrap_or(&[])
    }

    pub fn has_parent(&self, type_name: &str) -> bool {
        self.parents.iter().any(|p| p.type_.id == type_name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.id == name)
    }

    pub fn has_operation(&self, name: &str) -> bool {
        self.operations.iter().any(|o| o.id == name)
    }

    pub fn has_ext_attr(&self, name: &str) -> bool {
        self.ext_attrs.contains_key(name)
    }

    /// Name of the JavaScript constructor backing this interface
    pub fn binding_name(&self) -> &str {
        self.js_name.as_deref().unwrap_or(&self.id)
    }

    /// Element type when this interface directly extends a collection
    pub fn list_element_type(&self) -> Option<&str> {
        self.parents
            .iter()
            .find_map(|p| collection_element_type(&p.type_.id))
    }

    /// Merge another interface's members into this one.
    ///
    /// Operations and constants are appended as-is; an attribute is only
    /// taken when no attribute of the same name already exists here.
    pub fn merge_members(&mut self, other: Interface) {
        self.operations.extend(other.operations);
        for attribute in other.attributes {
            if !self.has_attribute(&attribute.id) {
                self.attributes.push(attribute);
            }
        }
        self.constants.extend(other.constants);
    }

    /// Visit every type reference held anywhere in this interface
    pub fn for_each_type_mut(&mut self, mut visit: impl FnMut(&mut IdlType)) {
        for parent in &mut self.parents {
            visit(&mut parent.type_);
        }
        for attribute in &mut self.attributes {
            visit(&mut attribute.type_);
            if let Some(raises) = &mut attribute.get_raises {
                visit(raises);
            }
            if let Some(raises) = &mut attribute.set_raises {
                visit(raises);
            }
        }
        for operation in &mut self.operations {
            visit(&mut operation.type_);
            for argument in &mut operation.arguments {
                visit(&mut argument.type_);
            }
            if let Some(raises) = &mut operation.raises {
                visit(raises);
            }
        }
        for constant in &mut self.constants {
            visit(&mut constant.type_);
        }
        if let Some(arguments) = &mut self.constructor {
            for argument in arguments {
                visit(&mut argument.type_);
            }
        }
    }

    /// Exception types raised by any member
    pub fn raised_types(&self) -> impl Iterator<Item = &IdlType> {
        let from_attributes = self
            .attributes
            .iter()
            .flat_map(|a| a.get_raises.iter().chain(a.set_raises.iter()));
        let from_operations = self.operations.iter().filter_map(|o| o.raises.as_ref());
        from_attributes.chain(from_operations)
    }
}

fn ext_attr_value<'a>(ext_attrs: &'a ExtAttrs, name: &str) -> Option<&'a str> {
    ext_attrs.get(name).and_then(|v| v.as_deref())
}

/// The interface database: every interface keyed by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Interface>", into = "Vec<Interface>")]
pub struct Graph {
    interfaces: BTreeMap<String, Interface>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph, rejecting duplicate ids
    pub fn from_interfaces(
        interfaces: impl IntoIterator<Item = Interface>,
    ) -> Result<Self, CoreError> {
        let mut graph = Self::new();
        for interface in interfaces {
            if graph.has_interface(&interface.id) {
                return Err(CoreError::DuplicateInterface(interface.id));
            }
            graph.add_interface(interface);
        }
        Ok(graph)
    }

    /// Load a database dump; `.yaml`/`.yml` files are read as YAML, anything
    /// else as JSON.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Self::from_json_str(&content)
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn has_interface(&self, id: &str) -> bool {
        self.interfaces.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Interface> {
        self.interfaces.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Interface> {
        self.interfaces.get_mut(id)
    }

    /// Look up an interface that must exist
    pub fn require(&self, id: &str) -> Result<&Interface, CoreError> {
        self.get(id)
            .ok_or_else(|| CoreError::InterfaceNotFound(id.to_string()))
    }

    /// Insert an interface under its id, returning any interface it replaced
    pub fn add_interface(&mut self, interface: Interface) -> Option<Interface> {
        self.interfaces.insert(interface.id.clone(), interface)
    }

    pub fn remove_interface(&mut self, id: &str) -> Option<Interface> {
        self.interfaces.remove(id)
    }

    /// Interfaces in id order
    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.values()
    }

    pub fn interfaces_mut(&mut self) -> impl Iterator<Item = &mut Interface> {
        self.interfaces.values_mut()
    }

    /// Ids in sorted order
    pub fn ids(&self) -> Vec<String> {
        self.interfaces.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}

impl TryFrom<Vec<Interface>> for Graph {
    type Error = CoreError;

    fn try_from(interfaces: Vec<Interface>) -> Result<Self, Self::Error> {
        Self::from_interfaces(interfaces)
    }
}

impl From<Graph> for Vec<Interface> {
    fn from(graph: Graph) -> Self {
        graph.interfaces.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_uses_dart_name() {
        let mut op = Operation::new("item", "Node").with_arg("index", "unsigned long");
        assert_eq!(op.signature(), "Node item(unsigned long)");

        op.ext_attrs
            .insert("DartName".to_string(), Some("at".to_string()));
        assert_eq!(op.name(), "at");
        assert_eq!(op.signature(), "Node at(unsigned long)");
    }

    #[test]
    fn test_primary_and_secondary_parents() {
        let iface = Interface::new("Element")
            .with_parent("Node")
            .with_parent("NodeSelector")
            .with_parent("ElementTraversal");

        assert_eq!(iface.primary_parent().map(|p| p.type_.id.as_str()), Some("Node"));
        let secondary: Vec<&str> = iface
            .secondary_parents()
            .iter()
            .map(|p| p.type_.id.as_str())
            .collect();
        assert_eq!(secondary, vec!["NodeSelector", "ElementTraversal"]);

        let root = Interface::new("Node");
        assert!(root.primary_parent().is_none());
        assert!(root.secondary_parents().is_empty());
    }

    #[test]
    fn test_merge_members_keeps_existing_attribute() {
        let mut target = Interface::new("B")
            .with_attribute(Attribute::getter("x", "long"))
            .with_attribute(Attribute::getter("y", "long"));
        let source = Interface::new("A")
            .with_operation(Operation::new("f", "void"))
            .with_attribute(Attribute::getter("x", "DOMString"))
            .with_constant(Constant::new("K", "short", "1"));

        target.merge_members(source);

        assert_eq!(target.operations.len(), 1);
        assert_eq!(target.constants.len(), 1);
        assert_eq!(target.attributes.len(), 2);
        let x = target.attributes.iter().find(|a| a.id == "x").unwrap();
        assert_eq!(x.type_.id, "long");
    }

    #[test]
    fn test_graph_rejects_duplicate_ids() {
        let result = Graph::from_interfaces(vec![Interface::new("Node"), Interface::new("Node")]);
        assert!(matches!(result, Err(CoreError::DuplicateInterface(id)) if id == "Node"));
    }

    #[test]
    fn test_graph_json_shape() {
        let json = r#"[
            {
                "id": "Element",
                "parents": [{"type": "Node"}],
                "attributes": [
                    {"id": "title", "type": "DOMString", "is_getter": true},
                    {"id": "title", "type": "DOMString", "is_getter": false, "is_setter": true}
                ],
                "operations": [
                    {"id": "getAttribute", "type": "DOMString",
                     "arguments": [{"id": "name", "type": "DOMString"}]}
                ],
                "annotations": {"WebKit": {}, "FremontCut": {"via": "Node"}},
                "ext_attrs": {"EventTarget": null}
            },
            {"id": "Node"}
        ]"#;

        let graph = Graph::from_json_str(json).unwrap();
        assert_eq!(graph.ids(), vec!["Element", "Node"]);

        let element = graph.get("Element").unwrap();
        assert!(element.has_ext_attr("EventTarget"));
        assert!(element.annotations["FremontCut"].is_displaced());
        assert!(!element.annotations["WebKit"].is_displaced());
        assert!(element.attributes[1].is_setter);
        assert_eq!(element.operations[0].arguments[0].id, "name");
    }

    #[test]
    fn test_for_each_type_mut_visits_all_references() {
        let mut iface = Interface::new("X")
            .with_parent("P")
            .with_attribute(Attribute::getter("a", "A"))
            .with_operation(Operation::new("f", "R").with_arg("p", "Q"))
            .with_constant(Constant::new("K", "short", "1"))
            .with_constructor(vec![Argument::new("c", "C")]);

        let mut seen = Vec::new();
        iface.for_each_type_mut(|t| seen.push(t.id.clone()));
        assert_eq!(seen, vec!["P", "A", "R", "Q", "short", "C"]);
    }

    #[test]
    fn test_list_element_type() {
        let list = Interface::new("NodeList").with_parent("List<Node>");
        assert_eq!(list.list_element_type(), Some("Node"));
        assert_eq!(Interface::new("Node").list_element_type(), None);
    }
}

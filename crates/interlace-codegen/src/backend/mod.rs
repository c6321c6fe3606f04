//! Emission backends
//!
//! The generator drives every attached backend through the same sequence of
//! calls per interface:
//!
//! ```text
//! start_interface
//!   add_constant*            (sorted by name)
//!   add_attribute*           (getter/setter pairs, sorted by name)
//!   add_indexer?             (interfaces extending a collection)
//!   add_operation* / add_static_operation*
//!   add_secondary_attribute* / add_secondary_operation*
//! finish_interface
//! ```
//!
//! Callback interfaces bypass this sequence and go through
//! [`Backend::process_callback`] instead.

pub mod interfaces;
pub mod jso;

use crate::analysis::{CallbackInfo, OperationInfo, Param};
use crate::config::GeneratorConfig;
use crate::emitter::MultiEmitter;
use crate::java::{java_identifier, Flavor, ImportTracker, JavaType, JavaTypes};
use crate::templates::{TemplateLoader, UnitFrame};
use crate::CodegenError;
use interlace_core::types::is_collection_type;
use interlace_core::{Attribute, Constant, Graph, Interface, MixinSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub use interfaces::InterfacesBackend;
pub use jso::JsoBackend;

/// Everything a backend may consult while emitting one interface
#[derive(Debug, Clone)]
pub struct InterfaceContext<'a> {
    pub interface: &'a Interface,
    pub graph: &'a Graph,
    pub mixins: &'a MixinSet,
    pub config: &'a GeneratorConfig,
    pub types: JavaTypes<'a>,
    /// Secondary ancestors that pass the source filter, deduplicated by raw
    /// type name. For the mixin base this is every mixin instead.
    pub implements: Vec<String>,
}

impl<'a> InterfaceContext<'a> {
    pub fn id(&self) -> &'a str {
        &self.interface.id
    }

    pub fn is_mixin_base(&self) -> bool {
        self.interface.id == self.config.mixin_base
    }

    pub fn is_mixin(&self, id: &str) -> bool {
        self.mixins.contains(id)
    }

    /// Primary parent, when it is a real interface in the graph
    pub fn primary_interface(&self) -> Option<&'a Interface> {
        let parent = self.interface.primary_parent()?;
        if is_collection_type(&parent.type_.id) {
            return None;
        }
        self.graph.get(&parent.type_.id)
    }
}

/// A getter/setter pair of one attribute name
#[derive(Debug, Clone, Copy)]
pub struct AttributePair<'a> {
    pub getter: Option<&'a Attribute>,
    pub setter: Option<&'a Attribute>,
    pub inherited_getter: bool,
    pub inherited_setter: bool,
}

impl<'a> AttributePair<'a> {
    pub fn new(getter: Option<&'a Attribute>, setter: Option<&'a Attribute>) -> Self {
        Self {
            getter,
            setter,
            inherited_getter: false,
            inherited_setter: false,
        }
    }

    /// Either side; at least one is always present
    pub fn attribute(&self) -> Option<&'a Attribute> {
        self.getter.or(self.setter)
    }
}

/// The per-interface emission protocol
pub trait Backend {
    fn name(&self) -> &'static str;

    /// Called once with the final mixin set, before any interface
    fn prepare(&mut self, _graph: &Graph, _mixins: &MixinSet) {}

    /// Whether this backend emits anything for the interface at all
    fn accepts(&self, _ctx: &InterfaceContext<'_>) -> bool {
        true
    }

    fn start_interface(&mut self, ctx: &InterfaceContext<'_>) -> Result<(), CodegenError>;

    fn add_constant(
        &mut self,
        ctx: &InterfaceContext<'_>,
        constant: &Constant,
    ) -> Result<(), CodegenError>;

    fn add_attribute(
        &mut self,
        ctx: &InterfaceContext<'_>,
        pair: &AttributePair<'_>,
    ) -> Result<(), CodegenError>;

    fn add_indexer(
        &mut self,
        ctx: &InterfaceContext<'_>,
        element_type: &str,
    ) -> Result<(), CodegenError>;

    fn add_operation(
        &mut self,
        ctx: &InterfaceContext<'_>,
        info: &OperationInfo,
        inherited: bool,
    ) -> Result<(), CodegenError>;

    fn add_static_operation(
        &mut self,
        ctx: &InterfaceContext<'_>,
        info: &OperationInfo,
        inherited: bool,
    ) -> Result<(), CodegenError>;

    fn add_secondary_attribute(
        &mut self,
        ctx: &InterfaceContext<'_>,
        owner: &Interface,
        pair: &AttributePair<'_>,
    ) -> Result<(), CodegenError>;

    fn add_secondary_operation(
        &mut self,
        ctx: &InterfaceContext<'_>,
        owner: &Interface,
        info: &OperationInfo,
    ) -> Result<(), CodegenError>;

    fn finish_interface(
        &mut self,
        ctx: &InterfaceContext<'_>,
        emitter: &mut MultiEmitter,
    ) -> Result<(), CodegenError>;

    fn process_callback(
        &mut self,
        ctx: &InterfaceContext<'_>,
        callback: &CallbackInfo,
        emitter: &mut MultiEmitter,
    ) -> Result<(), CodegenError>;

    fn finish(&mut self, _emitter: &mut MultiEmitter) -> Result<(), CodegenError> {
        Ok(())
    }
}

/// The closed set of backends a target can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Pure Java interfaces
    Interfaces,
    /// JavaScriptObject overlay classes
    Jso,
}

impl BackendKind {
    /// Template subdirectories searched for overrides, most specific first
    pub fn template_search_paths(self) -> &'static [&'static str] {
        match self {
            BackendKind::Interfaces => &["dom/interface", "dom", ""],
            BackendKind::Jso => &["dom/jso", "dom", ""],
        }
    }

    pub fn build(self, config: &GeneratorConfig) -> Result<Box<dyn Backend>, CodegenError> {
        let templates =
            TemplateLoader::new(config.template_dir.as_deref(), self.template_search_paths())?;
        Ok(match self {
            BackendKind::Interfaces => Box::new(InterfacesBackend::new(templates)),
            BackendKind::Jso => Box::new(JsoBackend::new(templates)),
        })
    }
}

impl FromStr for BackendKind {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interfaces" | "gwt" => Ok(BackendKind::Interfaces),
            "jso" | "gwtjso" => Ok(BackendKind::Jso),
            other => Err(CodegenError::UnknownBackend(other.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Interfaces => write!(f, "interfaces"),
            BackendKind::Jso => write!(f, "jso"),
        }
    }
}

/// Indentation used for members
pub(crate) const INDENT: &str = "  ";

/// One compilation unit being built between `start_interface` and
/// `finish_interface`
#[derive(Debug)]
pub(crate) struct UnitBuilder {
    pub name: String,
    pub package: String,
    pub imports: ImportTracker,
    pub declaration: String,
    members: Vec<String>,
}

impl UnitBuilder {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        let package = package.into();
        Self {
            name: name.into(),
            imports: ImportTracker::new(package.clone()),
            package,
            declaration: String::new(),
            members: Vec::new(),
        }
    }

    /// Add one member; members are separated by a blank line
    pub fn member(&mut self, text: String) {
        self.members.push(text);
    }

    /// Map a type and record its import
    pub fn java_type(&mut self, types: &JavaTypes<'_>, idl: &str, flavor: Flavor) -> JavaType {
        let java_type = types.map(idl, flavor);
        self.imports.add(&java_type);
        java_type
    }

    /// `(declared parameters, argument names)` of an overload
    pub fn params(&mut self, types: &JavaTypes<'_>, params: &[Param], flavor: Flavor) -> (String, String) {
        let mut declared = Vec::with_capacity(params.len());
        let mut names = Vec::with_capacity(params.len());
        for param in params {
            let java_type = self.java_type(types, &param.type_id, flavor);
            let name = java_identifier(&param.name);
            declared.push(format!("{} {}", java_type.name, name));
            names.push(name);
        }
        (declared.join(", "), names.join(", "))
    }

    /// Output path relative to the output root
    pub fn path(&self) -> PathBuf {
        let mut path: PathBuf = self.package.split('.').collect();
        path.push(format!("{}.java", self.name));
        path
    }

    pub fn render(
        self,
        templates: &TemplateLoader,
        template: &str,
        emitter: &mut MultiEmitter,
    ) -> Result<(), CodegenError> {
        let path = self.path();
        let body = self
            .members
            .iter()
            .map(|m| format!("\n{}", m))
            .collect::<Vec<_>>()
            .join("\n");
        let frame = UnitFrame {
            package: self.package,
            imports: self.imports.imports(),
            name: self.name,
            declaration: self.declaration,
            body,
        };
        let text = templates.render(template, &frame)?;
        emitter.append(path, &text);
        Ok(())
    }
}

/// Comma-separated names, first occurrence wins
pub(crate) fn type_list(names: &[String]) -> String {
    let mut seen = BTreeSet::new();
    names
        .iter()
        .filter(|n| seen.insert(n.as_str()))
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_names() {
        let cases = vec![
            ("interfaces", BackendKind::Interfaces),
            ("gwt", BackendKind::Interfaces),
            ("jso", BackendKind::Jso),
            ("gwtjso", BackendKind::Jso),
        ];
        for (name, expected) in cases {
            assert_eq!(name.parse::<BackendKind>().unwrap(), expected, "parse({})", name);
        }

        let err = "dart".parse::<BackendKind>().unwrap_err();
        assert!(matches!(err, CodegenError::UnknownBackend(name) if name == "dart"));
    }

    #[test]
    fn test_pair_attribute_prefers_getter() {
        let getter = Attribute::getter("title", "DOMString");
        let setter = Attribute::setter("title", "DOMString");

        assert_eq!(
            AttributePair::new(Some(&getter), Some(&setter)).attribute(),
            Some(&getter)
        );
        assert_eq!(AttributePair::new(None, Some(&setter)).attribute(), Some(&setter));
    }

    #[test]
    fn test_unit_path_follows_package() {
        let unit = UnitBuilder::new("JsNode", "elemental.js.dom");
        assert_eq!(unit.path(), PathBuf::from("elemental/js/dom/JsNode.java"));
    }

    #[test]
    fn test_type_list_deduplicates() {
        let names = vec!["Node".to_string(), "Indexable".to_string(), "Node".to_string()];
        assert_eq!(type_list(&names), "Node, Indexable");
    }
}

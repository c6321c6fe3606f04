//! Members synthesized onto the factory root and the global root
//!
//! - The factory root (`Document`) gets one `createX()` per element type
//!   other than the excluded abstract roots.
//! - The global root (`Window`) gets three `newX(..)` factories per typed
//!   array plus one factory per constructor-bearing interface.
//!
//! Both lists are computed from the filtered graph; backends only render them.

use crate::analysis::{analyze_constructor, ConstructorInfo};
use crate::CodegenError;
use interlace_core::special_cases::{is_typed_array, ARRAY_BUFFER};
use interlace_core::Graph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Element types whose tag and method name share a prefix, such as SVG
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixGroup {
    pub prefix: String,
    /// Root type of the group, e.g. `SVGSVGElement`
    pub root: String,
    /// Name substituted for the root type, e.g. `SVG`
    pub root_name: String,
    /// Namespace URI elements of the group are created in
    pub namespace: String,
    /// Overlay helper that creates a namespaced element
    pub helper: String,
}

/// How element types turn into creation methods
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryNaming {
    pub suffix: String,
    /// Abstract roots that never get a creation method
    pub excluded: Vec<String>,
    /// Irregular tag names, keyed by the computed tag
    pub tag_remap: BTreeMap<String, String>,
    pub prefix_groups: Vec<PrefixGroup>,
}

impl Default for FactoryNaming {
    fn default() -> Self {
        Self {
            suffix: "Element".to_string(),
            excluded: vec!["Element".to_string(), "SVGElement".to_string()],
            tag_remap: [("tablecaption".to_string(), "caption".to_string())]
                .into_iter()
                .collect(),
            prefix_groups: vec![PrefixGroup {
                prefix: "SVG".to_string(),
                root: "SVGSVGElement".to_string(),
                root_name: "SVG".to_string(),
                namespace: "http://www.w3.org/2000/svg".to_string(),
                helper: "createSvgElement".to_string(),
            }],
        }
    }
}

/// One `createX()` method on the factory root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryMethod {
    pub method: String,
    /// Interface id of the created element
    pub element: String,
    pub tag: String,
    /// Prefix group the element belongs to, if any
    pub group: Option<PrefixGroup>,
}

impl FactoryNaming {
    /// Creation method for `id`, or `None` when `id` is not an element type
    pub fn factory_method(&self, id: &str) -> Option<FactoryMethod> {
        let base = id.strip_suffix(self.suffix.as_str())?;
        if base.is_empty() || self.excluded.iter().any(|e| e == id) {
            return None;
        }

        let group = self
            .prefix_groups
            .iter()
            .find(|g| id.starts_with(g.prefix.as_str()))
            .cloned();

        let (name, tag) = match &group {
            Some(g) if g.root == id => (g.root_name.clone(), g.root_name.to_lowercase()),
            Some(g) => {
                let lowered = base.to_lowercase();
                let tag = lowered.get(g.prefix.len()..).unwrap_or("").to_string();
                (base.to_string(), tag)
            }
            None => (base.to_string(), base.to_lowercase()),
        };
        let tag = self.tag_remap.get(&tag).cloned().unwrap_or(tag);

        Some(FactoryMethod {
            method: format!("create{}", name),
            element: id.to_string(),
            tag,
            group,
        })
    }
}

/// Creation methods for every element type except the excluded roots, in
/// id order
pub fn factory_methods(graph: &Graph, naming: &FactoryNaming) -> Vec<FactoryMethod> {
    graph
        .interfaces()
        .filter_map(|iface| naming.factory_method(&iface.id))
        .collect()
}

/// Three `newX(..)` overloads on the global root for one typed array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedArrayFactory {
    pub interface: String,
    pub js_name: String,
    /// IDL type of the source-list parameter
    pub list_type: &'static str,
}

impl TypedArrayFactory {
    pub fn method(&self) -> String {
        format!("new{}", self.interface)
    }
}

/// Typed array factories in id order.
///
/// Fails when a typed array exists but `ArrayBuffer` does not: the
/// buffer-backed overload cannot be expressed without it.
pub fn typed_array_factories(
    graph: &Graph,
    global_root: &str,
) -> Result<Vec<TypedArrayFactory>, CodegenError> {
    let mut factories = Vec::new();
    for iface in graph.interfaces() {
        if !is_typed_array(graph, iface) {
            continue;
        }
        if !graph.has_interface(ARRAY_BUFFER) {
            return Err(CodegenError::missing_interface(
                ARRAY_BUFFER,
                format!("{}.new{}", global_root, iface.id),
            ));
        }
        let list_type = if iface.id.starts_with("Float") {
            "sequence<double>"
        } else {
            "sequence<long>"
        };
        factories.push(TypedArrayFactory {
            interface: iface.id.clone(),
            js_name: iface.binding_name().to_string(),
            list_type,
        });
    }
    Ok(factories)
}

/// Constructor factories for every non-typed-array interface with a constructor
pub fn constructor_factories(graph: &Graph) -> Vec<ConstructorInfo> {
    graph
        .interfaces()
        .filter(|iface| !is_typed_array(graph, iface))
        .filter_map(analyze_constructor)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use interlace_core::idl::Argument;
    use interlace_core::Interface;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_factory_method_naming() {
        let naming = FactoryNaming::default();
        let cases = vec![
            ("ButtonElement", "createButton", "button"),
            ("TableCaptionElement", "createTableCaption", "caption"),
            ("SVGAElement", "createSVGA", "a"),
            ("SVGSVGElement", "createSVG", "svg"),
        ];

        for (id, method, tag) in cases {
            let factory = naming.factory_method(id).unwrap();
            assert_eq!(factory.method, method, "method for {}", id);
            assert_eq!(factory.tag, tag, "tag for {}", id);
        }

        assert!(naming.factory_method("Element").is_none());
        assert!(naming.factory_method("SVGElement").is_none());
        assert!(naming.factory_method("Document").is_none());
        assert!(naming.factory_method("ButtonElement").unwrap().group.is_none());
        assert!(naming.factory_method("SVGAElement").unwrap().group.is_some());
    }

    #[test]
    fn test_factory_methods_cover_intermediate_element_types() {
        let graph = Graph::from_interfaces(vec![
            Interface::new("Node"),
            Interface::new("Element").with_parent("Node"),
            Interface::new("MediaElement").with_parent("Element"),
            Interface::new("VideoElement").with_parent("MediaElement"),
            Interface::new("ButtonElement").with_parent("Element"),
        ])
        .unwrap();

        let methods: Vec<String> = factory_methods(&graph, &FactoryNaming::default())
            .into_iter()
            .map(|f| f.method)
            .collect();
        assert_eq!(methods, vec!["createButton", "createMedia", "createVideo"]);
    }

    #[test]
    fn test_typed_arrays_need_array_buffer() {
        let mut graph = Graph::from_interfaces(vec![
            Interface::new("ArrayBufferView"),
            Interface::new("Float32Array").with_parent("ArrayBufferView"),
            Interface::new("Uint8Array").with_parent("ArrayBufferView"),
        ])
        .unwrap();

        let err = typed_array_factories(&graph, "Window").unwrap_err();
        assert!(matches!(
            err,
            CodegenError::MissingInterface { ref name, ref context }
                if name == "ArrayBuffer" && context == "Window.newFloat32Array"
        ));

        graph.add_interface(Interface::new("ArrayBuffer"));
        let factories = typed_array_factories(&graph, "Window").unwrap();
        let summary: Vec<(String, &str)> = factories
            .iter()
            .map(|f| (f.method(), f.list_type))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("newFloat32Array".to_string(), "sequence<double>"),
                ("newUint8Array".to_string(), "sequence<long>"),
            ]
        );
    }

    #[test]
    fn test_constructor_factories_skip_typed_arrays() {
        let graph = Graph::from_interfaces(vec![
            Interface::new("ArrayBufferView"),
            Interface::new("Float32Array")
                .with_parent("ArrayBufferView")
                .with_constructor(vec![Argument::new("length", "unsigned long")]),
            Interface::new("XMLHttpRequest").with_constructor(vec![]),
        ])
        .unwrap();

        let ids: Vec<String> = constructor_factories(&graph)
            .into_iter()
            .map(|c| c.interface_id)
            .collect();
        assert_eq!(ids, vec!["XMLHttpRequest"]);
    }
}

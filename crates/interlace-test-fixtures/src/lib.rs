//! Test fixtures for interlace
//!
//! Canned interface graphs plus on-disk databases and configs for the CLI
//! tests.

use interlace_core::idl::Argument;
use interlace_core::{Attribute, Constant, Graph, Interface, Operation};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

/// Fixture categories
pub enum FixtureType {
    /// A handful of DOM interfaces with a factory root
    MinimalDom,
    /// Two platforms sharing one database
    MultiPlatform,
}

/// The five-interface end-to-end graph: `Document` is the factory root and
/// `ButtonElement` its only concrete element type
pub fn end_to_end_graph() -> Graph {
    Graph::from_interfaces(vec![
        Interface::new("Node"),
        Interface::new("Element").with_parent("Node"),
        Interface::new("ButtonElement").with_parent("Element"),
        Interface::new("Document").with_parent("Node"),
        Interface::new("Window").with_parent("EventTargetCapable"),
    ])
    .expect("fixture ids are unique")
}

/// `Shared` is inherited from two unrelated lineages
pub fn diamond_graph() -> Graph {
    Graph::from_interfaces(vec![
        Interface::new("Base"),
        Interface::new("OtherBase"),
        Interface::new("Shared")
            .with_attribute(Attribute::getter("shared", "DOMString"))
            .with_operation(Operation::new("share", "void").with_arg("depth", "long")),
        Interface::new("Foo").with_parent("Base"),
        Interface::new("Bar").with_parent("Base").with_parent("Shared"),
        Interface::new("Baz").with_parent("OtherBase").with_parent("Shared"),
    ])
    .expect("fixture ids are unique")
}

/// A small but realistic DOM slice touching every backend feature
pub fn dom_graph() -> Graph {
    Graph::from_interfaces(vec![
        Interface::new("EventTarget").in_module("events").with_operation(
            Operation::new("addEventListener", "void")
                .with_arg("type", "DOMString")
                .with_arg("listener", "EventListener")
                .with_optional_arg("useCapture", "boolean"),
        ),
        Interface::new("Event")
            .in_module("events")
            .with_attribute(Attribute::getter("type", "DOMString")),
        Interface::new("EventListener")
            .in_module("events")
            .with_ext_attr("Callback", None)
            .with_operation(Operation::new("handleEvent", "void").with_arg("evt", "Event")),
        Interface::new("Node")
            .with_ext_attr("EventTarget", None)
            .with_constant(Constant::new("TEXT_NODE", "unsigned short", "3"))
            .with_constant(Constant::new("ELEMENT_NODE", "unsigned short", "1"))
            .with_attribute(Attribute::getter("nodeName", "DOMString"))
            .with_attribute(Attribute::getter("textContent", "DOMString"))
            .with_attribute(Attribute::setter("textContent", "DOMString"))
            .with_operation(
                Operation::new("appendChild", "Node").with_arg("newChild", "Node"),
            )
            .with_operation(Operation::new("toString", "DOMString")),
        Interface::new("ElementTraversal")
            .with_attribute(Attribute::getter("firstElementChild", "Element")),
        Interface::new("Element")
            .with_parent("Node")
            .with_parent("ElementTraversal")
            .with_attribute(Attribute::getter("onclick", "EventListener"))
            .with_attribute(Attribute::setter("onclick", "EventListener"))
            .with_attribute(Attribute::getter("id", "DOMString"))
            .with_attribute(Attribute::setter("id", "DOMString")),
        Interface::new("ButtonElement")
            .with_parent("Element")
            .with_attribute(Attribute::getter("disabled", "boolean"))
            .with_attribute(Attribute::setter("disabled", "boolean")),
        Interface::new("NodeList")
            .with_parent("sequence<Node>")
            .with_attribute(Attribute::getter("length", "unsigned long")),
        Interface::new("Document")
            .with_parent("Node")
            .with_operation(
                Operation::new("createElement", "Element").with_arg("tagName", "DOMString"),
            )
            .with_operation(
                Operation::new("createElementNS", "Element")
                    .with_arg("namespaceURI", "DOMString")
                    .with_arg("qualifiedName", "DOMString"),
            ),
        Interface::new("XMLHttpRequest")
            .with_ext_attr("EventTarget", None)
            .with_constructor(vec![])
            .with_operation(
                Operation::new("open", "void")
                    .with_arg("method", "DOMString")
                    .with_arg("url", "DOMString"),
            ),
        Interface::new("Window")
            .with_parent("EventTarget")
            .with_attribute(Attribute::getter("document", "Document"))
            .with_attribute(Attribute::getter("location", "DOMString"))
            .with_attribute(Attribute::setter("location", "DOMString").replaceable()),
        Interface::new("URL")
            .with_operation(
                Operation::new("createObjectURL", "DOMString")
                    .with_arg("blob", "Blob")
                    .static_op(),
            )
            .with_operation(
                Operation::new("revokeObjectURL", "void")
                    .with_arg("url", "DOMString")
                    .static_op(),
            ),
        Interface::new("Blob").with_attribute(Attribute::getter("size", "unsigned long long")),
    ])
    .expect("fixture ids are unique")
}

/// `dom_graph` plus typed arrays and their buffer
pub fn typed_array_graph() -> Graph {
    let mut graph = dom_graph();
    graph.add_interface(Interface::new("ArrayBuffer").with_attribute(Attribute::getter(
        "byteLength",
        "unsigned long",
    )));
    graph.add_interface(Interface::new("ArrayBufferView"));
    graph.add_interface(
        Interface::new("Float32Array")
            .with_parent("ArrayBufferView")
            .with_parent("sequence<double>")
            .with_constructor(vec![Argument::new("length", "unsigned long")]),
    );
    graph.add_interface(
        Interface::new("Uint8Array")
            .with_parent("ArrayBufferView")
            .with_parent("sequence<long>"),
    );
    graph
}

/// Temporary on-disk fixtures
pub struct TestFixtures {
    temp_dir: Option<tempfile::TempDir>,
}

impl Default for TestFixtures {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixtures {
    pub fn new() -> Self {
        Self { temp_dir: None }
    }

    /// Create a temporary directory holding `database.json` and
    /// `interlace.toml`
    pub fn setup(&mut self, fixture_type: FixtureType) -> PathBuf {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().to_path_buf();

        match fixture_type {
            FixtureType::MinimalDom => self.setup_minimal_dom(&path),
            FixtureType::MultiPlatform => self.setup_multi_platform(&path),
        }

        self.temp_dir = Some(dir);
        path
    }

    fn setup_minimal_dom(&self, base: &Path) {
        let database = json!([
            { "id": "Node", "attributes": [{ "id": "nodeName", "type": "DOMString" }] },
            { "id": "Element", "parents": [{ "type": "Node" }] },
            { "id": "ButtonElement", "parents": [{ "type": "Element" }] },
            {
                "id": "Document",
                "parents": [{ "type": "Node" }],
                "operations": [{
                    "id": "createElement",
                    "type": "Element",
                    "arguments": [{ "id": "tagName", "type": "DOMString" }]
                }]
            }
        ]);
        write_json(&base.join("database.json"), &database);

        fs::write(
            base.join("interlace.toml"),
            format!(
                r#"
[[targets]]
name = "dom"
output_dir = "{}"
systems = ["interfaces", "jso"]
"#,
                base.join("out").display()
            ),
        )
        .expect("write config");
    }

    fn setup_multi_platform(&self, base: &Path) {
        let database = json!([
            { "id": "Node", "annotations": { "WebKit": {}, "Gecko": {} } },
            {
                "id": "Element",
                "parents": [{ "type": "Node", "annotations": { "WebKit": {}, "Gecko": {} } }],
                "annotations": { "WebKit": {}, "Gecko": {} },
                "attributes": [
                    { "id": "webkitRegionOverset", "type": "DOMString", "annotations": { "WebKit": {} } },
                    { "id": "mozRequestFullScreen", "type": "DOMString", "annotations": { "Gecko": {} } }
                ]
            },
            { "id": "WebKitPoint", "annotations": { "WebKit": {} } },
            { "id": "DOMWindow", "annotations": { "WebKit": {}, "Gecko": {} } }
        ]);
        write_json(&base.join("database.json"), &database);

        fs::write(
            base.join("interlace.toml"),
            format!(
                r#"
[[targets]]
name = "webkit"
output_dir = "{0}"
systems = ["interfaces"]

[targets.filter]
require_any = ["WebKit"]

[[targets.renames]]
table = {{ DOMWindow = "Window" }}

[[targets]]
name = "gecko"
output_dir = "{1}"
systems = ["interfaces"]

[targets.filter]
require_any = ["Gecko"]
"#,
                base.join("webkit").display(),
                base.join("gecko").display()
            ),
        )
        .expect("write config");
    }
}

fn write_json(path: &Path, value: &serde_json::Value) {
    let text = serde_json::to_string_pretty(value).expect("serialize fixture");
    fs::write(path, text).expect("write fixture");
}

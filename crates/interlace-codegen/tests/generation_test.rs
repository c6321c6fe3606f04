//! Generated Java for canned graphs, through both backends

use interlace_codegen::{BackendKind, CodegenError, GenerationReport, Generator, GeneratorConfig, MultiEmitter};
use interlace_core::{Graph, Interface, Operation};
use interlace_test_fixtures::{diamond_graph, dom_graph, end_to_end_graph, typed_array_graph};

const BOTH: &[BackendKind] = &[BackendKind::Interfaces, BackendKind::Jso];

fn generate(graph: &mut Graph, config: &GeneratorConfig) -> (MultiEmitter, GenerationReport) {
    let mut generator = Generator::from_kinds(config, BOTH).unwrap();
    let mut emitter = MultiEmitter::new();
    let report = generator.generate(graph, &mut emitter).unwrap();
    (emitter, report)
}

fn unit<'a>(emitter: &'a MultiEmitter, path: &str) -> &'a str {
    emitter
        .unit(path)
        .unwrap_or_else(|| panic!("no unit {}", path))
}

#[test]
fn test_factory_root_gains_create_button() {
    let config = GeneratorConfig::default();
    let (emitter, report) = generate(&mut end_to_end_graph(), &config);

    let document = unit(&emitter, "elemental/dom/Document.java");
    assert!(document.contains("public interface Document extends Node {"));
    assert!(document.contains("  ButtonElement createButton();"));

    let js_document = unit(&emitter, "elemental/js/dom/JsDocument.java");
    assert!(js_document.contains(
        "  public final JsButtonElement createButton() {\n    return createElement(\"button\").cast();\n  }"
    ));

    assert_eq!(report.interfaces.first().map(String::as_str), Some("ElementalMixinBase"));
    assert!(report.callbacks.is_empty());
}

#[test]
fn test_contract_interfaces() {
    let config = GeneratorConfig::default();
    let (emitter, _) = generate(&mut dom_graph(), &config);

    let node = unit(&emitter, "elemental/dom/Node.java");
    assert!(node.starts_with("package elemental.dom;\n"));
    assert!(node.contains("import elemental.events.EventTarget;"));
    assert!(node.contains("public interface Node extends EventTarget {"));
    let element_node = node.find("static final int ELEMENT_NODE = 1;").unwrap();
    let text_node = node.find("static final int TEXT_NODE = 3;").unwrap();
    assert!(element_node < text_node);
    assert!(node.contains("  String getTextContent();"));
    assert!(node.contains("  void setTextContent(String arg);"));
    assert!(node.contains("  Node appendChild(Node newChild);"));
    assert!(!node.contains("toString"));

    let element = unit(&emitter, "elemental/dom/Element.java");
    assert!(element.contains("public interface Element extends Node, ElementTraversal {"));
    assert!(!element.contains("getFirstElementChild"));

    let node_list = unit(&emitter, "elemental/dom/NodeList.java");
    assert!(node_list.contains("import elemental.util.Indexable;"));
    assert!(node_list.contains("public interface NodeList extends Indexable {"));
    assert!(node_list.contains("  Node at(int index);"));

    let button = unit(&emitter, "elemental/dom/ButtonElement.java");
    assert!(button.contains("  boolean isDisabled();"));

    assert!(emitter.unit("elemental/dom/ElementalMixinBase.java").is_none());
}

#[test]
fn test_optional_arguments_expand_into_overloads() {
    let config = GeneratorConfig::default();
    let (emitter, _) = generate(&mut dom_graph(), &config);

    let target = unit(&emitter, "elemental/events/EventTarget.java");
    assert!(target.contains("  void addEventListener(String type, EventListener listener);"));
    assert!(target.contains(
        "  void addEventListener(String type, EventListener listener, boolean useCapture);"
    ));
}

#[test]
fn test_replaceable_attribute_has_no_setter() {
    let config = GeneratorConfig::default();
    let (emitter, _) = generate(&mut dom_graph(), &config);

    for path in ["elemental/dom/Window.java", "elemental/js/dom/JsWindow.java"] {
        let window = unit(&emitter, path);
        assert!(window.contains("getLocation()"), "{}", path);
        assert!(!window.contains("setLocation"), "{}", path);
    }
}

#[test]
fn test_callbacks_only_produce_contract_interfaces() {
    let config = GeneratorConfig::default();
    let (emitter, report) = generate(&mut dom_graph(), &config);

    assert_eq!(report.callbacks, vec!["EventListener"]);
    let listener = unit(&emitter, "elemental/events/EventListener.java");
    assert!(listener.contains("public interface EventListener {\n\n  void handleEvent(Event evt);\n}"));
    assert!(emitter.unit("elemental/js/events/JsEventListener.java").is_none());
}

#[test]
fn test_overlay_hierarchy() {
    let config = GeneratorConfig::default();
    let (emitter, report) = generate(&mut dom_graph(), &config);

    assert!(report.mixins.contains("ElementTraversal"));

    let base = unit(&emitter, "elemental/js/dom/JsElementalMixinBase.java");
    assert!(base.contains("import com.google.gwt.core.client.JavaScriptObject;"));
    assert!(base.contains(
        "public class JsElementalMixinBase extends JavaScriptObject implements ElementTraversal {"
    ));
    assert!(base.contains("  protected JsElementalMixinBase() {}"));
    assert!(base.contains("  public final native JsElement getFirstElementChild() /*-{"));
    assert!(base.contains("public static native EventListener getListenerFor(JavaScriptObject handler)"));
    assert!(base.contains("public static native JavaScriptObject getHandlerFor(EventListener listener)"));

    let target = unit(&emitter, "elemental/js/events/JsEventTarget.java");
    assert!(target.contains("import elemental.js.dom.JsElementalMixinBase;"));
    assert!(target.contains("public class JsEventTarget extends JsElementalMixinBase implements EventTarget {"));

    let element = unit(&emitter, "elemental/js/dom/JsElement.java");
    assert!(element.contains("public class JsElement extends JsNode implements Element, ElementTraversal {"));
    assert!(!element.contains("getFirstElementChild"));
    assert!(element.contains(
        "  public final native String getId() /*-{\n    return this.id;\n  }-*/;"
    ));
    assert!(element.contains(
        "  public final native void setId(String param_id) /*-{\n    this.id = param_id;\n  }-*/;"
    ));

    let node = unit(&emitter, "elemental/js/dom/JsNode.java");
    assert!(node.contains(
        "  public final native JsNode appendChild(Node newChild) /*-{\n    return this.appendChild(newChild);\n  }-*/;"
    ));
    assert!(!node.contains("ELEMENT_NODE"));

    let node_list = unit(&emitter, "elemental/js/dom/JsNodeList.java");
    assert!(node_list.contains("  public final native JsNode at(int index) /*-{\n    return this[index];\n  }-*/;"));
}

#[test]
fn test_event_listener_attributes_use_mixin_base_helpers() {
    let config = GeneratorConfig::default();
    let (emitter, _) = generate(&mut dom_graph(), &config);

    let element = unit(&emitter, "elemental/js/dom/JsElement.java");
    assert!(element.contains(
        "    return @elemental.js.dom.JsElementalMixinBase::getListenerFor(Lcom/google/gwt/core/client/JavaScriptObject;)(this.onclick);"
    ));
    assert!(element.contains("  public final native void setOnclick(EventListener listener) /*-{"));
    assert!(element.contains(
        "    this.onclick = @elemental.js.dom.JsElementalMixinBase::getHandlerFor(Lelemental/events/EventListener;)(listener);"
    ));
}

#[test]
fn test_static_operations_call_the_global_constructor() {
    let config = GeneratorConfig::default();
    let (emitter, _) = generate(&mut dom_graph(), &config);

    let url = unit(&emitter, "elemental/js/dom/JsURL.java");
    assert!(url.contains(
        "  public static native String createObjectURL(Blob blob) /*-{\n    return $wnd.URL.createObjectURL(blob);\n  }-*/;"
    ));
    assert!(url.contains("    $wnd.URL.revokeObjectURL(url);"));

    let contract = unit(&emitter, "elemental/dom/URL.java");
    assert!(!contract.contains("createObjectURL"));
}

#[test]
fn test_global_root_constructor_factories() {
    let config = GeneratorConfig::default();
    let (emitter, _) = generate(&mut dom_graph(), &config);

    let window = unit(&emitter, "elemental/dom/Window.java");
    assert!(window.contains("  XMLHttpRequest newXMLHttpRequest();"));

    let js_window = unit(&emitter, "elemental/js/dom/JsWindow.java");
    assert!(js_window.contains(
        "  public final native JsXMLHttpRequest newXMLHttpRequest() /*-{ return new XMLHttpRequest(); }-*/;"
    ));
}

#[test]
fn test_typed_array_factories() {
    let config = GeneratorConfig::default();
    let (emitter, _) = generate(&mut typed_array_graph(), &config);

    let window = unit(&emitter, "elemental/js/dom/JsWindow.java");
    assert!(window.contains(
        "  public final native JsFloat32Array newFloat32Array(int length) /*-{ return new Float32Array(length); }-*/;"
    ));
    assert!(window.contains(
        "  public final native JsFloat32Array newFloat32Array(IndexableNumber list) /*-{ return new Float32Array(list); }-*/;"
    ));
    assert!(window.contains(
        "  public final native JsUint8Array newUint8Array(ArrayBuffer buffer, int byteOffset, int length) /*-{ return new Uint8Array(buffer, byteOffset, length); }-*/;"
    ));
    assert_eq!(window.matches("newFloat32Array(int length)").count(), 1);

    let contract = unit(&emitter, "elemental/dom/Window.java");
    assert!(contract.contains("  Uint8Array newUint8Array(IndexableInt list);"));
}

#[test]
fn test_typed_arrays_without_buffer_abort_the_run() {
    let config = GeneratorConfig::default();
    let mut graph = typed_array_graph();
    graph.remove_interface("ArrayBuffer");

    let mut generator = Generator::from_kinds(&config, BOTH).unwrap();
    let err = generator
        .generate(&mut graph, &mut MultiEmitter::new())
        .unwrap_err();
    assert!(matches!(
        err,
        CodegenError::MissingInterface { ref name, .. } if name == "ArrayBuffer"
    ));
}

#[test]
fn test_auxiliary_interfaces_are_skipped() {
    let config = GeneratorConfig::default();
    let mut generator = Generator::from_kinds(&config, BOTH)
        .unwrap()
        .with_auxiliary(["Window"]);
    let mut emitter = MultiEmitter::new();

    let report = generator.generate(&mut dom_graph(), &mut emitter).unwrap();

    assert_eq!(report.skipped, vec!["Window"]);
    assert!(emitter.unit("elemental/dom/Window.java").is_none());
    assert!(emitter.unit("elemental/js/dom/JsWindow.java").is_none());
}

#[test]
fn test_diamond_members_move_to_mixin_base() {
    let config = GeneratorConfig::default();
    let (emitter, report) = generate(&mut diamond_graph(), &config);

    assert!(report.mixins.contains("Shared"));

    let base = unit(&emitter, "elemental/js/dom/JsElementalMixinBase.java");
    assert!(base.contains("implements Shared {"));
    assert!(base.contains("getShared()"));
    assert!(base.contains("share(int depth)"));

    for name in ["JsBar", "JsBaz"] {
        let path = format!("elemental/js/dom/{}.java", name);
        let overlay = unit(&emitter, &path);
        assert!(overlay.contains("Shared {"), "{}", name);
        assert!(!overlay.contains("getShared"), "{}", name);
    }

    let bar = unit(&emitter, "elemental/dom/Bar.java");
    assert!(bar.contains("public interface Bar extends Base, Shared {"));
}

#[test]
fn test_template_override() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("dom/jso")).unwrap();
    std::fs::write(dir.path().join("dom/jso/jso.java.hbs"), "// overlay {{name}}\n").unwrap();

    let config = GeneratorConfig {
        template_dir: Some(dir.path().to_path_buf()),
        ..GeneratorConfig::default()
    };
    let (emitter, _) = generate(&mut end_to_end_graph(), &config);

    assert_eq!(unit(&emitter, "elemental/js/dom/JsNode.java"), "// overlay JsNode\n");
    assert!(unit(&emitter, "elemental/dom/Node.java").starts_with("package elemental.dom;"));
}

#[test]
fn test_overlay_keeps_overloads_from_every_secondary_ancestor() {
    let mut graph = Graph::from_interfaces(vec![
        Interface::new("Root"),
        Interface::new("Scrollable")
            .with_operation(Operation::new("scroll", "void").with_arg("x", "long")),
        Interface::new("Pageable")
            .with_operation(Operation::new("scroll", "void").with_arg("x", "DOMString"))
            .with_operation(
                Operation::new("scroll", "void")
                    .with_arg("x", "long")
                    .with_optional_arg("smooth", "boolean"),
            ),
        Interface::new("Pager")
            .with_parent("Root")
            .with_parent("Scrollable")
            .with_parent("Pageable"),
    ])
    .unwrap();
    let config = GeneratorConfig::default();
    let (emitter, _) = generate(&mut graph, &config);

    let pager = unit(&emitter, "elemental/js/dom/JsPager.java");
    assert_eq!(pager.matches("public final native void scroll(int x)").count(), 1);
    assert!(pager.contains("public final native void scroll(String x)"));
    assert!(pager.contains("public final native void scroll(int x, boolean smooth)"));
}

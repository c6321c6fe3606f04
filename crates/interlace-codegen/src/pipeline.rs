//! filter -> rename -> generate -> flush, once per configured target
//!
//! Each target works on its own clone of the loaded graph, so two targets
//! may filter the same database differently.

use crate::config::{GeneratorConfig, TargetConfig};
use crate::emitter::MultiEmitter;
use crate::generator::{GenerationReport, Generator};
use crate::CodegenError;
use interlace_core::filter::filter_unidentified_members;
use interlace_core::{FilterReport, Graph};
use tracing::info;

/// Filter and rename a snapshot of `graph` for one target
pub fn prepare_graph(graph: &Graph, target: &TargetConfig) -> (Graph, FilterReport) {
    let mut graph = graph.clone();

    let report = match &target.filter {
        Some(filter) => filter.apply(&mut graph),
        None => FilterReport {
            unidentified: filter_unidentified_members(&mut graph),
            ..FilterReport::default()
        },
    };
    info!(
        "{}: {} interfaces after filtering ({} removed)",
        target.name,
        graph.len(),
        report.removed_interfaces.len()
    );

    for pass in &target.renames {
        let renamed = pass.apply(&mut graph);
        info!("{}: renamed {} interfaces", target.name, renamed);
    }
    (graph, report)
}

/// Generate one target into memory without touching the disk
pub fn generate_target(
    graph: &Graph,
    config: &GeneratorConfig,
    target: &TargetConfig,
) -> Result<(MultiEmitter, GenerationReport), CodegenError> {
    let (mut graph, filter_report) = prepare_graph(graph, target);

    let mut generator = Generator::from_kinds(config, &target.systems)?;
    generator.load_auxiliary()?;

    let mut emitter = MultiEmitter::new();
    let mut report = generator.generate(&mut graph, &mut emitter)?;
    report.target = target.name.clone();
    report.filter = Some(filter_report);
    Ok((emitter, report))
}

/// Generate one target and write its units below the target's output dir
pub fn run_target(
    graph: &Graph,
    config: &GeneratorConfig,
    target: &TargetConfig,
) -> Result<GenerationReport, CodegenError> {
    let (emitter, mut report) = generate_target(graph, config, target)?;
    report.files = emitter.flush(&target.output_dir)?;
    info!(
        "{}: wrote {} files to {}",
        target.name,
        report.files.len(),
        target.output_dir.display()
    );
    Ok(report)
}

/// Run every configured target in order, stopping at the first failure
pub fn run(graph: &Graph, config: &GeneratorConfig) -> Result<Vec<GenerationReport>, CodegenError> {
    config
        .targets
        .iter()
        .map(|target| {
            info!("Generating target {} ({:?})", target.name, target.systems);
            run_target(graph, config, target).map_err(|source| CodegenError::Target {
                target: target.name.clone(),
                source: Box::new(source),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use interlace_core::{AnnotationFilter, Attribute, Interface, RenamePass};
    use pretty_assertions::assert_eq;

    fn database() -> Graph {
        Graph::from_interfaces(vec![
            Interface::new("Node").annotated("WebKit"),
            Interface::new("DOMWindow")
                .annotated("WebKit")
                .with_attribute(Attribute::getter("document", "Node")),
            Interface::new("GeckoOnly").annotated("Gecko"),
        ])
        .unwrap()
    }

    #[test]
    fn test_prepare_filters_then_renames_a_clone() {
        let original = database();
        let target = TargetConfig {
            filter: Some(AnnotationFilter::new().require_any(["WebKit"])),
            renames: vec![RenamePass::new([("DOMWindow", "Window")])],
            ..TargetConfig::default()
        };

        let (graph, report) = prepare_graph(&original, &target);

        assert_eq!(graph.ids(), vec!["Node", "Window"]);
        assert_eq!(report.removed_interfaces, vec!["GeckoOnly"]);
        assert_eq!(graph.get("Window").unwrap().binding_name(), "DOMWindow");
        assert_eq!(original.len(), 3);
    }

    #[test]
    fn test_without_filter_only_unidentified_members_go() {
        let original = Graph::from_interfaces(vec![Interface::new("Node")
            .with_attribute(Attribute::getter("ownerDocument", "Document"))
            .with_attribute(Attribute::getter("nodeName", "DOMString"))])
        .unwrap();

        let (graph, report) = prepare_graph(&original, &TargetConfig::default());

        assert_eq!(graph.get("Node").unwrap().attributes.len(), 1);
        assert_eq!(report.unidentified.len(), 1);
        assert_eq!(report.unidentified[0].type_name, "Document");
    }

    #[test]
    fn test_run_target_writes_units() {
        let dir = tempfile::tempdir().unwrap();
        let config = GeneratorConfig::default();
        let target = TargetConfig {
            output_dir: dir.path().to_path_buf(),
            ..TargetConfig::default()
        };

        let report = run_target(&database(), &config, &target).unwrap();

        assert_eq!(report.target, "default");
        assert!(dir.path().join("elemental/dom/Node.java").is_file());
        assert!(dir.path().join("elemental/js/dom/JsNode.java").is_file());
        assert!(dir.path().join("elemental/js/dom/JsElementalMixinBase.java").is_file());
        assert!(!dir.path().join("elemental/dom/ElementalMixinBase.java").exists());
        assert_eq!(report.files.len(), 7);
    }

    #[test]
    fn test_run_names_the_failing_target() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GeneratorConfig::default();
        config.targets = vec![TargetConfig {
            name: "typed".to_string(),
            output_dir: dir.path().to_path_buf(),
            ..TargetConfig::default()
        }];
        let graph = Graph::from_interfaces(vec![
            Interface::new("ArrayBufferView"),
            Interface::new("Float32Array").with_parent("ArrayBufferView"),
            Interface::new("Window"),
        ])
        .unwrap();

        let err = run(&graph, &config).unwrap_err();

        assert!(matches!(
            &err,
            CodegenError::Target { target, source }
                if target == "typed"
                    && matches!(**source, CodegenError::MissingInterface { ref name, .. } if name == "ArrayBuffer")
        ));
        assert!(err.to_string().contains("typed"));
    }
}

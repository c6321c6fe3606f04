//! Command handlers for the interlace CLI

use anyhow::{Context, Result};
use interlace_codegen::pipeline::{prepare_graph, run};
use interlace_codegen::{BackendKind, GenerationReport, Generator, GeneratorConfig, MultiEmitter};
use interlace_core::Graph;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn load_database(path: &Path) -> Result<Graph> {
    let graph = Graph::load(path)
        .with_context(|| format!("Failed to load interface database {}", path.display()))?;
    info!("Loaded {} interfaces from {}", graph.len(), path.display());
    Ok(graph)
}

/// Config from `path`, or the defaults when no file is given
pub fn load_config(path: Option<&Path>) -> Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(GeneratorConfig::default()),
    }
}

/// Overrides for the first target given on the command line
#[derive(Debug, Default)]
pub struct GenerateOverrides {
    pub output: Option<PathBuf>,
    pub systems: Vec<String>,
}

impl GenerateOverrides {
    fn apply(&self, config: &mut GeneratorConfig) -> Result<()> {
        if self.output.is_none() && self.systems.is_empty() {
            return Ok(());
        }
        if config.targets.is_empty() {
            config.targets.push(Default::default());
        }
        let target = &mut config.targets[0];
        if let Some(output) = &self.output {
            target.output_dir = output.clone();
        }
        if !self.systems.is_empty() {
            target.systems = self
                .systems
                .iter()
                .map(|s| s.parse::<BackendKind>())
                .collect::<Result<_, _>>()?;
        }
        Ok(())
    }
}

pub fn handle_generate(
    database: &Path,
    config_path: Option<&Path>,
    overrides: &GenerateOverrides,
    report_path: Option<&Path>,
) -> Result<Vec<GenerationReport>> {
    let graph = load_database(database)?;
    let mut config = load_config(config_path)?;
    overrides.apply(&mut config)?;

    let reports = run(&graph, &config)
        .with_context(|| format!("Failed to generate from {}", database.display()))?;

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&reports)?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Wrote report to {}", path.display());
    }
    Ok(reports)
}

pub fn handle_filter(
    database: &Path,
    config_path: Option<&Path>,
    target: Option<&str>,
    output: &Path,
) -> Result<()> {
    let graph = load_database(database)?;
    let config = load_config(config_path)?;
    let target = config.target(target)?;

    let (filtered, report) = prepare_graph(&graph, target);
    let json = filtered.to_json_pretty()?;
    fs::write(output, json)
        .with_context(|| format!("Failed to write filtered database {}", output.display()))?;
    info!(
        "Wrote {} interfaces to {} ({} removed, {} unidentified members)",
        filtered.len(),
        output.display(),
        report.removed_interfaces.len(),
        report.unidentified.len()
    );
    Ok(())
}

/// Mixin ids of the filtered and renamed graph, sorted
pub fn handle_mixins(
    database: &Path,
    config_path: Option<&Path>,
    target: Option<&str>,
) -> Result<Vec<String>> {
    let graph = load_database(database)?;
    let config = load_config(config_path)?;
    let target = config.target(target)?;

    let (mut filtered, _) = prepare_graph(&graph, target);
    let report = Generator::new(&config).generate(&mut filtered, &mut MultiEmitter::new())?;
    Ok(report.mixins.iter().map(str::to_string).collect())
}

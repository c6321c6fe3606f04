//! The driving loop: prepares a filtered graph and pushes every interface
//! through each attached backend
//!
//! Preparation runs in a fixed order:
//!
//! 1. event sources gain their `EventTarget` parent
//! 2. exceptions raised by emitted interfaces are collected
//! 3. the mixin base is created, mixins are resolved over the ancestor-first
//!    order and the base is populated with their members
//!
//! Interfaces are then visited ancestor-first. Callback interfaces are handed
//! to [`Backend::process_callback`]; everything else goes through the full
//! per-interface protocol.

use crate::analysis::{analyze_operation, recognize_callback, OperationInfo, Param};
use crate::backend::{AttributePair, Backend, BackendKind, InterfaceContext};
use crate::config::GeneratorConfig;
use crate::emitter::MultiEmitter;
use crate::java::JavaTypes;
use crate::CodegenError;
use interlace_core::mixin::{ensure_mixin_base, populate_mixin_base};
use interlace_core::special_cases::{fix_event_targets, CALLBACK_EXT_ATTR};
use interlace_core::traversal::{
    collect_exceptions, pre_order, primary_ancestors, secondary_ancestors,
};
use interlace_core::{Attribute, FilterReport, Graph, Interface, MixinResolver, MixinSet, Operation};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Operations the host object already provides
const HOST_OPERATIONS: &[&str] = &["toString"];

/// What one generation run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub target: String,
    /// Interfaces pushed through the full protocol, in emission order
    pub interfaces: Vec<String>,
    pub callbacks: Vec<String>,
    /// Interfaces skipped because a hand-written version exists
    pub skipped: Vec<String>,
    pub mixins: MixinSet,
    pub exceptions: BTreeSet<String>,
    pub files: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterReport>,
}

pub struct Generator<'c> {
    config: &'c GeneratorConfig,
    backends: Vec<Box<dyn Backend>>,
    /// File stems of hand-written sources
    auxiliary: BTreeSet<String>,
}

impl<'c> Generator<'c> {
    pub fn new(config: &'c GeneratorConfig) -> Self {
        Self {
            config,
            backends: Vec::new(),
            auxiliary: BTreeSet::new(),
        }
    }

    /// Generator with one backend per kind, in the given order
    pub fn from_kinds(config: &'c GeneratorConfig, kinds: &[BackendKind]) -> Result<Self, CodegenError> {
        let mut generator = Self::new(config);
        for kind in kinds {
            generator.backends.push(kind.build(config)?);
        }
        Ok(generator)
    }

    pub fn with_backend(mut self, backend: Box<dyn Backend>) -> Self {
        self.backends.push(backend);
        self
    }

    pub fn with_auxiliary<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.auxiliary.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Index the configured auxiliary directory, if any
    pub fn load_auxiliary(&mut self) -> Result<usize, CodegenError> {
        let Some(dir) = &self.config.auxiliary_dir else {
            return Ok(0);
        };
        let stems = auxiliary_stems(dir)?;
        debug!("{} auxiliary files under {}", stems.len(), dir.display());
        let count = stems.len();
        self.auxiliary.extend(stems);
        Ok(count)
    }

    pub fn generate(
        &mut self,
        graph: &mut Graph,
        emitter: &mut MultiEmitter,
    ) -> Result<GenerationReport, CodegenError> {
        let config = self.config;
        let mut report = GenerationReport::default();

        fix_event_targets(graph, &config.event_target);

        let mut ids: Vec<String> = vec![config.mixin_base.clone()];
        ids.extend(
            graph
                .interfaces()
                .filter(|iface| iface.id != config.mixin_base)
                .filter(|iface| config.matches_source_filter(&iface.annotations))
                .map(|iface| iface.id.clone()),
        );
        report.exceptions = collect_exceptions(ids.iter().filter_map(|id| graph.get(id)));

        ensure_mixin_base(graph, &config.mixin_base);
        let order = pre_order(graph, ids.iter().map(String::as_str));
        let mixins = MixinResolver::new(graph)
            .with_manual_mixins(config.manual_mixins.iter().cloned())
            .resolve(&order);
        populate_mixin_base(graph, &config.mixin_base, &mixins)?;

        let graph: &Graph = graph;
        for backend in &mut self.backends {
            backend.prepare(graph, &mixins);
        }

        for id in &order {
            let Some(iface) = graph.get(id) else {
                continue;
            };
            if self.auxiliary.contains(id) {
                info!("Skipping {} because auxiliary file exists", id);
                report.skipped.push(id.clone());
                continue;
            }

            if iface.has_ext_attr(CALLBACK_EXT_ATTR) {
                match recognize_callback(iface) {
                    Some(callback) => {
                        info!("Generating callback {}", id);
                        let ctx = self.context(graph, &mixins, iface);
                        for backend in &mut self.backends {
                            backend.process_callback(&ctx, &callback, emitter)?;
                        }
                        report.callbacks.push(id.clone());
                        continue;
                    }
                    None => warn!(
                        "Malformed callback interface {} has {} operations",
                        id,
                        iface.operations.len()
                    ),
                }
            }

            info!("Generating {}", id);
            self.process_interface(graph, &mixins, iface, emitter)?;
            report.interfaces.push(id.clone());
        }

        for backend in &mut self.backends {
            backend.finish(emitter)?;
        }

        report.mixins = mixins;
        Ok(report)
    }

    fn context<'a>(
        &self,
        graph: &'a Graph,
        mixins: &'a MixinSet,
        iface: &'a Interface,
    ) -> InterfaceContext<'a>
    where
        'c: 'a,
    {
        let config = self.config;
        InterfaceContext {
            interface: iface,
            graph,
            mixins,
            config,
            types: JavaTypes::new(graph, &config.base_package, &config.default_module),
            implements: implements_list(config, graph, mixins, iface),
        }
    }

    fn process_interface(
        &mut self,
        graph: &Graph,
        mixins: &MixinSet,
        iface: &Interface,
        emitter: &mut MultiEmitter,
    ) -> Result<(), CodegenError> {
        let ctx = self.context(graph, mixins, iface);
        let mut backends: Vec<&mut Box<dyn Backend>> = self
            .backends
            .iter_mut()
            .filter(|b| b.accepts(&ctx))
            .collect();

        for backend in backends.iter_mut() {
            backend.start_interface(&ctx)?;
        }

        let direct_parents = direct_parents(graph, iface, &ctx.config.mixin_base);
        let parent_signatures: BTreeSet<String> = direct_parents
            .iter()
            .flat_map(|p| p.operations.iter().map(Operation::signature))
            .collect();
        let parent_accessors: BTreeSet<String> = direct_parents
            .iter()
            .flat_map(|p| accessor_keys(&p.attributes))
            .collect();

        let mut constants: Vec<_> = iface.constants.iter().collect();
        constants.sort_by(|a, b| a.id.cmp(&b.id));
        for constant in constants {
            for backend in backends.iter_mut() {
                backend.add_constant(&ctx, constant)?;
            }
        }

        for mut pair in pair_attributes(&iface.attributes) {
            pair.inherited_getter = pair
                .getter
                .is_some_and(|g| parent_accessors.contains(&format!("getter_{}", g.dom_name())));
            pair.inherited_setter = pair
                .setter
                .is_some_and(|s| parent_accessors.contains(&format!("setter_{}", s.dom_name())));
            for backend in backends.iter_mut() {
                backend.add_attribute(&ctx, &pair)?;
            }
        }

        if let Some(element) = iface.list_element_type() {
            for backend in backends.iter_mut() {
                backend.add_indexer(&ctx, element)?;
            }
        }

        for info in own_operations(&iface.operations, &parent_signatures) {
            let inherited = info.is_inherited();
            for backend in backends.iter_mut() {
                if info.is_static {
                    backend.add_static_operation(&ctx, &info, inherited)?;
                } else {
                    backend.add_operation(&ctx, &info, inherited)?;
                }
            }
        }

        let mut seen_attributes: BTreeSet<&str> = BTreeSet::new();
        let mut seen_signatures: BTreeSet<String> = BTreeSet::new();
        let mut seen_overloads: BTreeSet<String> = BTreeSet::new();
        for ancestor in secondary_ancestors(graph, iface) {
            let Some(owner) = ancestor.as_interface() else {
                continue;
            };

            let attributes: Vec<Attribute> = owner
                .attributes
                .iter()
                .filter(|a| !iface.has_attribute(&a.id) && !seen_attributes.contains(a.id.as_str()))
                .cloned()
                .collect();
            for pair in pair_attributes(&attributes) {
                for backend in backends.iter_mut() {
                    backend.add_secondary_attribute(&ctx, owner, &pair)?;
                }
            }
            seen_attributes.extend(owner.attributes.iter().map(|a| a.id.as_str()));

            let mut groups: BTreeMap<&str, Vec<&Operation>> = BTreeMap::new();
            for operation in &owner.operations {
                let id = operation.id.as_str();
                if iface.has_operation(id) || HOST_OPERATIONS.contains(&id) {
                    continue;
                }
                if !seen_signatures.insert(operation.signature()) {
                    continue;
                }
                groups.entry(id).or_default().push(operation);
            }
            for group in groups.into_values() {
                let Some(mut info) = analyze_operation(&group, &BTreeSet::new()) else {
                    continue;
                };
                // Optional-argument expansion can repeat an overload another
                // ancestor already contributed.
                let name = info.name.clone();
                info.overloads
                    .retain(|o| seen_overloads.insert(overload_key(&name, &o.params)));
                if info.overloads.is_empty() {
                    continue;
                }
                for backend in backends.iter_mut() {
                    backend.add_secondary_operation(&ctx, owner, &info)?;
                }
            }
        }

        for backend in backends.iter_mut() {
            backend.finish_interface(&ctx, emitter)?;
        }
        Ok(())
    }
}

/// Secondary ancestors passing the source filter, or every mixin for the
/// mixin base
fn implements_list(
    config: &GeneratorConfig,
    graph: &Graph,
    mixins: &MixinSet,
    iface: &Interface,
) -> Vec<String> {
    if iface.id == config.mixin_base {
        return mixins
            .iter()
            .filter(|id| *id != config.mixin_base && graph.has_interface(id))
            .map(str::to_string)
            .collect();
    }

    let mut seen = BTreeSet::new();
    secondary_ancestors(graph, iface)
        .into_iter()
        .filter(|a| {
            a.as_interface()
                .map_or(true, |i| config.matches_source_filter(&i.annotations))
        })
        .map(|a| a.name().to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Primary ancestors plus the mixin base and its primary ancestors
fn direct_parents<'g>(graph: &'g Graph, iface: &Interface, mixin_base: &str) -> Vec<&'g Interface> {
    let mut parents = primary_ancestors(graph, iface);
    if iface.id != mixin_base {
        if let Some(base) = graph.get(mixin_base) {
            parents.push(base);
            parents.extend(primary_ancestors(graph, base));
        }
    }
    parents
}

/// `getter_x` / `setter_x` keys of everything `attributes` declares
fn accessor_keys(attributes: &[Attribute]) -> impl Iterator<Item = String> + '_ {
    attributes.iter().flat_map(|a| {
        let getter = a.is_getter.then(|| format!("getter_{}", a.dom_name()));
        let setter = a.is_setter.then(|| format!("setter_{}", a.dom_name()));
        getter.into_iter().chain(setter)
    })
}

/// Pair accessors by name, sorted by name. A replaceable setter does not
/// count as a setter.
pub fn pair_attributes(attributes: &[Attribute]) -> Vec<AttributePair<'_>> {
    let mut pairs: BTreeMap<&str, AttributePair<'_>> = BTreeMap::new();
    for attribute in attributes {
        let pair = pairs
            .entry(attribute.id.as_str())
            .or_insert_with(|| AttributePair::new(None, None));
        if attribute.is_getter && pair.getter.is_none() {
            pair.getter = Some(attribute);
        }
        if attribute.is_setter && !attribute.replaceable && pair.setter.is_none() {
            pair.setter = Some(attribute);
        }
    }
    pairs
        .into_values()
        .filter(|p| p.attribute().is_some())
        .collect()
}

/// Drop operations whose signature was already seen, keeping the first
fn dedup_by_signature(operations: Vec<&Operation>) -> Vec<&Operation> {
    let mut seen = BTreeSet::new();
    operations
        .into_iter()
        .filter(|o| seen.insert(o.signature()))
        .collect()
}

/// `name(type, ...)` of one emitted overload
fn overload_key(name: &str, params: &[Param]) -> String {
    let types: Vec<&str> = params.iter().map(|p| p.type_id.as_str()).collect();
    format!("{}({})", name, types.join(","))
}

/// Group declared operations by name in first-declaration order
fn own_operations(operations: &[Operation], parent_signatures: &BTreeSet<String>) -> Vec<OperationInfo> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: BTreeMap<&str, Vec<&Operation>> = BTreeMap::new();
    for operation in operations {
        let name = operation.name();
        if HOST_OPERATIONS.contains(&operation.id.as_str()) {
            continue;
        }
        if !groups.contains_key(name) {
            order.push(name);
        }
        groups.entry(name).or_default().push(operation);
    }

    order
        .into_iter()
        .filter_map(|name| groups.remove(name))
        .filter_map(|group| analyze_operation(&dedup_by_signature(group), parent_signatures))
        .collect()
}

/// File stems of every file below `dir`
pub fn auxiliary_stems(dir: &Path) -> Result<BTreeSet<String>, CodegenError> {
    let mut stems = BTreeSet::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(stem) = entry.path().file_stem().and_then(|s| s.to_str()) {
            stems.insert(stem.to_string());
        }
    }
    Ok(stems)
}

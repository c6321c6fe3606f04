//! Mixin detection and mixin-base population
//!
//! A single-inheritance target can realize only the primary parent edge.
//! When the same secondary parent is declared by two interfaces that share
//! no primary lineage, that parent (and its primary ancestors) cannot be
//! implemented by both host-object classes, so it is hoisted into a shared
//! mixin base instead.

use crate::error::CoreError;
use crate::idl::{Graph, Interface};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

/// Interfaces always treated as mixins. Both are capabilities implemented by
/// unrelated leaf types in ways the structural rule cannot see.
pub const DEFAULT_MANUAL_MIXINS: &[&str] = &["ElementTimeControl", "ElementTraversal"];

/// Ids of interfaces hoisted into the mixin base
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MixinSet(BTreeSet<String>);

impl MixinSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.0.insert(id.into())
    }

    /// Ids in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<String> for MixinSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Computes the [`MixinSet`] of a filtered graph
pub struct MixinResolver<'g> {
    graph: &'g Graph,
    manual: Vec<String>,
    lineage: HashMap<String, Vec<String>>,
}

impl<'g> MixinResolver<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            manual: DEFAULT_MANUAL_MIXINS.iter().map(|s| s.to_string()).collect(),
            lineage: HashMap::new(),
        }
    }

    pub fn with_manual_mixins<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manual = names.into_iter().map(Into::into).collect();
        self
    }

    /// `[parents[0]] + primary_lineage(parents[0])`, following first parents
    /// only. Names outside the graph end the chain but are included.
    pub fn primary_lineage(&mut self, id: &str) -> Vec<String> {
        if let Some(chain) = self.lineage.get(id) {
            return chain.clone();
        }

        let graph = self.graph;
        let mut chain = Vec::new();
        let mut seen: HashSet<&str> = HashSet::from([id]);
        let mut current = graph.get(id);
        while let Some(iface) = current {
            let Some(parent) = iface.primary_parent() else {
                break;
            };
            let parent_id = parent.type_.id.as_str();
            if !seen.insert(parent_id) {
                debug!("primary lineage of {} loops at {}", id, parent_id);
                break;
            }
            chain.push(parent_id.to_string());
            current = graph.get(parent_id);
        }

        self.lineage.insert(id.to_string(), chain.clone());
        chain
    }

    /// Detect mixins among `ids`, visited in sorted id order so the result
    /// does not depend on the caller's ordering.
    pub fn resolve(mut self, ids: &[String]) -> MixinSet {
        let graph = self.graph;
        let ordered: BTreeSet<&String> = ids.iter().collect();
        let mut implementors: BTreeMap<String, String> = BTreeMap::new();
        let mut mixins = MixinSet::new();

        for id in ordered {
            let Some(iface) = graph.get(id) else {
                continue;
            };
            let lineage = self.primary_lineage(id);

            for secondary in iface.secondary_parents() {
                let parent_id = &secondary.type_.id;
                let Some(implemented_by) = implementors.get(parent_id) else {
                    implementors.insert(parent_id.clone(), id.clone());
                    continue;
                };
                if implemented_by == id
                    || lineage.contains(implemented_by)
                    || lineage.contains(parent_id)
                {
                    continue;
                }

                info!(
                    "Mixin detected {}, previously implemented by {}, but also implemented by {}",
                    parent_id, implemented_by, id
                );
                mixins.insert(parent_id.clone());
                for ancestor in self.primary_lineage(parent_id) {
                    if graph.has_interface(&ancestor) {
                        info!("Super mixin detected {} (ancestor of {})", ancestor, parent_id);
                        mixins.insert(ancestor);
                    }
                }
            }
        }

        for name in &self.manual {
            mixins.insert(name.clone());
        }
        mixins
    }
}

/// Make sure the synthetic mixin base exists, creating an empty one if needed
pub fn ensure_mixin_base(graph: &mut Graph, base_id: &str) {
    if !graph.has_interface(base_id) {
        debug!("creating synthetic mixin base {}", base_id);
        graph.add_interface(Interface::new(base_id));
    }
}

/// Copy every attribute, operation and annotation of each mixin still in the
/// graph onto the mixin base.
pub fn populate_mixin_base(
    graph: &mut Graph,
    base_id: &str,
    mixins: &MixinSet,
) -> Result<(), CoreError> {
    let mut attributes = Vec::new();
    let mut operations = Vec::new();
    let mut annotations = Vec::new();
    let mut ext_attrs = Vec::new();

    for mixin_id in mixins.iter().filter(|id| *id != base_id) {
        let Some(mixin) = graph.get(mixin_id) else {
            continue;
        };
        attributes.extend(mixin.attributes.iter().cloned());
        operations.extend(mixin.operations.iter().cloned());
        annotations.extend(mixin.annotations.clone());
        ext_attrs.extend(mixin.ext_attrs.clone());
    }

    let base = graph
        .get_mut(base_id)
        .ok_or_else(|| CoreError::InterfaceNotFound(base_id.to_string()))?;
    base.attributes.extend(attributes);
    base.operations.extend(operations);
    base.annotations.extend(annotations);
    base.ext_attrs.extend(ext_attrs);
    Ok(())
}

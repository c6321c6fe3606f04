//! Interface renaming with merge-on-collision
//!
//! Renaming runs in two phases. First every interface named in the table is
//! detached and reattached under its new id, or merged into the interface
//! already holding that id. Then every type reference in the whole graph is
//! rewritten, so references introduced by merged members are fixed too.

use crate::idl::Graph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Old un-namespaced id -> new id
pub type RenameTable = BTreeMap<String, String>;

/// One rename table as configured for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePass {
    /// Also move the JavaScript binding name to the new id
    #[serde(default)]
    pub rename_binding_names: bool,
    #[serde(default)]
    pub table: RenameTable,
}

impl RenamePass {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            rename_binding_names: false,
            table: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn with_binding_names(mut self) -> Self {
        self.rename_binding_names = true;
        self
    }

    pub fn apply(&self, graph: &mut Graph) -> usize {
        rename_types(graph, &self.table, self.rename_binding_names)
    }
}

/// Follow `name` through the table to its final target. A cycle stops at
/// the last name before one repeats.
fn resolve<'t>(table: &'t RenameTable, name: &'t str) -> &'t str {
    let mut visited = BTreeSet::from([name]);
    let mut current = name;
    while let Some(next) = table.get(current) {
        if !visited.insert(next.as_str()) {
            break;
        }
        current = next;
    }
    current
}

/// The table with every chain `A -> B -> C` collapsed to `A -> C` and
/// identity entries dropped
pub fn resolve_table(table: &RenameTable) -> RenameTable {
    table
        .keys()
        .filter_map(|old| {
            let new = resolve(table, old);
            (new != old.as_str()).then(|| (old.clone(), new.to_string()))
        })
        .collect()
}

/// Rename interfaces and every reference to them.
///
/// Chained entries resolve to their final target. Every renamed interface is
/// detached before any is reattached, so swaps do not merge. Ids absent from
/// the graph are skipped. Returns the number of interfaces that were renamed
/// or merged.
pub fn rename_types(graph: &mut Graph, table: &RenameTable, rename_binding_names: bool) -> usize {
    let resolved = resolve_table(table);

    let detached: Vec<_> = resolved
        .iter()
        .filter_map(|(old_name, new_name)| {
            graph
                .remove_interface(old_name)
                .map(|interface| (old_name, new_name, interface))
        })
        .collect();
    let renamed = detached.len();

    for (old_name, new_name, mut interface) in detached {
        if rename_binding_names {
            interface.js_name = Some(new_name.clone());
        } else if interface.js_name.is_none() {
            interface.js_name = Some(old_name.clone());
        }

        match graph.get_mut(new_name) {
            Some(existing) => {
                info!("merging interface {} into {}", old_name, new_name);
                existing.merge_members(interface);
            }
            None => {
                info!("renaming interface {} to {}", old_name, new_name);
                interface.id = new_name.clone();
                graph.add_interface(interface);
            }
        }
    }

    let mut rewritten = 0usize;
    for interface in graph.interfaces_mut() {
        interface.for_each_type_mut(|t| {
            if t.rename(&resolved) {
                rewritten += 1;
            }
        });
    }
    debug!("rewrote {} type references", rewritten);

    renamed
}

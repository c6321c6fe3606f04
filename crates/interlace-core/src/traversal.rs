//! Walks over parent edges
//!
//! Every walk keeps a visited set: the database is not validated for cycles,
//! and a cycle only makes the resulting order best-effort.

use crate::idl::{Graph, Interface};
use crate::types::is_collection_type;
use std::collections::{BTreeSet, HashSet};

/// A secondary ancestor: either a graph interface or a container pseudo-type
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ancestor<'g> {
    Interface(&'g Interface),
    PseudoType(&'g str),
}

impl<'g> Ancestor<'g> {
    /// Raw type name, used to deduplicate implements-lists
    pub fn name(&self) -> &'g str {
        match self {
            Ancestor::Interface(iface) => &iface.id,
            Ancestor::PseudoType(name) => name,
        }
    }

    pub fn as_interface(&self) -> Option<&'g Interface> {
        match self {
            Ancestor::Interface(iface) => Some(iface),
            Ancestor::PseudoType(_) => None,
        }
    }
}

/// Order interface ids so that every interface comes after everything
/// reachable from it over any parent edge. Container pseudo-types end the
/// walk; ids absent from the graph are skipped.
pub fn pre_order<'a, I>(graph: &Graph, ids: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    fn visit(graph: &Graph, id: &str, seen: &mut HashSet<String>, ordered: &mut Vec<String>) {
        if !seen.insert(id.to_string()) {
            return;
        }
        let Some(iface) = graph.get(id) else {
            return;
        };
        for parent in &iface.parents {
            if is_collection_type(&parent.type_.id) {
                continue;
            }
            if graph.has_interface(&parent.type_.id) {
                visit(graph, &parent.type_.id, seen, ordered);
            }
        }
        ordered.push(id.to_string());
    }

    let mut seen = HashSet::new();
    let mut ordered = Vec::new();
    for id in ids {
        if graph.has_interface(id) {
            visit(graph, id, &mut seen, &mut ordered);
        }
    }
    ordered
}

/// Primary-chain ancestors present in the graph, nearest first
pub fn primary_ancestors<'g>(graph: &'g Graph, interface: &Interface) -> Vec<&'g Interface> {
    let mut result = Vec::new();
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    seen.insert(&interface.id);

    let mut next = interface.primary_parent().map(|p| p.type_.id.as_str());
    while let Some(parent_id) = next {
        let Some(parent) = graph.get(parent_id) else {
            break;
        };
        if !seen.insert(&parent.id) {
            break;
        }
        result.push(parent);
        next = parent.primary_parent().map(|p| p.type_.id.as_str());
    }
    result
}

/// Everything reachable through `parents[1..]`, following all parents of
/// each reached ancestor, in declaration order.
pub fn secondary_ancestors<'g>(graph: &'g Graph, interface: &Interface) -> Vec<Ancestor<'g>> {
    fn walk<'g>(
        graph: &'g Graph,
        parents: &'g [crate::idl::Parent],
        seen: &mut HashSet<&'g str>,
        result: &mut Vec<Ancestor<'g>>,
    ) {
        for parent in parents {
            let name = parent.type_.id.as_str();
            if is_collection_type(name) {
                if seen.insert(name) {
                    result.push(Ancestor::PseudoType(name));
                }
                continue;
            }
            let Some(ancestor) = graph.get(name) else {
                continue;
            };
            if !seen.insert(&ancestor.id) {
                continue;
            }
            result.push(Ancestor::Interface(ancestor));
            walk(graph, &ancestor.parents, seen, result);
        }
    }

    let mut seen = HashSet::new();
    let mut result = Vec::new();
    // Walk from the graph's copy so the result borrows only from the graph.
    let Some(owned) = graph.get(&interface.id) else {
        return result;
    };
    seen.insert(owned.id.as_str());
    walk(graph, owned.secondary_parents(), &mut seen, &mut result);
    result
}

/// Exception types raised anywhere in the given interfaces
pub fn collect_exceptions<'g>(interfaces: impl IntoIterator<Item = &'g Interface>) -> BTreeSet<String> {
    interfaces
        .into_iter()
        .flat_map(|iface| iface.raised_types())
        .map(|t| t.id.clone())
        .collect()
}

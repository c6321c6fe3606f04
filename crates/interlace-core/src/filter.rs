//! Annotation-driven pruning of the interface graph
//!
//! Interfaces and members carry platform annotations (e.g. `WebKit`). A
//! filter keeps an item when it is neither displaced nor suppressed by an
//! excluding annotation and it carries the required annotations. After the
//! annotation pass every member whose type no longer resolves is dropped.

use crate::idl::{Annotated, Graph};
use crate::types::{is_resolvable, IdlType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// The four annotation lists of one filtering call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationFilter {
    /// Every one of these must be present (only consulted when non-empty)
    pub require_all: Vec<String>,
    /// Any one of these is enough
    pub require_any: Vec<String>,
    /// Drop items these annotations mark as displaced (`via`)
    pub exclude_displaced: Vec<String>,
    /// Drop items these annotations mark as suppressed
    pub exclude_suppressed: Vec<String>,
}

/// What a filter run removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub removed_interfaces: Vec<String>,
    pub removed_members: usize,
    pub unidentified: Vec<UnidentifiedMember>,
}

/// A member dropped because it references a type absent from the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnidentifiedMember {
    pub interface: String,
    pub member: String,
    pub type_name: String,
}

impl AnnotationFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_all<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require_all = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn require_any<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require_any = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude_displaced<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_displaced = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude_suppressed<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_suppressed = names.into_iter().map(Into::into).collect();
        self
    }

    /// Decide whether a single interface, parent or member survives
    pub fn keeps(&self, node: &impl Annotated) -> bool {
        let annotations = node.annotations();

        let displaced = self
            .exclude_displaced
            .iter()
            .any(|a| annotations.get(a).is_some_and(|x| x.is_displaced()));
        if displaced {
            return false;
        }

        let suppressed = self
            .exclude_suppressed
            .iter()
            .any(|a| annotations.get(a).is_some_and(|x| x.is_suppressed()));
        if suppressed {
            return false;
        }

        if self.require_any.iter().any(|a| annotations.contains_key(a)) {
            return true;
        }
        if self.require_all.is_empty() {
            return false;
        }
        self.require_all.iter().all(|a| annotations.contains_key(a))
    }

    /// Filter the graph in place, then drop members with unidentified types
    pub fn apply(&self, graph: &mut Graph) -> FilterReport {
        let mut report = FilterReport::default();

        for id in graph.ids() {
            let keep = graph.get(&id).is_some_and(|iface| self.keeps(iface));
            if !keep {
                debug!("removing interface {} (annotation filter)", id);
                graph.remove_interface(&id);
                report.removed_interfaces.push(id);
                continue;
            }

            if let Some(iface) = graph.get_mut(&id) {
                let before = member_count(iface);
                iface.constants.retain(|c| self.keeps(c));
                iface.attributes.retain(|a| self.keeps(a));
                iface.operations.retain(|o| self.keeps(o));
                iface.parents.retain(|p| self.keeps(p));
                report.removed_members += before - member_count(iface);
            }
        }

        report.unidentified = filter_unidentified_members(graph);
        report
    }
}

fn member_count(iface: &crate::idl::Interface) -> usize {
    iface.constants.len() + iface.attributes.len() + iface.operations.len() + iface.parents.len()
}

fn first_unresolved<'a>(
    types: impl IntoIterator<Item = &'a IdlType>,
    known: &BTreeSet<String>,
) -> Option<&'a str> {
    let is_known = |name: &str| known.contains(name);
    types
        .into_iter()
        .find(|t| !is_resolvable(&t.id, &is_known))
        .map(|t| t.id.as_str())
}

/// Remove constants, attributes, operations, parents and constructors that
/// reference a type which is neither primitive nor present in the graph.
pub fn filter_unidentified_members(graph: &mut Graph) -> Vec<UnidentifiedMember> {
    let known: BTreeSet<String> = graph.ids().into_iter().collect();
    let mut removed = Vec::new();

    for iface in graph.interfaces_mut() {
        let iface_id = iface.id.clone();
        let mut drop_member = |member: &str, unresolved: Option<&str>| -> bool {
            match unresolved {
                Some(type_name) => {
                    warn!(
                        "removing {} in {} which has unidentified type {}",
                        member, iface_id, type_name
                    );
                    removed.push(UnidentifiedMember {
                        interface: iface_id.clone(),
                        member: member.to_string(),
                        type_name: type_name.to_string(),
                    });
                    true
                }
                None => false,
            }
        };

        iface.constants.retain(|c| {
            !drop_member(&c.id, first_unresolved([&c.type_], &known))
        });
        iface.attributes.retain(|a| {
            let types = std::iter::once(&a.type_)
                .chain(a.get_raises.iter())
                .chain(a.set_raises.iter());
            !drop_member(&a.id, first_unresolved(types, &known))
        });
        iface.operations.retain(|o| {
            let types = std::iter::once(&o.type_)
                .chain(o.arguments.iter().map(|arg| &arg.type_))
                .chain(o.raises.iter());
            !drop_member(&o.id, first_unresolved(types, &known))
        });
        iface.parents.retain(|p| {
            !drop_member("parent", first_unresolved([&p.type_], &known))
        });

        let constructor_unresolved = iface
            .constructor
            .as_ref()
            .and_then(|args| first_unresolved(args.iter().map(|a| &a.type_), &known))
            .map(str::to_string);
        if drop_member("constructor", constructor_unresolved.as_deref()) {
            iface.constructor = None;
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl::{Annotation, Attribute, Interface, Operation};
    use pretty_assertions::assert_eq;

    fn webkit() -> AnnotationFilter {
        AnnotationFilter::new()
            .require_any(["WebKit"])
            .exclude_displaced(["WebKit"])
            .exclude_suppressed(["WebKit"])
    }

    #[test]
    fn test_keeps_requires_some_annotation_list() {
        let iface = Interface::new("Node").annotated("WebKit");
        assert!(!AnnotationFilter::new().keeps(&iface));
        assert!(webkit().keeps(&iface));
    }

    #[test]
    fn test_keeps_require_all() {
        let filter = AnnotationFilter::new().require_all(["WebKit", "Gecko"]);
        let both = Interface::new("A").annotated("WebKit").annotated("Gecko");
        let one = Interface::new("B").annotated("WebKit");

        assert!(filter.keeps(&both));
        assert!(!filter.keeps(&one));
    }

    #[test]
    fn test_require_any_short_circuits_require_all() {
        let filter = AnnotationFilter::new()
            .require_all(["WebKit", "Gecko"])
            .require_any(["Dart"]);
        assert!(filter.keeps(&Interface::new("A").annotated("Dart")));
    }

    #[test]
    fn test_displaced_and_suppressed_exclusions_win() {
        let displaced = Interface::new("A")
            .with_annotation("WebKit", Annotation::new().with("via", "Node"));
        let suppressed = Interface::new("B")
            .with_annotation("WebKit", Annotation::new().with("suppressed", serde_json::Value::Null));

        assert!(!webkit().keeps(&displaced));
        assert!(!webkit().keeps(&suppressed));
    }

    #[test]
    fn test_apply_removes_interfaces_and_members() {
        let mut graph = Graph::from_interfaces(vec![
            Interface::new("Node")
                .annotated("WebKit")
                .with_attribute(Attribute::getter("nodeName", "DOMString").annotated("WebKit"))
                .with_attribute(Attribute::getter("mozThing", "DOMString")),
            Interface::new("GeckoOnly").annotated("Gecko"),
        ])
        .unwrap();

        let report = webkit().apply(&mut graph);

        assert_eq!(report.removed_interfaces, vec!["GeckoOnly".to_string()]);
        assert_eq!(report.removed_members, 1);
        let node = graph.get("Node").unwrap();
        assert_eq!(node.attributes.len(), 1);
        assert_eq!(node.attributes[0].id, "nodeName");
    }

    #[test]
    fn test_unidentified_members_are_dropped() {
        let mut graph = Graph::from_interfaces(vec![
            Interface::new("Node")
                .annotated("WebKit")
                .with_parent("EventTarget")
                .with_attribute(Attribute::getter("parentNode", "Node").annotated("WebKit"))
                .with_attribute(Attribute::getter("children", "List<Node>").annotated("WebKit"))
                .with_operation(
                    Operation::new("appendChild", "Node")
                        .with_arg("child", "Gone")
                        .annotated("WebKit"),
                ),
        ])
        .unwrap();
        if let Some(node) = graph.get_mut("Node") {
            node.parents[0] = node.parents[0].clone().annotated("WebKit");
        }

        let report = webkit().apply(&mut graph);

        let node = graph.get("Node").unwrap();
        assert!(node.parents.is_empty());
        assert_eq!(node.attributes.len(), 2);
        assert!(node.operations.is_empty());
        let dropped: Vec<(&str, &str)> = report
            .unidentified
            .iter()
            .map(|m| (m.member.as_str(), m.type_name.as_str()))
            .collect();
        assert_eq!(dropped, vec![("appendChild", "Gone"), ("parent", "EventTarget")]);
    }

    #[test]
    fn test_constructor_with_unknown_argument_is_dropped() {
        let mut graph = Graph::from_interfaces(vec![Interface::new("Worker")
            .with_constructor(vec![crate::idl::Argument::new("script", "ScriptUrl")])])
        .unwrap();

        let removed = filter_unidentified_members(&mut graph);

        assert_eq!(removed.len(), 1);
        assert!(graph.get("Worker").unwrap().constructor.is_none());
    }
}

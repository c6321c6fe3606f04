//! Name- and attribute-driven exceptions to the general graph rules
//!
//! Each case here is evaluated from data already in the graph.

use crate::idl::{Graph, Interface, Parent};
use crate::traversal::primary_ancestors;
use tracing::debug;

/// Extended attribute marking an interface as an event source
pub const EVENT_TARGET_EXT_ATTR: &str = "EventTarget";

/// Extended attribute marking a callback interface
pub const CALLBACK_EXT_ATTR: &str = "Callback";

/// Parent shared by every typed array buffer view
pub const ARRAY_BUFFER_VIEW: &str = "ArrayBufferView";

/// Backing store type taken by typed array constructors
pub const ARRAY_BUFFER: &str = "ArrayBuffer";

/// Give every event source an explicit parent edge to `event_target`.
///
/// Returns the ids that received the edge.
pub fn fix_event_targets(graph: &mut Graph, event_target: &str) -> Vec<String> {
    let mut fixed = Vec::new();
    for iface in graph.interfaces_mut() {
        if !iface.has_ext_attr(EVENT_TARGET_EXT_ATTR)
            || iface.id == event_target
            || iface.has_parent(event_target)
        {
            continue;
        }
        debug!("adding {} parent to {}", event_target, iface.id);
        iface.parents.push(Parent::new(event_target));
        fixed.push(iface.id.clone());
    }
    fixed
}

/// Typed array interfaces: `*Array` types deriving from `ArrayBufferView`
pub fn is_typed_array(graph: &Graph, iface: &Interface) -> bool {
    if !iface.id.ends_with("Array") || iface.id == ARRAY_BUFFER_VIEW {
        return false;
    }
    iface.has_parent(ARRAY_BUFFER_VIEW)
        || primary_ancestors(graph, iface)
            .iter()
            .any(|a| a.id == ARRAY_BUFFER_VIEW)
}

/// A callback interface has the `Callback` attribute and exactly one
/// operation. Returns `None` for ordinary interfaces and malformed callbacks.
pub fn callback_operation(iface: &Interface) -> Option<&crate::idl::Operation> {
    if !iface.has_ext_attr(CALLBACK_EXT_ATTR) {
        return None;
    }
    match iface.operations.as_slice() {
        [operation] => Some(operation),
        _ => None,
    }
}

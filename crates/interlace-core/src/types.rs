//! Type references and the predicates the graph passes use to classify them

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Types that are always resolvable without a graph node
const PRIMITIVE_TYPES: &[&str] = &[
    "any",
    "boolean",
    "byte",
    "octet",
    "short",
    "unsigned short",
    "long",
    "unsigned long",
    "long long",
    "unsigned long long",
    "int",
    "float",
    "double",
    "unrestricted float",
    "unrestricted double",
    "DOMString",
    "DOMTimeStamp",
    "String",
    "Date",
    "object",
    "Object",
    "void",
];

/// Built-in container pseudo-types. They may appear as parents but are never
/// graph nodes, so every walk over parent edges stops at them.
const COLLECTION_TYPES: &[&str] = &["List", "Collection", "sequence"];

/// A reference to a type by (possibly namespaced, possibly parameterized) name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdlType {
    pub id: String,
}

impl IdlType {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The name with any `module::` qualification removed
    pub fn name(&self) -> &str {
        strip_modules(&self.id)
    }

    /// Rewrite this reference through a rename table.
    ///
    /// Returns true when the id changed.
    pub fn rename(&mut self, table: &BTreeMap<String, String>) -> bool {
        match renamed_type_name(&self.id, table) {
            Some(new_id) if new_id != self.id => {
                self.id = new_id;
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for IdlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl From<&str> for IdlType {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Strip `a::b::` qualification from the outermost name of a type.
///
/// Type arguments are left untouched: `a::List<b::C>` becomes `List<b::C>`.
pub fn strip_modules(type_name: &str) -> &str {
    let head_end = type_name.find('<').unwrap_or(type_name.len());
    match type_name[..head_end].rfind("::") {
        Some(pos) => &type_name[pos + 2..],
        None => type_name,
    }
}

fn parameterized_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([\w.:]+)<([\w.:<> ]+)>$").ok())
        .as_ref()
}

/// Split `Outer<Inner>` into `("Outer", "Inner")`
pub fn split_parameterized(type_name: &str) -> Option<(&str, &str)> {
    let captures = parameterized_re()?.captures(type_name)?;
    let outer = captures.get(1)?.as_str();
    let inner = captures.get(2)?.as_str();
    Some((outer, inner))
}

pub fn is_primitive(type_name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&type_name)
}

pub fn is_collection_type(type_name: &str) -> bool {
    let head = split_parameterized(type_name)
        .map(|(outer, _)| outer)
        .unwrap_or(type_name);
    COLLECTION_TYPES.contains(&strip_modules(head))
}

/// Element type of a collection reference such as `sequence<Node>`
pub fn collection_element_type(type_name: &str) -> Option<&str> {
    let (outer, inner) = split_parameterized(type_name)?;
    COLLECTION_TYPES
        .contains(&strip_modules(outer))
        .then_some(inner)
}

/// Whether a type is a primitive, a known interface, or a parameterized type
/// whose parts are recursively resolvable.
pub fn is_resolvable(type_name: &str, is_known: &dyn Fn(&str) -> bool) -> bool {
    if is_primitive(type_name) || COLLECTION_TYPES.contains(&type_name) {
        return true;
    }
    if is_known(strip_modules(type_name)) {
        return true;
    }
    match split_parameterized(type_name) {
        Some((outer, inner)) => is_resolvable(outer, is_known) && is_resolvable(inner, is_known),
        None => false,
    }
}

fn renamed_type_name(type_name: &str, table: &BTreeMap<String, String>) -> Option<String> {
    if let Some(new_name) = table.get(strip_modules(type_name)) {
        return Some(new_name.clone());
    }
    let (outer, inner) = split_parameterized(type_name)?;
    let new_outer = renamed_type_name(outer, table);
    let new_inner = renamed_type_name(inner, table);
    if new_outer.is_none() && new_inner.is_none() {
        return None;
    }
    Some(format!(
        "{}<{}>",
        new_outer.as_deref().unwrap_or(outer),
        new_inner.as_deref().unwrap_or(inner)
    ))
}

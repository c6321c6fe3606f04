//! Java naming, IDL-to-Java type mapping and import tracking
//!
//! Both backends emit into the same package layout:
//!
//! - contract interfaces live in `{base}.{module}` (e.g. `elemental.dom.Node`)
//! - overlay classes live in `{base}.js.{module}` (e.g. `elemental.js.dom.JsNode`)
//!
//! Overlay classes return overlay types (`JsNode`) but accept contract types
//! (`Node`) as parameters. Callback interfaces have no overlay class, so
//! they are always referred to by their contract name.

use interlace_core::special_cases::callback_operation;
use interlace_core::types::{collection_element_type, strip_modules};
use interlace_core::{Graph, Interface};
use std::collections::BTreeSet;
use tracing::debug;

/// Prefix of every overlay class name
pub const JSO_PREFIX: &str = "Js";

const JAVA_KEYWORDS: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally", "float",
    "for", "goto", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "package", "private", "protected", "public", "return", "short", "static",
    "strictfp", "super", "switch", "synchronized", "this", "throw", "throws", "transient", "try",
    "void", "volatile", "while",
];

/// Which hierarchy a type reference is emitted into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    /// Pure contract interfaces
    Interface,
    /// Overlay classes, return position
    JsoReturn,
    /// Overlay classes, parameter position
    JsoParam,
}

impl Flavor {
    fn is_jso_return(self) -> bool {
        matches!(self, Flavor::JsoReturn)
    }
}

/// A Java type reference together with the import it needs, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaType {
    pub name: String,
    pub import: Option<String>,
}

impl JavaType {
    fn builtin(name: &str) -> Self {
        Self {
            name: name.to_string(),
            import: None,
        }
    }

    fn imported(name: impl Into<String>, package: &str) -> Self {
        let name = name.into();
        Self {
            import: Some(format!("{}.{}", package, name)),
            name,
        }
    }

    pub fn is_void(&self) -> bool {
        self.name == "void"
    }

    pub fn is_boolean(&self) -> bool {
        self.name == "boolean"
    }
}

fn primitive(idl: &str) -> Option<&'static str> {
    let java = match idl {
        "boolean" => "boolean",
        "byte" => "byte",
        "octet" | "short" | "unsigned short" | "long" | "unsigned long" | "int" => "int",
        "long long" | "unsigned long long" => "double",
        "float" | "unrestricted float" => "float",
        "double" | "unrestricted double" | "DOMTimeStamp" => "double",
        "DOMString" | "String" => "String",
        "any" | "object" | "Object" => "Object",
        "void" => "void",
        _ => return None,
    };
    Some(java)
}

/// Package layout and type mapping for one run
#[derive(Debug, Clone, Copy)]
pub struct JavaTypes<'a> {
    graph: &'a Graph,
    base_package: &'a str,
    default_module: &'a str,
}

impl<'a> JavaTypes<'a> {
    pub fn new(graph: &'a Graph, base_package: &'a str, default_module: &'a str) -> Self {
        Self {
            graph,
            base_package,
            default_module,
        }
    }

    pub fn module_of<'i>(&self, interface: &'i Interface) -> &'i str
    where
        'a: 'i,
    {
        interface.module.as_deref().unwrap_or(self.default_module)
    }

    pub fn interface_package(&self, module: &str) -> String {
        format!("{}.{}", self.base_package, module)
    }

    pub fn jso_package(&self, module: &str) -> String {
        format!("{}.js.{}", self.base_package, module)
    }

    fn util_package(&self, jso: bool) -> String {
        if jso {
            self.jso_package("util")
        } else {
            self.interface_package("util")
        }
    }

    /// Map an IDL type reference to Java
    pub fn map(&self, idl: &str, flavor: Flavor) -> JavaType {
        if let Some(java) = primitive(idl) {
            return JavaType::builtin(java);
        }
        if idl == "Date" {
            return JavaType::imported("Date", "java.util");
        }
        if let Some(element) = collection_element_type(idl) {
            return self.indexable(element, flavor.is_jso_return());
        }

        let name = strip_modules(idl);
        let Some(target) = self.graph.get(name) else {
            debug!("no Java mapping for {}, using Object", idl);
            return JavaType::builtin("Object");
        };
        let module = self.module_of(target);
        if flavor.is_jso_return() && callback_operation(target).is_none() {
            JavaType::imported(format!("{}{}", JSO_PREFIX, name), &self.jso_package(module))
        } else {
            JavaType::imported(name, &self.interface_package(module))
        }
    }

    /// Array-like wrapper for a collection of `element`
    fn indexable(&self, element: &str, jso: bool) -> JavaType {
        let base = match primitive(element) {
            Some("int" | "byte") => "IndexableInt",
            Some("double" | "float") => "IndexableNumber",
            Some("String") => "IndexableString",
            _ => "Indexable",
        };
        if jso {
            JavaType::imported(format!("{}{}", JSO_PREFIX, base), &self.util_package(true))
        } else {
            JavaType::imported(base, &self.util_package(false))
        }
    }
}

/// Upper-case the first character
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Escape names that collide with Java keywords
pub fn java_identifier(name: &str) -> String {
    if JAVA_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

pub fn getter_name(attribute_name: &str, java_type: &JavaType) -> String {
    let prefix = if java_type.is_boolean() { "is" } else { "get" };
    format!("{}{}", prefix, capitalize(attribute_name))
}

pub fn setter_name(attribute_name: &str) -> String {
    format!("set{}", capitalize(attribute_name))
}

/// Collects the imports of one compilation unit
#[derive(Debug, Default)]
pub struct ImportTracker {
    current_package: String,
    imports: BTreeSet<String>,
}

impl ImportTracker {
    pub fn new(current_package: impl Into<String>) -> Self {
        Self {
            current_package: current_package.into(),
            imports: BTreeSet::new(),
        }
    }

    /// Record a type reference; same-package types need no import
    pub fn add(&mut self, java_type: &JavaType) {
        if let Some(import) = &java_type.import {
            self.add_path(import);
        }
    }

    pub fn add_path(&mut self, import: &str) {
        let package = import.rsplit_once('.').map(|(p, _)| p).unwrap_or("");
        if package == self.current_package || package == "java.lang" {
            return;
        }
        self.imports.insert(import.to_string());
    }

    /// Imports in sorted order
    pub fn imports(&self) -> Vec<String> {
        self.imports.iter().cloned().collect()
    }
}

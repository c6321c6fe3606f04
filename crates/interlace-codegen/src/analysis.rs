//! Signature analysis: turns a group of same-named operations into the
//! overload set a backend emits

use interlace_core::idl::Argument;
use interlace_core::special_cases::callback_operation;
use interlace_core::{Interface, Operation};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    /// IDL type id
    pub type_id: String,
}

impl From<&Argument> for Param {
    fn from(argument: &Argument) -> Self {
        Self {
            name: argument.id.clone(),
            type_id: argument.type_.id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overload {
    pub params: Vec<Param>,
    /// Already declared with this exact signature by a primary ancestor or
    /// the mixin base
    pub inherited: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationInfo {
    /// Emitted name (`DartName` when present)
    pub name: String,
    /// Name of the underlying JavaScript member
    pub js_name: String,
    /// IDL return type id of the first declaration
    pub return_type: String,
    pub overloads: Vec<Overload>,
    pub is_static: bool,
}

impl OperationInfo {
    /// True when every overload is already declared by an ancestor
    pub fn is_inherited(&self) -> bool {
        self.overloads.iter().all(|o| o.inherited)
    }
}

/// Every prefix of `arguments` that stops at or after the last required one
fn expand_optional(arguments: &[Argument]) -> Vec<Vec<Param>> {
    let required = arguments
        .iter()
        .position(|a| a.optional)
        .unwrap_or(arguments.len());
    (required..=arguments.len())
        .map(|len| arguments[..len].iter().map(Param::from).collect())
        .collect()
}

/// Analyze overloads sharing one name.
///
/// Trailing optional arguments expand into one overload per prefix, and
/// overloads with identical parameter types collapse to the first. An
/// overload is inherited when its declaring operation's signature is in
/// `parent_signatures`. Returns `None` for an empty group.
pub fn analyze_operation(
    operations: &[&Operation],
    parent_signatures: &BTreeSet<String>,
) -> Option<OperationInfo> {
    let first = operations.first()?;
    let mut seen: BTreeSet<Vec<String>> = BTreeSet::new();
    let mut overloads = Vec::new();

    for operation in operations {
        let inherited = parent_signatures.contains(&operation.signature());
        for params in expand_optional(&operation.arguments) {
            let key: Vec<String> = params.iter().map(|p| p.type_id.clone()).collect();
            if seen.insert(key) {
                overloads.push(Overload { params, inherited });
            }
        }
    }

    Some(OperationInfo {
        name: first.name().to_string(),
        js_name: first.id.clone(),
        return_type: first.type_.id.clone(),
        overloads,
        is_static: first.is_static,
    })
}

/// A JavaScript constructor exposed through a global-root factory method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorInfo {
    pub interface_id: String,
    /// Global constructor name to call
    pub js_name: String,
    pub overloads: Vec<Vec<Param>>,
}

pub fn analyze_constructor(interface: &Interface) -> Option<ConstructorInfo> {
    let arguments = interface.constructor.as_ref()?;
    Some(ConstructorInfo {
        interface_id: interface.id.clone(),
        js_name: interface.binding_name().to_string(),
        overloads: expand_optional(arguments),
    })
}

/// A single-operation callback interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackInfo {
    pub interface_id: String,
    pub operation: OperationInfo,
}

pub fn recognize_callback(interface: &Interface) -> Option<CallbackInfo> {
    let operation = callback_operation(interface)?;
    let info = analyze_operation(&[operation], &BTreeSet::new())?;
    Some(CallbackInfo {
        interface_id: interface.id.clone(),
        operation: info,
    })
}

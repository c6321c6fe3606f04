//! Overload analysis over generated operation groups

use interlace_codegen::analysis::analyze_operation;
use interlace_core::Operation;
use proptest::prelude::*;
use std::collections::BTreeSet;

const ARG_TYPES: &[&str] = &["long", "DOMString", "Node", "boolean"];

fn operation_strategy() -> impl Strategy<Value = Operation> {
    (
        prop::collection::vec(0..ARG_TYPES.len(), 0..4),
        0usize..4,
    )
        .prop_map(|(types, optional_from)| {
            let mut operation = Operation::new("item", "void");
            for (i, t) in types.into_iter().enumerate() {
                let name = format!("arg{}", i);
                operation = if i >= optional_from {
                    operation.with_optional_arg(name, ARG_TYPES[t])
                } else {
                    operation.with_arg(name, ARG_TYPES[t])
                };
            }
            operation
        })
}

fn type_list(operation: &Operation) -> Vec<String> {
    operation.arguments.iter().map(|a| a.type_.id.clone()).collect()
}

proptest! {
    #[test]
    fn prop_overloads_are_unique(operations in prop::collection::vec(operation_strategy(), 1..6)) {
        let group: Vec<&Operation> = operations.iter().collect();
        let info = analyze_operation(&group, &BTreeSet::new()).unwrap();

        let keys: Vec<Vec<String>> = info
            .overloads
            .iter()
            .map(|o| o.params.iter().map(|p| p.type_id.clone()).collect())
            .collect();
        let unique: BTreeSet<&Vec<String>> = keys.iter().collect();
        prop_assert_eq!(unique.len(), keys.len());

        for operation in &operations {
            prop_assert!(keys.contains(&type_list(operation)));
        }
    }

    #[test]
    fn prop_duplicated_declarations_change_nothing(operations in prop::collection::vec(operation_strategy(), 1..4)) {
        let once: Vec<&Operation> = operations.iter().collect();
        let twice: Vec<&Operation> = operations.iter().chain(operations.iter()).collect();

        let first = analyze_operation(&once, &BTreeSet::new()).unwrap();
        let second = analyze_operation(&twice, &BTreeSet::new()).unwrap();
        prop_assert_eq!(first, second);
    }
}

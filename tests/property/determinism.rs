//! Property-based tests for determinism guarantees

use casegen::plan::resolve_names;
use casegen::seed::derive_seed;
use casegen::types::{CasePath, Seed};
use proptest::prelude::*;
use std::collections::HashSet;

/// Test that seed derivation is a pure function of its inputs
#[test]
fn test_seed_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &("[a-z]{1,8}", "[a-z0-9]{1,6}", ".{0,24}", ".{0,8}"),
            |(group, name, command, salt)| {
                let group = CasePath::parse(&group);
                let first = derive_seed(&group, &name, &command, &salt);
                let second = derive_seed(&group, &name, &command, &salt);
                prop_assert_eq!(first, second);
                prop_assert!(u64::from(first.value()) < Seed::MODULUS);
                Ok(())
            },
        )
        .unwrap();
}

/// Test that moving text between fields changes the seed
#[test]
fn test_seed_field_boundaries_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&("[a-z]{4}", "[a-z]{4}"), |(left, right)| {
            let group = CasePath::parse("secret");
            let joined = format!("{}{}", left, right);
            let split = derive_seed(&group, &left, &right, "");
            let merged = derive_seed(&group, &joined, "", "");
            prop_assert_ne!(split, merged);
            Ok(())
        })
        .unwrap();
}

/// Test that resolved names are unique, stable and equally padded
#[test]
fn test_resolved_names_property() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let declared = prop::collection::vec(prop::option::of(1u64..40), 0..30);

    runner
        .run(&declared, |declared| {
            // Repeated explicit names are a naming error; keep only the first
            let mut explicit = HashSet::new();
            let texts: Vec<Option<String>> = declared
                .iter()
                .map(|n| n.filter(|n| explicit.insert(*n)).map(|n| n.to_string()))
                .collect();
            let names: Vec<Option<&str>> = texts.iter().map(|n| n.as_deref()).collect();
            let group = CasePath::parse("secret");

            let first = resolve_names(&group, &names).unwrap();
            let second = resolve_names(&group, &names).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), names.len());

            let unique: HashSet<&String> = first.iter().collect();
            prop_assert_eq!(unique.len(), first.len());

            let generated: Vec<&String> = first
                .iter()
                .zip(&names)
                .filter(|(_, declared)| declared.is_none())
                .map(|(name, _)| name)
                .collect();
            if let Some(width) = generated.first().map(|n| n.len()) {
                prop_assert!(generated.iter().all(|n| n.len() == width));
            }
            Ok(())
        })
        .unwrap();
}

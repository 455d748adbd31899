//! Integration tests for plan loading, naming and seeding

use super::test_utils::yaml;
use casegen::engine::LoadedPlan;
use casegen::error::{GenerationError, NamingError, PlanError, SchemaError};
use casegen::plan::{load_plan, CaseSource, CaseTree};
use casegen::types::{CasePath, Seed};

fn names(tree: &CaseTree, group: &str) -> Vec<String> {
    tree.cases()
        .iter()
        .filter(|case| case.group.as_str() == group)
        .map(|case| case.name.clone())
        .collect()
}

fn seed(tree: &CaseTree, path: &str) -> Seed {
    tree.find_case(&CasePath::parse(path))
        .and_then(|case| case.seed())
        .unwrap_or_else(|| panic!("no seed for {}", path))
}

#[test]
fn test_yaml_plan_with_all_shapes() {
    let tree = load_plan(&yaml(
        r#"
solution: /submissions/sol
data:
  sample:
    data:
      - gen 1
      - in: "3"
        ans: "3"
  secret:
    data:
      edge: gen 0 0
      random:
        data: gen {seed}
"#,
    ))
    .unwrap();

    assert_eq!(names(&tree, "sample"), vec!["1", "2"]);
    assert_eq!(names(&tree, "secret"), vec!["edge"]);
    assert_eq!(names(&tree, "secret/random"), vec!["1"]);
    assert_eq!(tree.case_count(), 4);
}

#[test]
fn test_ten_unnamed_cases_are_zero_padded() {
    let commands: Vec<String> = (0..10).map(|i| format!("      - gen {}", i)).collect();
    let tree = load_plan(&yaml(&format!(
        "data:\n  g:\n    data:\n{}\n",
        commands.join("\n")
    )))
    .unwrap();
    let got = names(&tree, "g");
    assert_eq!(got.first().unwrap(), "01");
    assert_eq!(got.last().unwrap(), "10");
}

#[test]
fn test_explicit_numeric_name_is_kept_among_unnamed() {
    let mut lines: Vec<String> = (0..9).map(|i| format!("      - gen {}", i)).collect();
    lines.insert(2, "      - \"5\": gen explicit".to_string());
    let tree = load_plan(&yaml(&format!("data:\n  g:\n    data:\n{}\n", lines.join("\n"))))
        .unwrap();
    let got = names(&tree, "g");
    assert_eq!(got.len(), 10);
    assert!(got.contains(&"05".to_string()) || got.contains(&"5".to_string()));
    let mut unique = got.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 10, "names must be unique: {:?}", got);
}

#[test]
fn test_count_expansion_gives_distinct_seeds() {
    let tree = load_plan(&yaml(
        r#"
data:
  g:
    data:
      - generate: gen {seed}
        count: 3
"#,
    ))
    .unwrap();
    let seeds: std::collections::HashSet<Seed> =
        tree.cases().iter().filter_map(|c| c.seed()).collect();
    assert_eq!(seeds.len(), 3);
}

#[test]
fn test_seeds_are_reproducible_across_loads() {
    let text = r#"
salt: "x"
data:
  g:
    data:
      a: gen {seed}
      b: gen {seed:01}
"#;
    let first = load_plan(&yaml(text)).unwrap();
    let second = load_plan(&yaml(text)).unwrap();
    assert_eq!(seed(&first, "g/a"), seed(&second, "g/a"));
    assert_eq!(first, second);
}

#[test]
fn test_seed_depends_on_raw_template_text() {
    let tree = load_plan(&yaml(
        r#"
data:
  a:
    data:
      c: gen {seed}
  b:
    data:
      c: gen {seed:01}
"#,
    ))
    .unwrap();
    let a = load_plan(&yaml("data:\n  a:\n    data:\n      c: gen {seed:01}\n")).unwrap();
    assert_ne!(seed(&tree, "a/c"), seed(&a, "a/c"));
}

#[test]
fn test_salt_is_opaque_text() {
    let one = load_plan(&yaml("salt: \"1.0\"\ndata:\n  c: gen {seed}\n")).unwrap();
    let two = load_plan(&yaml("salt: \"1.00\"\ndata:\n  c: gen {seed}\n")).unwrap();
    assert_ne!(seed(&one, "c"), seed(&two, "c"));
}

#[test]
fn test_salt_override_only_affects_subtree() {
    let base = load_plan(&yaml(
        r#"
data:
  a:
    data:
      c: gen {seed}
  b:
    data:
      c: gen {seed}
"#,
    ))
    .unwrap();
    let salted = load_plan(&yaml(
        r#"
data:
  a:
    salt: changed
    data:
      c: gen {seed}
  b:
    data:
      c: gen {seed}
"#,
    ))
    .unwrap();
    assert_ne!(seed(&base, "a/c"), seed(&salted, "a/c"));
    assert_eq!(seed(&base, "b/c"), seed(&salted, "b/c"));
}

#[test]
fn test_boolean_looking_command_is_kept_verbatim() {
    let tree = load_plan(&yaml("data:\n  c: \"yes\"\n  d: true\n")).unwrap();
    for path in ["c", "d"] {
        match &tree.find_case(&CasePath::parse(path)).unwrap().source {
            CaseSource::Generated { command, .. } => {
                assert!(command.raw() == "yes" || command.raw() == "true")
            }
            other => panic!("unexpected source {:?}", other),
        }
    }
}

#[test]
fn test_structural_errors_abort_the_load() {
    let unknown = load_plan(&yaml("data:\n  c:\n    generate: gen\n    sede: 1\n")).unwrap_err();
    assert!(matches!(unknown, PlanError::Schema(SchemaError::UnknownKey { .. })));

    let conflicting =
        load_plan(&yaml("data:\n  c:\n    generate: gen\n    in: \"1\"\n")).unwrap_err();
    assert!(matches!(
        conflicting,
        PlanError::Schema(SchemaError::ConflictingSources { .. })
    ));

    let duplicate = load_plan(&yaml(
        "data:\n  - c: gen 1\n  - c: gen 2\n",
    ))
    .unwrap_err();
    assert!(matches!(duplicate, PlanError::Naming(NamingError::Duplicate { .. })));
}

#[test]
fn test_copy_errors_are_reported_at_load() {
    let missing = LoadedPlan::from_value(&yaml("data:\n  c:\n    copy: nowhere\n")).unwrap_err();
    assert!(matches!(
        missing,
        PlanError::CopyGraph(GenerationError::MissingCopySource { .. })
    ));

    let cycle = LoadedPlan::from_value(&yaml(
        "data:\n  a:\n    copy: b\n  b:\n    copy: a\n",
    ))
    .unwrap_err();
    assert!(matches!(cycle, PlanError::CopyGraph(GenerationError::CopyCycle { .. })));
}

//! Integration tests for end-to-end generation runs

use super::test_utils::{status, yaml, Problem};
use casegen::command::CommandTemplate;
use casegen::generation::{ExecutorSettings, FailurePolicy};
use casegen::report::CaseStatus;
use casegen::types::CasePath;

fn get_input(engine: &casegen::engine::Engine<super::test_utils::ScriptedRunner>, path: &str) -> Vec<u8> {
    engine
        .store()
        .get(&CasePath::parse(path))
        .unwrap()
        .unwrap_or_else(|| panic!("no record for {}", path))
        .artifacts
        .input
}

#[tokio::test]
async fn test_generated_cases_are_solved_and_stored() {
    let problem = Problem::new();
    let engine = problem.engine(ExecutorSettings::default());
    let report = engine
        .run(&yaml(
            r#"
solution: /submissions/sol
data:
  sample:
    data:
      - gen 1 2
  secret:
    data:
      - gen {seed}
      - gen {name} {count}
"#,
        ))
        .await
        .unwrap();

    assert!(report.is_success(), "{:?}", report.failures());
    assert_eq!(report.summary.passed, 3);

    let sample = engine.store().get(&CasePath::parse("sample/1")).unwrap().unwrap();
    assert_eq!(sample.artifacts.input, b"1 2\n");
    assert_eq!(sample.artifacts.answer, b"1 2\n");
    assert_eq!(sample.metadata.raw_command.as_deref(), Some("gen 1 2"));
    assert_eq!(sample.metadata.solution.as_deref(), Some("/submissions/sol"));

    let seeded = engine.store().get(&CasePath::parse("secret/1")).unwrap().unwrap();
    let seed = seeded.metadata.seed.unwrap();
    assert_eq!(seeded.artifacts.input, format!("{}\n", seed).into_bytes());
    assert_eq!(get_input(&engine, "secret/2"), b"2 1\n");
}

#[tokio::test]
async fn test_copied_case_matches_source_bytes() {
    let problem = Problem::new();
    let engine = problem.engine(ExecutorSettings::default());
    let report = engine
        .run(&yaml(
            r#"
solution: /submissions/sol
data:
  sample:
    data:
      first: gen {seed}
  secret:
    data:
      again:
        copy: sample/first
"#,
        ))
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(get_input(&engine, "secret/again"), get_input(&engine, "sample/first"));
    let copy = engine.store().get(&CasePath::parse("secret/again")).unwrap().unwrap();
    assert_eq!(copy.metadata.copied_from, Some(CasePath::parse("sample/first")));
    assert_eq!(engine.runner().calls("gen"), 1);
}

#[tokio::test]
async fn test_timeout_and_exit_failures_are_distinct() {
    let problem = Problem::new();
    let engine = problem.engine(ExecutorSettings::default());
    let report = engine
        .run(&yaml(
            r#"
solution: /submissions/sol
data:
  slow: gen hang
  broken: gen fail
  fine: gen 3
"#,
        ))
        .await
        .unwrap();

    assert!(!report.is_success());
    match status(&report, "slow") {
        CaseStatus::Failed { error, stage } => {
            assert!(error.contains("time limit"), "{}", error);
            assert_eq!(stage, None);
        }
        other => panic!("unexpected status {:?}", other),
    }
    match status(&report, "broken") {
        CaseStatus::Failed { error, .. } => assert!(error.contains("boom"), "{}", error),
        other => panic!("unexpected status {:?}", other),
    }
    assert_eq!(status(&report, "fine"), CaseStatus::Passed { cached: false });
    assert!(engine.store().get(&CasePath::parse("broken")).unwrap().is_none());
}

#[tokio::test]
async fn test_fail_fast_cancels_later_levels() {
    let problem = Problem::new();
    let settings = ExecutorSettings {
        failure_policy: FailurePolicy::FailFast,
        jobs: 1,
        ..ExecutorSettings::default()
    };
    let engine = problem.engine(settings);
    let report = engine
        .run(&yaml(
            r#"
solution: /submissions/sol
data:
  a: gen fail
  b: gen 2
  c:
    copy: b
"#,
        ))
        .await
        .unwrap();

    assert_eq!(report.summary.failed, 1);
    assert_eq!(status(&report, "c"), CaseStatus::Cancelled);
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_continue_policy_keeps_going_after_failure() {
    let problem = Problem::new();
    let engine = problem.engine(ExecutorSettings::default());
    let report = engine
        .run(&yaml(
            r#"
solution: /submissions/sol
data:
  a: gen fail
  b: gen 2
  c:
    copy: b
  d:
    copy: a
"#,
        ))
        .await
        .unwrap();

    assert_eq!(status(&report, "c"), CaseStatus::Passed { cached: false });
    assert!(matches!(status(&report, "d"), CaseStatus::Failed { .. }));
    assert_eq!(report.summary.cancelled, 0);
}

#[tokio::test]
async fn test_missing_solution_fails_the_case() {
    let problem = Problem::new();
    let engine = problem.engine(ExecutorSettings::default());
    let report = engine
        .run(&yaml("data:\n  c: gen 1\n  lit:\n    in: \"1\"\n    ans: \"1\"\n"))
        .await
        .unwrap();

    match status(&report, "c") {
        CaseStatus::Failed { error, .. } => assert!(error.contains("solution"), "{}", error),
        other => panic!("unexpected status {:?}", other),
    }
    assert_eq!(status(&report, "lit"), CaseStatus::Passed { cached: false });
    assert_eq!(engine.runner().calls("sol"), 0);
}

#[tokio::test]
async fn test_default_solution_from_settings() {
    let problem = Problem::new();
    let settings = ExecutorSettings {
        default_solution: Some(CommandTemplate::parse("/submissions/sol").unwrap()),
        ..ExecutorSettings::default()
    };
    let engine = problem.engine(settings);
    let report = engine.run(&yaml("data:\n  c: gen 4\n")).await.unwrap();
    assert!(report.is_success(), "{:?}", report.failures());
    assert_eq!(engine.runner().calls("sol"), 1);
}

#[tokio::test]
async fn test_second_run_is_served_from_cache() {
    let problem = Problem::new();
    let engine = problem.engine(ExecutorSettings::default());
    let plan = yaml("solution: /submissions/sol\ndata:\n  - gen {seed}\n  - gen 5\n");

    let first = engine.run(&plan).await.unwrap();
    assert_eq!(first.summary.cached, 0);
    let second = engine.run(&plan).await.unwrap();
    assert_eq!(second.summary.cached, 2);
    assert_eq!(engine.runner().calls("gen"), 2);
    assert_eq!(engine.runner().calls("sol"), 2);
}

#[tokio::test]
async fn test_disabled_cache_regenerates() {
    let problem = Problem::new();
    let settings = ExecutorSettings {
        use_cache: false,
        ..ExecutorSettings::default()
    };
    let engine = problem.engine(settings);
    let plan = yaml("solution: /submissions/sol\ndata:\n  c: gen 5\n");
    engine.run(&plan).await.unwrap();
    let second = engine.run(&plan).await.unwrap();
    assert_eq!(second.summary.cached, 0);
    assert_eq!(engine.runner().calls("gen"), 2);
}

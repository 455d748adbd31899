//! Integration tests for export and the command route

use super::test_utils::{with_env, yaml, Problem};
use casegen::cli::{Commands, OutputFormat, PlanArgs, RunContext};
use casegen::config::{CONFIG_HOME_ENV, ENV_NAME_ENV};
use casegen::export::Exporter;
use casegen::generation::ExecutorSettings;

const PLAN: &str = r#"
solution: /submissions/sol
data:
  sample:
    data:
      - gen 1 2
  secret:
    data:
      big: gen 100
      copied:
        copy: sample/1
"#;

fn context(problem: &Problem) -> RunContext {
    let home = problem.path().join("no-home").to_string_lossy().to_string();
    with_env(&[(CONFIG_HOME_ENV, Some(&home)), (ENV_NAME_ENV, None)], || {
        RunContext::new(problem.path().to_path_buf(), None).unwrap()
    })
}

fn plan_args(problem: &Problem, format: OutputFormat) -> PlanArgs {
    let path = problem.path().join("plan.yaml");
    std::fs::write(&path, PLAN).unwrap();
    PlanArgs {
        plan: Some(path),
        format,
    }
}

#[tokio::test]
async fn test_generated_cases_export_into_group_directories() {
    let problem = Problem::new();
    let engine = problem.engine(ExecutorSettings::default());
    let report = engine.run(&yaml(PLAN)).await.unwrap();
    assert!(report.is_success(), "{:?}", report.failures());

    let data = problem.path().join("data");
    let summary = Exporter::new(engine.store(), &data).export(&report).unwrap();
    assert_eq!(summary.written, 6);
    assert!(summary.missing.is_empty());

    assert_eq!(std::fs::read(data.join("sample/1.in")).unwrap(), b"1 2\n");
    assert_eq!(std::fs::read(data.join("sample/1.ans")).unwrap(), b"1 2\n");
    assert_eq!(std::fs::read(data.join("secret/big.in")).unwrap(), b"100\n");
    assert_eq!(
        std::fs::read(data.join("secret/copied.in")).unwrap(),
        std::fs::read(data.join("sample/1.in")).unwrap()
    );
}

#[test]
fn test_check_reports_counts() {
    let problem = Problem::new();
    let ctx = context(&problem);

    let output = ctx
        .execute(&Commands::Check {
            plan: plan_args(&problem, OutputFormat::Json),
        })
        .unwrap();
    assert!(output.success);
    let json: serde_json::Value = serde_json::from_str(&output.text).unwrap();
    assert_eq!(json["valid"], true);
    assert_eq!(json["cases"], 3);
    assert_eq!(json["levels"], 2);
}

#[test]
fn test_show_lists_cases_without_running_anything() {
    let problem = Problem::new();
    let ctx = context(&problem);

    let output = ctx
        .execute(&Commands::Show {
            plan: plan_args(&problem, OutputFormat::Text),
        })
        .unwrap();
    assert!(output.text.contains("big"), "{}", output.text);
    assert!(output.text.ends_with("3 cases"), "{}", output.text);
    assert!(!problem.path().join(".casegen").exists());
}

#[test]
fn test_missing_plan_file_is_an_error() {
    let problem = Problem::new();
    let ctx = context(&problem);

    let err = ctx
        .execute(&Commands::Check {
            plan: PlanArgs {
                plan: None,
                format: OutputFormat::Text,
            },
        })
        .unwrap_err();
    assert!(format!("{:#}", err).contains("generators.yaml"));
}

//! Integration tests for validators, sanity checks and invalid fixtures

use super::test_utils::{status, yaml, Problem};
use casegen::generation::ExecutorSettings;
use casegen::report::CaseStatus;
use casegen::validation::Stage;

#[tokio::test]
async fn test_input_validator_and_invalid_input_group() {
    let problem = Problem::new();
    problem.add_program("input_validators/positive", "v1");
    let engine = problem.engine(ExecutorSettings::default());
    let report = engine
        .run(&yaml(
            r#"
solution: /submissions/sol
data:
  secret:
    data:
      ok: gen 5
      zero: gen 0
  invalid_input:
    data:
      zero: gen 0
      fine: gen 7
"#,
        ))
        .await
        .unwrap();

    assert_eq!(status(&report, "secret/ok"), CaseStatus::Passed { cached: false });
    match status(&report, "secret/zero") {
        CaseStatus::Failed { stage, error } => {
            assert_eq!(stage, Some(Stage::Input));
            assert!(error.contains("not positive"), "{}", error);
        }
        other => panic!("unexpected status {:?}", other),
    }
    assert_eq!(
        status(&report, "invalid_input/zero"),
        CaseStatus::RejectedAsExpected { stage: Stage::Input }
    );
    assert!(matches!(
        status(&report, "invalid_input/fine"),
        CaseStatus::Failed {
            stage: Some(Stage::Input),
            ..
        }
    ));
    assert_eq!(report.summary.rejected_as_expected, 1);
    assert_eq!(engine.runner().calls("sol"), 1);
}

#[tokio::test]
async fn test_whitespace_is_checked_byte_for_byte() {
    let problem = Problem::new();
    let plan = yaml(
        r#"
data:
  plain: {in: "0", ans: "0"}
  lead: {in: " 0", ans: "0"}
  trail: {in: "0 ", ans: "0"}
  blank: {in: "0\n\n", ans: "0"}
"#,
    );

    let report = problem.engine(ExecutorSettings::default()).run(&plan).await.unwrap();
    assert_eq!(status(&report, "plain"), CaseStatus::Passed { cached: false });
    for path in ["lead", "trail", "blank"] {
        assert!(
            matches!(
                status(&report, path),
                CaseStatus::Failed {
                    stage: Some(Stage::Input),
                    ..
                }
            ),
            "{} should be rejected",
            path
        );
    }

    let relaxed = ExecutorSettings {
        sanity_checks: false,
        ..ExecutorSettings::default()
    };
    let report = problem.engine(relaxed).run(&plan).await.unwrap();
    assert!(report.is_success(), "{:?}", report.failures());
}

#[tokio::test]
async fn test_invalid_answer_output_and_bad_groups() {
    let problem = Problem::new();
    let report = problem
        .engine(ExecutorSettings::default())
        .run(&yaml(
            r#"
data:
  invalid_answer:
    data:
      spaced: {in: "1", ans: " 1"}
  invalid_output:
    data:
      differs: {in: "1", ans: "1", out: "2"}
      same: {in: "1", ans: "1", out: "1"}
  bad:
    data:
      anything: {in: " 1", ans: "1"}
"#,
        ))
        .await
        .unwrap();

    assert_eq!(
        status(&report, "invalid_answer/spaced"),
        CaseStatus::RejectedAsExpected {
            stage: Stage::Answer
        }
    );
    assert_eq!(
        status(&report, "invalid_output/differs"),
        CaseStatus::RejectedAsExpected {
            stage: Stage::Output
        }
    );
    assert!(matches!(
        status(&report, "invalid_output/same"),
        CaseStatus::Failed { .. }
    ));
    assert_eq!(
        status(&report, "bad/anything"),
        CaseStatus::RejectedAsExpected { stage: Stage::Input }
    );
}

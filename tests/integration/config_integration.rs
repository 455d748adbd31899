//! Integration tests for layered configuration

use super::test_utils::with_env;
use casegen::config::{ConfigLoader, EngineConfig, CONFIG_HOME_ENV, ENV_NAME_ENV};
use casegen::generation::FailurePolicy;
use std::path::PathBuf;
use tempfile::TempDir;

fn isolated<'a>(home: &'a str, extra: &[(&'a str, Option<&'a str>)]) -> Vec<(&'a str, Option<&'a str>)> {
    let mut vars = vec![
        (CONFIG_HOME_ENV, Some(home)),
        (ENV_NAME_ENV, None),
        ("CASEGEN__JOBS", None),
        ("CASEGEN__USE_CACHE", None),
    ];
    vars.extend_from_slice(extra);
    vars
}

#[test]
fn test_layers_apply_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let home = temp_dir.path().join("home");
    let problem = temp_dir.path().join("problem");
    std::fs::create_dir_all(&home).unwrap();
    std::fs::create_dir_all(&problem).unwrap();

    std::fs::write(
        home.join("config.toml"),
        "jobs = 2\nsolution_timeout_secs = 5\n\n[logging]\nformat = \"json\"\n",
    )
    .unwrap();
    std::fs::write(problem.join("casegen.toml"), "jobs = 3\nplan_file = \"plan.json\"\n").unwrap();

    let home_str = home.to_string_lossy().to_string();
    let vars = isolated(&home_str, &[("CASEGEN__USE_CACHE", Some("false"))]);
    let config = with_env(&vars, || ConfigLoader::load(&problem).unwrap());

    assert_eq!(config.jobs, 3);
    assert_eq!(config.solution_timeout_secs, 5);
    assert_eq!(config.plan_file, PathBuf::from("plan.json"));
    assert_eq!(config.logging.format, "json");
    assert!(!config.use_cache);
    assert_eq!(config.plan_path(&problem), problem.join("plan.json"));
}

#[test]
fn test_environment_variable_overrides_files() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("casegen.toml"), "jobs = 3\n").unwrap();
    let home = temp_dir.path().join("none").to_string_lossy().to_string();
    let vars = isolated(&home, &[("CASEGEN__JOBS", Some("7"))]);
    let config = with_env(&vars, || ConfigLoader::load(temp_dir.path()).unwrap());
    assert_eq!(config.jobs, 7);
}

#[test]
fn test_invalid_values_are_all_reported() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("casegen.toml"),
        "jobs = 0\nvalidator_timeout_secs = 0\n\n[logging]\noutput = \"printer\"\n",
    )
    .unwrap();
    let home = temp_dir.path().join("none").to_string_lossy().to_string();
    let config = with_env(&isolated(&home, &[]), || {
        ConfigLoader::load(temp_dir.path()).unwrap()
    });
    let issues = config.validate().unwrap_err();
    assert_eq!(issues.len(), 3, "{:?}", issues);
    assert!(config.executor_settings().is_err());
}

#[test]
fn test_fail_fast_maps_to_policy() {
    let config = EngineConfig {
        fail_fast: true,
        jobs: 2,
        ..EngineConfig::default()
    };
    let settings = config.executor_settings().unwrap();
    assert_eq!(settings.failure_policy, FailurePolicy::FailFast);
    assert_eq!(settings.jobs, 2);
}

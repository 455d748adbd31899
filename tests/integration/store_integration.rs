//! Integration tests for the persistent artifact store and cache reuse

use super::test_utils::{yaml, Problem};
use casegen::generation::ExecutorSettings;
use casegen::store::{ArtifactStore, SledArtifactStore};
use casegen::types::CasePath;
use tempfile::TempDir;

const PLAN: &str = r#"
solution: /submissions/sol
data:
  sample:
    data:
      - gen {seed}
  secret:
    data:
      big: gen 100
"#;

/// Run `plan` on a fresh engine over the sled store at `store_dir`.
/// Returns the number of cached cases and generator calls.
async fn run_plan(problem: &Problem, store_dir: &std::path::Path, plan: &str) -> (usize, usize) {
    let store = SledArtifactStore::new(store_dir).unwrap();
    let engine = problem.engine_with_store(ExecutorSettings::default(), Box::new(store));
    let report = engine.run(&yaml(plan)).await.unwrap();
    assert!(report.is_success(), "{:?}", report.failures());
    (report.summary.cached, engine.runner().calls("gen"))
}

async fn run_once(problem: &Problem, store_dir: &std::path::Path) -> (usize, usize) {
    run_plan(problem, store_dir, PLAN).await
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let problem = Problem::new();
    let store_dir = TempDir::new().unwrap();

    let (cached, gen_calls) = run_once(&problem, store_dir.path()).await;
    assert_eq!((cached, gen_calls), (0, 2));

    let (cached, gen_calls) = run_once(&problem, store_dir.path()).await;
    assert_eq!((cached, gen_calls), (2, 0));

    let store = SledArtifactStore::new(store_dir.path()).unwrap();
    let records = store.list().unwrap();
    let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["sample/1", "secret/big"]);
    assert!(records.iter().all(|r| r.cache_key.is_some()));
}

#[tokio::test]
async fn test_generator_change_invalidates_cache() {
    let problem = Problem::new();
    let store_dir = TempDir::new().unwrap();
    run_once(&problem, store_dir.path()).await;

    problem.add_program("generators/gen", "v2");
    let (cached, gen_calls) = run_once(&problem, store_dir.path()).await;
    assert_eq!((cached, gen_calls), (0, 2));
}

#[tokio::test]
async fn test_solution_change_invalidates_cache() {
    let problem = Problem::new();
    let store_dir = TempDir::new().unwrap();
    run_once(&problem, store_dir.path()).await;

    problem.add_program("submissions/sol", "v2");
    let (cached, _) = run_once(&problem, store_dir.path()).await;
    assert_eq!(cached, 0);
}

#[tokio::test]
async fn test_salt_change_invalidates_cache() {
    let problem = Problem::new();
    let store_dir = TempDir::new().unwrap();
    let first = format!("salt: a\n{}", PLAN.trim_start());
    let second = format!("salt: b\n{}", PLAN.trim_start());

    assert_eq!(run_plan(&problem, store_dir.path(), &first).await, (0, 2));
    assert_eq!(run_plan(&problem, store_dir.path(), &first).await, (2, 0));

    // Both cases depend on the salt, with or without a seed placeholder
    assert_eq!(run_plan(&problem, store_dir.path(), &second).await, (0, 2));
}

#[tokio::test]
async fn test_raw_command_change_invalidates_cache() {
    let problem = Problem::new();
    let store_dir = TempDir::new().unwrap();
    let single = "solution: /submissions/sol\ndata:\n  one: gen 5\n";
    let respaced = "solution: /submissions/sol\ndata:\n  one: gen  5\n";

    assert_eq!(run_plan(&problem, store_dir.path(), single).await, (0, 1));
    assert_eq!(run_plan(&problem, store_dir.path(), single).await, (1, 0));

    // Same tokens and same generator, but a different raw command
    assert_eq!(run_plan(&problem, store_dir.path(), respaced).await, (0, 1));
    assert_eq!(run_plan(&problem, store_dir.path(), respaced).await, (1, 0));
}

#[test]
fn test_remove_deletes_record() {
    let store_dir = TempDir::new().unwrap();
    let store = SledArtifactStore::new(store_dir.path()).unwrap();
    assert!(store.get(&CasePath::parse("x")).unwrap().is_none());
    store.remove(&CasePath::parse("x")).unwrap();
    assert!(store.list().unwrap().is_empty());
}

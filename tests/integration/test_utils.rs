//! Shared test utilities for integration tests
//!
//! Provides a throwaway problem directory, a scripted process runner and
//! serialized access to CASEGEN_* environment variables.

use casegen::engine::Engine;
use casegen::error::GenerationError;
use casegen::generation::ExecutorSettings;
use casegen::plan::PlanValue;
use casegen::program::{Invocation, ProcessRunner, RunOutput};
use casegen::store::{ArtifactStore, MemoryArtifactStore};
use parking_lot::Mutex;
use std::path::Path;
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Run `f` with the given variables set (or removed), restoring them afterwards.
pub fn with_env<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(key, _)| (key.to_string(), std::env::var(key).ok()))
        .collect();
    for (key, value) in vars {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }

    let result = f();

    for (key, value) in saved {
        match value {
            Some(value) => std::env::set_var(&key, value),
            None => std::env::remove_var(&key),
        }
    }
    result
}

/// Parse a YAML plan.
pub fn yaml(text: &str) -> PlanValue {
    PlanValue::from_yaml_str(text).unwrap()
}

/// A problem directory with `generators/gen` and `submissions/sol`.
pub struct Problem {
    pub dir: TempDir,
}

impl Problem {
    pub fn new() -> Self {
        let problem = Self {
            dir: TempDir::new().unwrap(),
        };
        problem.add_program("generators/gen", "v1");
        problem.add_program("submissions/sol", "v1");
        problem
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create or rewrite a program file; its content is what gets fingerprinted.
    pub fn add_program(&self, relative: &str, content: &str) {
        let path = self.dir.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    pub fn engine(&self, settings: ExecutorSettings) -> Engine<ScriptedRunner> {
        self.engine_with_store(settings, Box::new(MemoryArtifactStore::new()))
    }

    pub fn engine_with_store(
        &self,
        settings: ExecutorSettings,
        store: Box<dyn ArtifactStore>,
    ) -> Engine<ScriptedRunner> {
        Engine::with_parts(self.path(), ScriptedRunner::default(), store, settings)
    }
}

/// Deterministic stand-in for real programs, keyed by program file name.
///
/// - `gen`: prints its arguments; `fail` exits 2, `hang` times out
/// - `sol`: echoes its stdin
/// - `wrong`: prints `wrong`
/// - `positive`: input validator accepting positive integers
/// - anything else: accepts (exit 42) with no output
#[derive(Default)]
pub struct ScriptedRunner {
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn calls(&self, program: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == program).count()
    }
}

impl ProcessRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<RunOutput, GenerationError> {
        let program = invocation
            .program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.calls.lock().push(program.clone());
        let stdin = invocation.stdin.clone().unwrap_or_default();

        let output = match program.as_str() {
            "gen" => match invocation.args.first().map(String::as_str) {
                Some("fail") => RunOutput::exited(2, "").with_stderr("boom"),
                Some("hang") => RunOutput::timed_out(),
                _ => RunOutput::exited(0, format!("{}\n", invocation.args.join(" "))),
            },
            "sol" => RunOutput::exited(0, stdin),
            "wrong" => RunOutput::exited(0, "wrong\n"),
            "positive" => {
                let text = String::from_utf8_lossy(&stdin);
                let ok = text
                    .split_whitespace()
                    .all(|token| token.parse::<u64>().map(|n| n > 0).unwrap_or(false));
                if ok {
                    RunOutput::exited(42, "")
                } else {
                    RunOutput::exited(43, "").with_stderr("not positive")
                }
            }
            _ => RunOutput::exited(42, ""),
        };
        Ok(output)
    }
}

/// Final status of one case in a report.
pub fn status(report: &casegen::report::Report, path: &str) -> casegen::report::CaseStatus {
    report
        .cases()
        .into_iter()
        .find(|case| case.path.as_str() == path)
        .map(|case| case.status.clone())
        .unwrap_or_else(|| panic!("no case {} in report", path))
}

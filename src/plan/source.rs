//! Plan file reading for the command line.
//!
//! The engine itself takes a [`PlanValue`]; this adapter only picks a parser from
//! the file extension. `.json` is parsed as JSON, anything else as YAML.

use crate::error::EngineError;
use crate::plan::value::PlanValue;
use std::path::Path;
use tracing::debug;

pub fn read_plan_file(path: &Path) -> Result<PlanValue, EngineError> {
    let text = std::fs::read_to_string(path).map_err(|err| {
        EngineError::PlanFile(format!("failed to read {}: {}", path.display(), err))
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    debug!(path = %path.display(), json = is_json, "Reading plan file");
    let value = if is_json {
        PlanValue::from_json_str(&text).map_err(|err| err.to_string())
    } else {
        PlanValue::from_yaml_str(&text).map_err(|err| err.to_string())
    };
    value.map_err(|message| {
        EngineError::PlanFile(format!("failed to parse {}: {}", path.display(), message))
    })
}

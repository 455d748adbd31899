//! Integration tests for plan loading, generation and export

mod config_integration;
mod export_commands;
mod generation_run;
mod plan_loading;
mod store_integration;
mod test_utils;
mod validation_fixtures;

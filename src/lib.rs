//! Casegen: Deterministic Testcase Generation
//!
//! Turns a hierarchical generation plan into a named, seeded and validated tree of
//! testcases (input, answer and optional output artifacts) by orchestrating external
//! generator, solution and validator programs.

pub mod cli;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod generation;
pub mod logging;
pub mod plan;
pub mod program;
pub mod report;
pub mod seed;
pub mod store;
pub mod types;
pub mod validation;

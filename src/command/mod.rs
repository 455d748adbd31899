//! Command handling: shell-like tokenizing and placeholder substitution.

pub mod template;
pub mod tokenizer;

pub use template::{CommandTemplate, Substitution};
pub use tokenizer::tokenize;

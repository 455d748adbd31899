//! Command templates with `{seed}`, `{seed:W}`, `{name}` and `{count}` placeholders.

use crate::command::tokenizer::tokenize;
use crate::error::TokenizeError;
use crate::types::Seed;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn seed_regex() -> Option<&'static Regex> {
    static SEED_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    SEED_REGEX
        .get_or_init(|| Regex::new(r"\{seed(?::([0-9]+))?\}").ok())
        .as_ref()
}

/// Values bound to placeholders for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct Substitution<'a> {
    pub name: &'a str,
    pub seed: Option<Seed>,
    pub count: u32,
}

/// A command as written in the plan. The raw text is what seeds and cache keys
/// are derived from; substitution happens only when building an argument vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTemplate {
    raw: String,
    program: String,
}

impl CommandTemplate {
    /// Tokenize the raw text once so malformed commands fail at load time.
    pub fn parse(raw: &str) -> Result<Self, TokenizeError> {
        let tokens = tokenize(raw)?;
        let program = tokens.into_iter().next().ok_or(TokenizeError::Empty)?;
        Ok(Self {
            raw: raw.to_string(),
            program,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Program token of the unsubstituted command.
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn seed_placeholders(&self) -> usize {
        seed_regex().map_or(0, |re| re.find_iter(&self.raw).count())
    }

    pub fn substitute(&self, values: &Substitution<'_>) -> String {
        let with_seed = match seed_regex() {
            Some(re) => re
                .replace_all(&self.raw, |caps: &Captures<'_>| match values.seed {
                    Some(seed) => seed.render(caps.get(1).and_then(|w| w.as_str().parse().ok())),
                    None => caps[0].to_string(),
                })
                .into_owned(),
            None => self.raw.clone(),
        };
        with_seed
            .replace("{name}", values.name)
            .replace("{count}", &values.count.to_string())
    }

    /// Program and arguments after substitution.
    pub fn argv(&self, values: &Substitution<'_>) -> Result<(String, Vec<String>), TokenizeError> {
        let mut tokens = tokenize(&self.substitute(values))?.into_iter();
        let program = tokens.next().ok_or(TokenizeError::Empty)?;
        Ok((program, tokens.collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(seed: Option<u32>) -> Substitution<'static> {
        Substitution {
            name: "07",
            seed: seed.map(Seed::new),
            count: 3,
        }
    }

    #[test]
    fn parse_extracts_program() {
        let template = CommandTemplate::parse("random.py --n 5").unwrap();
        assert_eq!(template.program(), "random.py");
        assert_eq!(template.raw(), "random.py --n 5");
    }

    #[test]
    fn parse_rejects_empty_command() {
        assert_eq!(CommandTemplate::parse("  "), Err(TokenizeError::Empty));
    }

    #[test]
    fn substitutes_all_placeholders() {
        let template = CommandTemplate::parse("gen {seed} {seed:5} {name} {count}").unwrap();
        assert_eq!(template.substitute(&values(Some(42))), "gen 42 00042 07 3");
    }

    #[test]
    fn seed_left_verbatim_without_seed() {
        let template = CommandTemplate::parse("sol {seed}").unwrap();
        assert_eq!(template.substitute(&values(None)), "sol {seed}");
    }

    #[test]
    fn counts_seed_placeholders() {
        assert_eq!(CommandTemplate::parse("g {seed:2} x").unwrap().seed_placeholders(), 1);
        assert_eq!(CommandTemplate::parse("g {seed} {seed}").unwrap().seed_placeholders(), 2);
        assert_eq!(CommandTemplate::parse("g {seedling}").unwrap().seed_placeholders(), 0);
    }

    #[test]
    fn argv_splits_after_substitution() {
        let template = CommandTemplate::parse("gen 'a {name}' {seed}").unwrap();
        let (program, args) = template.argv(&values(Some(1))).unwrap();
        assert_eq!(program, "gen");
        assert_eq!(args, vec!["a 07", "1"]);
    }
}

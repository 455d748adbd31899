//! Name resolution for the entries of one group.
//!
//! Explicit names are kept. Unnamed entries receive the next free positive ordinal in
//! declaration order; explicit numeric names reserve their ordinal. Ordinals are
//! zero-padded to the digit count of the largest ordinal in the group, computed once
//! every ordinal is known.

use crate::error::NamingError;
use crate::types::CasePath;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::OnceLock;

fn name_regex() -> Option<&'static Regex> {
    static NAME_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    NAME_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9_.-]*[A-Za-z0-9])?$").ok())
        .as_ref()
}

pub fn is_valid_name(name: &str) -> bool {
    name_regex().is_some_and(|re| re.is_match(name))
}

/// Ordinal claimed by an explicit name made only of digits.
fn reserved_ordinal(name: &str) -> Option<u64> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse::<u64>().ok().filter(|n| *n > 0)
}

fn digits(n: u64) -> usize {
    n.to_string().len()
}

pub fn resolve_names(
    group: &CasePath,
    declared: &[Option<&str>],
) -> Result<Vec<String>, NamingError> {
    let mut claims: BTreeMap<u64, &str> = BTreeMap::new();
    for name in declared.iter().flatten() {
        let Some(ordinal) = reserved_ordinal(name) else {
            continue;
        };
        match claims.get(&ordinal) {
            // Repeating the same name is reported as a duplicate below
            Some(other) if *other != *name => {
                return Err(NamingError::AmbiguousOrdinal {
                    group: group.to_string(),
                    name: name.to_string(),
                    other: other.to_string(),
                    ordinal,
                });
            }
            Some(_) => {}
            None => {
                claims.insert(ordinal, *name);
            }
        }
    }
    let reserved: BTreeSet<u64> = claims.keys().copied().collect();

    let mut next = 1u64;
    let mut ordinals = Vec::with_capacity(declared.len());
    for name in declared {
        match name {
            Some(name) if !name.is_empty() => ordinals.push(None),
            _ => {
                while reserved.contains(&next) {
                    next += 1;
                }
                ordinals.push(Some(next));
                next += 1;
            }
        }
    }

    let largest = ordinals
        .iter()
        .flatten()
        .chain(reserved.iter())
        .copied()
        .max()
        .unwrap_or(0);
    let width = digits(largest.max(1));

    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(declared.len());
    for (name, ordinal) in declared.iter().zip(ordinals) {
        let name = match ordinal {
            Some(ordinal) => format!("{:0width$}", ordinal, width = width),
            None => {
                let name = name.unwrap_or_default().to_string();
                if !is_valid_name(&name) {
                    return Err(NamingError::InvalidName {
                        group: group.to_string(),
                        name,
                    });
                }
                name
            }
        };
        if !seen.insert(name.clone()) {
            return Err(NamingError::Duplicate {
                group: group.to_string(),
                name,
            });
        }
        resolved.push(name);
    }
    Ok(resolved)
}

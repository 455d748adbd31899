//! Plan loader: normalizes a parsed plan into the canonical Group/Case tree.
//!
//! Group contents (`data`) may be written as a mapping of names to specs, a
//! sequence of single-entry mappings / bare commands / inline specs, or one bare
//! command. All three shapes are flattened into the same entry list right away, so
//! naming and seeding never look at the original shape. Loading is all-or-nothing.

use crate::command::CommandTemplate;
use crate::error::{PlanError, SchemaError};
use crate::plan::naming::resolve_names;
use crate::plan::tree::{Case, CaseSource, CaseTree, Entry, Group};
use crate::plan::value::PlanValue;
use crate::seed::derive_seed;
use crate::types::CasePath;
use tracing::{debug, info, instrument};

pub const RESERVED_KEYS: &[&str] = &[
    "solution",
    "salt",
    "generate",
    "copy",
    "in",
    "ans",
    "out",
    "data",
    "visualizer",
    "count",
];

const GROUP_KEYS: &[&str] = &["solution", "salt", "visualizer", "data"];
const SOURCE_KEYS: &[&str] = &["generate", "copy", "in"];

/// Settings inherited down the tree. Each node's effective value is its own
/// override, or else the parent's.
#[derive(Debug, Clone, Default)]
struct Inherited {
    salt: String,
    solution: Option<CommandTemplate>,
    visualizer: Option<CommandTemplate>,
}

#[derive(Debug, Clone, Default)]
struct Overrides {
    salt: Option<String>,
    solution: Option<CommandTemplate>,
    visualizer: Option<CommandTemplate>,
}

impl Inherited {
    fn apply(&self, overrides: &Overrides) -> Inherited {
        Inherited {
            salt: overrides.salt.clone().unwrap_or_else(|| self.salt.clone()),
            solution: overrides
                .solution
                .clone()
                .or_else(|| self.solution.clone()),
            visualizer: overrides
                .visualizer
                .clone()
                .or_else(|| self.visualizer.clone()),
        }
    }
}

#[derive(Debug, Clone)]
enum RawSource {
    Generate(CommandTemplate),
    Copy(CasePath),
    Literal {
        input: String,
        answer: Option<String>,
        output: Option<String>,
    },
}

#[derive(Debug, Clone)]
struct RawCase {
    source: RawSource,
    overrides: Overrides,
    count: u32,
}

#[derive(Debug, Clone)]
enum RawBody<'a> {
    Case(RawCase),
    Group(&'a [(String, PlanValue)]),
}

#[derive(Debug, Clone)]
struct RawEntry<'a> {
    name: Option<String>,
    body: RawBody<'a>,
    count_index: u32,
}

/// Load a plan into the canonical tree.
#[instrument(skip(plan))]
pub fn load_plan(plan: &PlanValue) -> Result<CaseTree, PlanError> {
    let root_map = plan.as_map().ok_or(SchemaError::UnexpectedShape {
        path: CasePath::root().to_string(),
        expected: "mapping",
        found: plan.kind_name(),
    })?;
    let root = build_group(String::new(), CasePath::root(), root_map, &Inherited::default())?;
    let tree = CaseTree { root };
    info!(cases = tree.case_count(), "Plan loaded");
    Ok(tree)
}

fn build_group(
    name: String,
    path: CasePath,
    map: &[(String, PlanValue)],
    parent: &Inherited,
) -> Result<Group, PlanError> {
    check_keys(&path, map, GROUP_KEYS, "only solution, salt, visualizer and data apply to groups")?;
    let overrides = parse_overrides(&path, map)?;
    let context = parent.apply(&overrides);

    let data = lookup(map, "data");
    let raw = normalize_entries(&path, data)?;
    let raw = expand_counts(raw);

    let declared: Vec<Option<&str>> = raw.iter().map(|entry| entry.name.as_deref()).collect();
    let names = resolve_names(&path, &declared)?;

    let mut entries = Vec::with_capacity(raw.len());
    for (entry, child_name) in raw.into_iter().zip(names) {
        let child_path = path.join(&child_name);
        match entry.body {
            RawBody::Group(child_map) => {
                entries.push(Entry::Group(build_group(
                    child_name, child_path, child_map, &context,
                )?));
            }
            RawBody::Case(raw_case) => {
                entries.push(Entry::Case(build_case(
                    child_name,
                    child_path,
                    &path,
                    raw_case,
                    entry.count_index,
                    &context,
                )?));
            }
        }
    }

    debug!(group = %path, entries = entries.len(), "Group resolved");
    Ok(Group {
        name,
        path,
        entries,
        salt: context.salt,
        solution: context.solution,
        visualizer: context.visualizer,
    })
}

fn build_case(
    name: String,
    path: CasePath,
    group: &CasePath,
    raw: RawCase,
    count_index: u32,
    parent: &Inherited,
) -> Result<Case, PlanError> {
    let context = parent.apply(&raw.overrides);
    let source = match raw.source {
        RawSource::Generate(command) => {
            let seed = derive_seed(group, &name, command.raw(), &context.salt);
            CaseSource::Generated {
                command,
                salt: context.salt.clone(),
                seed,
            }
        }
        RawSource::Copy(reference) => CaseSource::Copied { reference },
        RawSource::Literal {
            input,
            answer,
            output,
        } => CaseSource::Literal {
            input,
            answer,
            output,
        },
    };
    Ok(Case {
        name,
        path,
        group: group.clone(),
        source,
        solution: context.solution,
        visualizer: context.visualizer,
        count_index,
    })
}

/// Flatten the three group shapes into one entry list.
fn normalize_entries<'a>(
    path: &CasePath,
    data: Option<&'a PlanValue>,
) -> Result<Vec<RawEntry<'a>>, PlanError> {
    let mut entries = Vec::new();
    match data {
        None | Some(PlanValue::Null) => {}
        Some(command @ PlanValue::Scalar(_)) => {
            entries.push(unnamed(parse_spec(&entry_path(path, None, 0), command)?));
        }
        Some(PlanValue::Map(pairs)) => {
            for (index, (key, value)) in pairs.iter().enumerate() {
                let name = (!key.is_empty()).then(|| key.clone());
                let display = entry_path(path, name.as_deref(), index);
                entries.push(RawEntry {
                    body: parse_spec(&display, value)?,
                    name,
                    count_index: 1,
                });
            }
        }
        Some(PlanValue::Seq(items)) => {
            for (index, item) in items.iter().enumerate() {
                match item {
                    PlanValue::Scalar(_) => {
                        entries.push(unnamed(parse_spec(&entry_path(path, None, index), item)?));
                    }
                    PlanValue::Map(pairs)
                        if pairs.iter().any(|(k, _)| RESERVED_KEYS.contains(&k.as_str())) =>
                    {
                        entries.push(unnamed(parse_spec(&entry_path(path, None, index), item)?));
                    }
                    PlanValue::Map(pairs) if pairs.len() == 1 => {
                        let (key, value) = &pairs[0];
                        let name = (!key.is_empty()).then(|| key.clone());
                        let display = entry_path(path, name.as_deref(), index);
                        entries.push(RawEntry {
                            body: parse_spec(&display, value)?,
                            name,
                            count_index: 1,
                        });
                    }
                    other => {
                        return Err(SchemaError::UnexpectedShape {
                            path: entry_path(path, None, index),
                            expected: "single-entry mapping, command or testcase spec",
                            found: if matches!(other, PlanValue::Map(_)) {
                                "multi-entry mapping"
                            } else {
                                other.kind_name()
                            },
                        }
                        .into());
                    }
                }
            }
        }
    }
    Ok(entries)
}

fn unnamed(body: RawBody<'_>) -> RawEntry<'_> {
    RawEntry {
        name: None,
        body,
        count_index: 1,
    }
}

/// Path used in schema messages before names are resolved.
fn entry_path(group: &CasePath, name: Option<&str>, index: usize) -> String {
    let leaf = match name {
        Some(name) => name.to_string(),
        None => format!("[{}]", index),
    };
    group.join(&leaf).to_string()
}

/// Clone `count: N` entries into N siblings before naming.
fn expand_counts(entries: Vec<RawEntry<'_>>) -> Vec<RawEntry<'_>> {
    let mut expanded = Vec::with_capacity(entries.len());
    for entry in entries {
        let count = match &entry.body {
            RawBody::Case(raw) => raw.count,
            RawBody::Group(_) => 1,
        };
        if count <= 1 {
            expanded.push(entry);
            continue;
        }
        for index in 1..=count {
            expanded.push(RawEntry {
                name: entry.name.as_ref().map(|name| format!("{}-{}", name, index)),
                body: entry.body.clone(),
                count_index: index,
            });
        }
    }
    expanded
}

/// Classify one spec as group or case and check its shape.
fn parse_spec<'a>(path: &str, value: &'a PlanValue) -> Result<RawBody<'a>, PlanError> {
    match value {
        PlanValue::Scalar(command) => {
            if command.trim().is_empty() {
                return Err(SchemaError::EmptyValue {
                    path: path.to_string(),
                    key: "generate".to_string(),
                }
                .into());
            }
            Ok(RawBody::Case(RawCase {
                source: RawSource::Generate(parse_generate(path, command)?),
                overrides: Overrides::default(),
                count: 1,
            }))
        }
        PlanValue::Map(pairs) if lookup(pairs, "data").is_some() => Ok(RawBody::Group(pairs)),
        PlanValue::Map(pairs) => Ok(RawBody::Case(parse_case_map(path, pairs)?)),
        other => Err(SchemaError::UnexpectedShape {
            path: path.to_string(),
            expected: "command or testcase spec",
            found: other.kind_name(),
        }
        .into()),
    }
}

fn parse_case_map(path: &str, map: &[(String, PlanValue)]) -> Result<RawCase, PlanError> {
    for (key, _) in map {
        if !RESERVED_KEYS.contains(&key.as_str()) {
            return Err(SchemaError::UnknownKey {
                path: path.to_string(),
                key: key.clone(),
            }
            .into());
        }
    }

    let declared: Vec<&str> = SOURCE_KEYS
        .iter()
        .copied()
        .filter(|key| lookup(map, key).is_some())
        .collect();
    if declared.len() > 1 {
        return Err(SchemaError::ConflictingSources {
            path: path.to_string(),
            kinds: declared.join(", "),
        }
        .into());
    }
    let source_key = *declared.first().ok_or_else(|| SchemaError::MissingSource {
        path: path.to_string(),
    })?;

    if source_key != "in" {
        for key in ["ans", "out"] {
            if lookup(map, key).is_some() {
                return Err(SchemaError::MisplacedKey {
                    path: path.to_string(),
                    key: key.to_string(),
                    reason: "literal answers and outputs require a literal input",
                }
                .into());
            }
        }
    }

    let source = match source_key {
        "generate" => {
            let command = required_text(path, map, "generate")?;
            RawSource::Generate(parse_generate(path, command)?)
        }
        "copy" => RawSource::Copy(CasePath::parse(required_text(path, map, "copy")?)),
        _ => RawSource::Literal {
            input: literal_text(scalar(path, map, "in")?.unwrap_or_default()),
            answer: scalar(path, map, "ans")?.map(literal_text),
            output: scalar(path, map, "out")?.map(literal_text),
        },
    };

    Ok(RawCase {
        source,
        overrides: parse_overrides_at(path, map)?,
        count: parse_count(path, map)?,
    })
}

fn parse_generate(path: &str, command: &str) -> Result<CommandTemplate, PlanError> {
    let template = CommandTemplate::parse(command).map_err(|source| PlanError::Tokenize {
        path: path.to_string(),
        source,
    })?;
    if template.seed_placeholders() > 1 {
        return Err(SchemaError::RepeatedSeed {
            path: path.to_string(),
            command: command.to_string(),
        }
        .into());
    }
    Ok(template)
}

fn parse_count(path: &str, map: &[(String, PlanValue)]) -> Result<u32, PlanError> {
    match scalar(path, map, "count")? {
        None => Ok(1),
        Some(text) => text
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                SchemaError::InvalidCount {
                    path: path.to_string(),
                    value: text.to_string(),
                }
                .into()
            }),
    }
}

fn parse_overrides(path: &CasePath, map: &[(String, PlanValue)]) -> Result<Overrides, PlanError> {
    parse_overrides_at(&path.to_string(), map)
}

fn parse_overrides_at(path: &str, map: &[(String, PlanValue)]) -> Result<Overrides, PlanError> {
    let template = |key: &str| -> Result<Option<CommandTemplate>, PlanError> {
        match scalar(path, map, key)? {
            None => Ok(None),
            Some(command) => CommandTemplate::parse(command)
                .map(Some)
                .map_err(|source| PlanError::Tokenize {
                    path: format!("{} ({})", path, key),
                    source,
                }),
        }
    };
    Ok(Overrides {
        salt: scalar(path, map, "salt")?.map(str::to_string),
        solution: template("solution")?,
        visualizer: template("visualizer")?,
    })
}

fn check_keys(
    path: &CasePath,
    map: &[(String, PlanValue)],
    allowed: &[&str],
    reason: &'static str,
) -> Result<(), SchemaError> {
    for (key, _) in map {
        if allowed.contains(&key.as_str()) {
            continue;
        }
        if RESERVED_KEYS.contains(&key.as_str()) {
            return Err(SchemaError::MisplacedKey {
                path: path.to_string(),
                key: key.clone(),
                reason,
            });
        }
        return Err(SchemaError::UnknownKey {
            path: path.to_string(),
            key: key.clone(),
        });
    }
    Ok(())
}

fn lookup<'a>(map: &'a [(String, PlanValue)], key: &str) -> Option<&'a PlanValue> {
    map.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

/// Scalar value under `key`; a present non-scalar is a schema error.
fn scalar<'a>(
    path: &str,
    map: &'a [(String, PlanValue)],
    key: &str,
) -> Result<Option<&'a str>, SchemaError> {
    match lookup(map, key) {
        None => Ok(None),
        Some(PlanValue::Scalar(text)) => Ok(Some(text)),
        Some(other) => Err(SchemaError::UnexpectedShape {
            path: format!("{} ({})", path, key),
            expected: "scalar",
            found: other.kind_name(),
        }),
    }
}

fn required_text<'a>(
    path: &str,
    map: &'a [(String, PlanValue)],
    key: &str,
) -> Result<&'a str, SchemaError> {
    match scalar(path, map, key)? {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(SchemaError::EmptyValue {
            path: path.to_string(),
            key: key.to_string(),
        }),
    }
}

/// Literal testcase text gets a final newline when it has none.
fn literal_text(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{}\n", text)
    }
}

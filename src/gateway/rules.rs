use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One constraint on an input field. `MinLength`/`MaxLength` count
/// characters of string values, `Min`/`Max` bound integer values.
#[derive(Debug, Clone)]
pub enum Rule {
    Required,
    Nullable,
    String,
    Integer,
    /// Must be explicitly affirmed: true, 1, "1", "yes", "on" or "true".
    Accepted,
    MinLength(usize),
    MaxLength(usize),
    Min(i64),
    Max(i64),
    Pattern(Regex),
    OneOf(&'static [&'static str]),
}

/// Ordered field -> rules table for one action
#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    fields: Vec<(String, Vec<Rule>)>,
}

impl FieldRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.push((name.to_string(), rules.into_iter().collect()));
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Validate `input`, returning only the declared fields. Undeclared
    /// keys in the input are dropped.
    pub fn validate(&self, input: &Map<String, Value>) -> Result<Map<String, Value>, BTreeMap<String, String>> {
        let mut validated = Map::new();
        let mut errors = BTreeMap::new();

        for (name, rules) in &self.fields {
            let value = input.get(name).cloned().unwrap_or(Value::Null);
            match check_field(name, &value, rules) {
                Ok(Some(value)) => {
                    validated.insert(name.clone(), value);
                }
                Ok(None) => {}
                Err(message) => {
                    errors.insert(name.clone(), message);
                }
            }
        }

        if errors.is_empty() {
            Ok(validated)
        } else {
            Err(errors)
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

fn is_accepted(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.as_str(), "1" | "yes" | "on" | "true"),
        _ => false,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn check_field(name: &str, value: &Value, rules: &[Rule]) -> Result<Option<Value>, String> {
    let label = name.replace('_', " ");
    let required = rules.iter().any(|r| matches!(r, Rule::Required));
    let accepted = rules.iter().any(|r| matches!(r, Rule::Accepted));

    if accepted {
        return if is_accepted(value) {
            Ok(Some(value.clone()))
        } else {
            Err(format!("The {} field must be accepted.", label))
        };
    }

    if is_blank(value) {
        if required {
            return Err(format!("The {} field is required.", label));
        }
        // Whitespace-only strings are kept verbatim (file content); null
        // and empty input count as absent.
        match value {
            Value::String(s) if !s.is_empty() => return Ok(Some(value.clone())),
            _ => return Ok(None),
        }
    }

    let mut normalized = value.clone();

    for rule in rules {
        match rule {
            Rule::Required | Rule::Nullable | Rule::Accepted => {}
            Rule::String => {
                if !value.is_string() {
                    return Err(format!("The {} field must be a string.", label));
                }
            }
            Rule::Integer => match as_integer(value) {
                Some(n) => normalized = Value::from(n),
                None => return Err(format!("The {} field must be an integer.", label)),
            },
            Rule::MinLength(min) => {
                if let Some(s) = value.as_str() {
                    if s.chars().count() < *min {
                        return Err(format!("The {} field must be at least {} characters.", label, min));
                    }
                }
            }
            Rule::MaxLength(max) => {
                if let Some(s) = value.as_str() {
                    if s.chars().count() > *max {
                        return Err(format!("The {} field must not be greater than {} characters.", label, max));
                    }
                }
            }
            Rule::Min(min) => {
                if as_integer(value).map_or(false, |n| n < *min) {
                    return Err(format!("The {} field must be at least {}.", label, min));
                }
            }
            Rule::Max(max) => {
                if as_integer(value).map_or(false, |n| n > *max) {
                    return Err(format!("The {} field must not be greater than {}.", label, max));
                }
            }
            Rule::Pattern(re) => {
                if !value.as_str().map_or(false, |s| re.is_match(s)) {
                    return Err(format!("The {} field format is invalid.", label));
                }
            }
            Rule::OneOf(allowed) => {
                if !value.as_str().map_or(false, |s| allowed.contains(&s)) {
                    return Err(format!("The selected {} is invalid.", label));
                }
            }
        }
    }

    Ok(Some(normalized))
}

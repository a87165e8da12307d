// Textual attribute maps scraped from one capability entry

use super::fields::{FieldName, Unit};
use nom::{
    bytes::complete::tag,
    character::complete::{digit1, multispace0},
    combinator::opt,
    error::{Error, ErrorKind},
    IResult, Parser,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name to textual value, e.g. `voltage` -> `"5000mV"`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap {
    entries: BTreeMap<String, String>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Numeric value of a field in its attribute unit (mV, mA, mW or a bare
    /// count). `None` when absent or malformed.
    pub fn value(&self, field: FieldName) -> Option<u32> {
        let text = self.get(field.as_str())?;
        let parsed = parse_unit_value(text, field.unit());
        if parsed.is_none() {
            tracing::trace!(field = %field, text, "Ignoring malformed attribute value");
        }
        parsed
    }

    /// Like [`AttributeMap::value`] but missing or malformed values read as 0
    pub fn value_or_zero(&self, field: FieldName) -> u32 {
        self.value(field).unwrap_or(0)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AttributeMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Parse a decimal integer optionally followed by the unit suffix
fn unit_value<'a>(input: &'a str, suffix: &'static str) -> IResult<&'a str, u32> {
    let (rest, _) = multispace0::<&str, Error<&str>>(input)?;
    let (rest, digits) = digit1::<&str, Error<&str>>(rest)?;
    let value = digits
        .parse::<u32>()
        .map_err(|_| nom::Err::Error(Error::new(input, ErrorKind::Digit)))?;
    let (rest, _) = opt(tag::<&str, &str, Error<&str>>(suffix)).parse(rest)?;
    let (rest, _) = multispace0::<&str, Error<&str>>(rest)?;
    Ok((rest, value))
}

/// Parse `"5000mV"`-style text. Text with a different suffix, a sign or
/// trailing garbage is rejected.
pub fn parse_unit_value(text: &str, unit: Unit) -> Option<u32> {
    match unit_value(text, unit.suffix()) {
        Ok(("", value)) => Some(value),
        _ => None,
    }
}

//! Typed lookup cell values and their CSV text form.

use std::collections::BTreeMap;
use std::fmt;

use super::LookupError;

/// Row parameters keyed by column name.
///
/// Keys iterate in sorted order, which is also the column order of a table.
pub type Params = BTreeMap<String, Value>;

/// Builds [`Params`] from `(column, value)` pairs.
///
/// ```
/// use artifactory_client::lookup::{Value, params};
/// let row = params([("a", Value::from(1)), ("b", Value::from("x"))]);
/// assert_eq!(row.keys().collect::<Vec<_>>(), ["a", "b"]);
/// ```
pub fn params<K, V, I>(entries: I) -> Params
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// A single cell of a lookup table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Empty cell.
    Null,
    Text(String),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// This value as it reads back from CSV: empty text becomes null.
    #[must_use]
    pub fn stored(&self) -> Self {
        match self {
            Self::Text(text) if text.is_empty() => Self::Null,
            other => other.clone(),
        }
    }

    /// CSV text of this value.
    ///
    /// Floats always carry a decimal point or an exponent so they read back
    /// as floats. Exponents are signed with at least two digits (`1e+16`,
    /// `1e-05`), the form existing tables use.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Bool(true) => "True".to_string(),
            Self::Bool(false) => "False".to_string(),
            Self::Int(value) => value.to_string(),
            Self::Float(value) => encode_float(*value),
            Self::Null => String::new(),
            Self::Text(text) => text.clone(),
        }
    }

    /// Reads a CSV field.
    ///
    /// `""` is null, `True`/`False` are booleans, then integer and float
    /// parsing are tried in that order. Anything else is text.
    #[must_use]
    pub fn decode(field: &str) -> Self {
        match field {
            "" => Self::Null,
            "True" => Self::Bool(true),
            "False" => Self::Bool(false),
            _ => {
                let number = field.trim();
                if let Ok(value) = number.parse::<i64>() {
                    Self::Int(value)
                } else if let Ok(value) = number.parse::<f64>() {
                    Self::Float(value)
                } else {
                    Self::Text(field.to_string())
                }
            }
        }
    }

    /// Rejects text that would read back as another type.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::ForbiddenValue`] for text parsing as an
    /// integer or float, and for `True`, `False` and `None`.
    pub fn validate(&self) -> Result<(), LookupError> {
        let Self::Text(text) = self else {
            return Ok(());
        };
        let number = text.trim();
        let kind = if number.parse::<i64>().is_ok() {
            "int"
        } else if number.parse::<f64>().is_ok() {
            "float"
        } else {
            match text.as_str() {
                "True" | "False" => "bool",
                "None" => "NoneType",
                _ => return Ok(()),
            }
        };
        Err(LookupError::forbidden_value(text, kind))
    }
}

fn encode_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let text = format!("{value:?}");
    let Some((mantissa, exponent)) = text.split_once('e') else {
        return text;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("None"),
            Self::Text(text) => write!(f, "'{text}'"),
            other => f.write_str(&other.encode()),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Formats params like `{'a': 1, 'b': None}` for error messages.
pub(crate) fn describe(params: &Params) -> String {
    let entries: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("'{key}': {value}"))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

/// Column names, optionally with the value new columns are filled with.
///
/// Built from a single name, a list of names, or `(name, value)` pairs.
/// Caller order is kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Columns(Vec<(String, Value)>);

impl Columns {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub(crate) fn validate(&self) -> Result<(), LookupError> {
        self.0.iter().try_for_each(|(_, value)| value.validate())
    }
}

impl From<&str> for Columns {
    fn from(name: &str) -> Self {
        Self(vec![(name.to_string(), Value::Null)])
    }
}

impl From<String> for Columns {
    fn from(name: String) -> Self {
        Self(vec![(name, Value::Null)])
    }
}

impl From<&[&str]> for Columns {
    fn from(names: &[&str]) -> Self {
        Self(
            names
                .iter()
                .map(|name| ((*name).to_string(), Value::Null))
                .collect(),
        )
    }
}

impl<const N: usize> From<[&str; N]> for Columns {
    fn from(names: [&str; N]) -> Self {
        Self::from(names.as_slice())
    }
}

impl From<Vec<&str>> for Columns {
    fn from(names: Vec<&str>) -> Self {
        Self::from(names.as_slice())
    }
}

impl From<Vec<String>> for Columns {
    fn from(names: Vec<String>) -> Self {
        Self(names.into_iter().map(|name| (name, Value::Null)).collect())
    }
}

impl From<Vec<(String, Value)>> for Columns {
    fn from(entries: Vec<(String, Value)>) -> Self {
        Self(entries)
    }
}

impl<const N: usize> From<[(&str, Value); N]> for Columns {
    fn from(entries: [(&str, Value); N]) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
        )
    }
}

impl From<Params> for Columns {
    fn from(params: Params) -> Self {
        Self(params.into_iter().collect())
    }
}

impl From<&Params> for Columns {
    fn from(params: &Params) -> Self {
        Self(
            params
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
        )
    }
}

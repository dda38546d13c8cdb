//! Schema validation.
//!
//! Fail-fast: fields are checked in declaration order and the first violation
//! is returned. `null` and missing keys are both "absent". Absent optional
//! fields are skipped; defaults are the entity's business, not the validator's.

use crate::schema::{FieldDescriptor, FieldKind, Schema};
use idolbase_types::EnumError;
use serde_json::{Map, Value};
use std::borrow::Cow;
use tracing::trace;

/// Errors raised by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required property '{field}'")]
    MissingRequiredField { field: String },

    #[error("Expected {field} to be a {expected}, instead got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Expected {field} to be a date with format YYYYMMDD, instead got {value}")]
    InvalidDateFormat { field: String, value: String },

    #[error("Expected {field} to be a year number format YYYY, instead got {value}")]
    InvalidYearFormat { field: String, value: String },

    #[error(transparent)]
    Enum(#[from] EnumError),
}

impl ValidationError {
    /// External name of the offending field, when the error is tied to one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingRequiredField { field }
            | Self::TypeMismatch { field, .. }
            | Self::InvalidDateFormat { field, .. }
            | Self::InvalidYearFormat { field, .. } => Some(field),
            Self::Enum(_) => None,
        }
    }
}

/// Runtime category of a JSON value, as named in type-mismatch messages.
#[must_use]
pub fn value_category(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Text an enum field is checked by: the string itself, or the JSON
/// rendering of any other value.
pub(crate) fn enum_candidate(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

/// Validates `record` against `schema`.
pub fn validate(record: &Map<String, Value>, schema: &Schema) -> Result<(), ValidationError> {
    for field in schema.fields() {
        let value = record.get(field.name).filter(|v| !v.is_null());

        let Some(value) = value else {
            if field.required {
                trace!("{}: missing required field {}", schema.kind(), field.name);
                return Err(ValidationError::MissingRequiredField {
                    field: field.external_name().to_string(),
                });
            }
            continue;
        };

        check_value(field, value).inspect_err(|e| {
            trace!("{}: field {} rejected: {e}", schema.kind(), field.name);
        })?;
    }

    Ok(())
}

fn check_value(field: &FieldDescriptor, value: &Value) -> Result<(), ValidationError> {
    let matches = match field.kind {
        FieldKind::String => value.is_string(),
        FieldKind::Number => value.is_number(),
        FieldKind::Boolean => value.is_boolean(),
        FieldKind::Array => value.is_array(),
        FieldKind::Object => value.is_object(),
        FieldKind::Enum(set) => {
            let candidate = enum_candidate(value);
            set.check(Some(&*candidate))?;
            true
        }
        FieldKind::Date8 => return check_date8(field, value),
        FieldKind::Year4 => return check_year4(field, value),
    };

    if matches {
        Ok(())
    } else {
        Err(ValidationError::TypeMismatch {
            field: field.external_name().to_string(),
            expected: field.kind.expected_name(),
            actual: value_category(value),
        })
    }
}

/// Range check only: no per-month day counts, no leap years.
fn check_date8(field: &FieldDescriptor, value: &Value) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidDateFormat {
        field: field.external_name().to_string(),
        value: value.to_string(),
    };

    let date = value.as_u64().ok_or_else(invalid)?;
    if !(10_000_000..=99_999_999).contains(&date) {
        return Err(invalid());
    }

    let (year, month, day) = split_date8(date).ok_or_else(invalid)?;
    if year < 1000 || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(invalid());
    }

    Ok(())
}

fn check_year4(field: &FieldDescriptor, value: &Value) -> Result<(), ValidationError> {
    match value.as_u64() {
        Some(year) if (1000..=9999).contains(&year) => Ok(()),
        _ => Err(ValidationError::InvalidYearFormat {
            field: field.external_name().to_string(),
            value: value.to_string(),
        }),
    }
}

/// Splits an eight-digit integer date into year, month and day.
#[must_use]
pub fn split_date8(date: u64) -> Option<(u32, u32, u32)> {
    let digits = date.to_string();
    if digits.len() != 8 {
        return None;
    }
    let year = digits[..4].parse().ok()?;
    let month = digits[4..6].parse().ok()?;
    let day = digits[6..].parse().ok()?;
    Some((year, month, day))
}

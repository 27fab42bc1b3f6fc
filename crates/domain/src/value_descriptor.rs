//! Value descriptor: the registered definition a reading's name must satisfy.
//!
//! A descriptor carries a type code, an optional printf-style formatting
//! pattern, optional bounds, a unit-of-measure label and free-form labels.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreDataError, ValidationError};
use crate::id::ValueDescriptorId;
use crate::time::Millis;

/// printf-style conversion: argument index, flags, width, precision, date
/// prefix, conversion character.
const FORMAT_SPECIFIER: &str = r"%(\d+\$)?([-#+ 0,(<]*)?(\d+)?(\.\d+)?([tT])?([a-zA-Z%])";

static FORMAT_SPECIFIER_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(FORMAT_SPECIFIER));

/// Check a formatting pattern.
///
/// Empty patterns are valid. A non-empty pattern is valid when it contains a
/// printf-style conversion specifier; `Ok(false)` means "does not match".
///
/// # Errors
///
/// Returns [`ValidationError::FormatPattern`] only when the matcher itself
/// cannot be built.
pub fn validate_format_string(formatting: &str) -> Result<bool, ValidationError> {
    if formatting.is_empty() {
        return Ok(true);
    }
    let re = FORMAT_SPECIFIER_RE
        .as_ref()
        .map_err(|err| ValidationError::FormatPattern(err.clone()))?;
    Ok(re.is_match(formatting))
}

/// Value type understood by ingest validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Integer,
    Float,
    Json,
    String,
}

impl ValueType {
    /// Map a descriptor type code; unknown codes are treated as strings.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "B" | "BOOL" | "BOOLEAN" => Self::Bool,
            "I" | "INT" | "INTEGER" | "INT8" | "INT16" | "INT32" | "INT64" | "UINT8"
            | "UINT16" | "UINT32" | "UINT64" => Self::Integer,
            "F" | "FLOAT" | "FLOAT32" | "FLOAT64" | "DOUBLE" => Self::Float,
            "J" | "JSON" => Self::Json,
            _ => Self::String,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Json => "JSON document",
            Self::String => "string",
        }
    }
}

/// A registered value descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueDescriptor {
    pub id: ValueDescriptorId,
    /// Unique key referenced by readings.
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub value_type: String,
    /// printf-style pattern, or empty.
    pub formatting: String,
    pub min: String,
    pub max: String,
    pub default_value: String,
    pub uom_label: String,
    pub labels: Vec<String>,
    pub origin: Millis,
    pub created: Millis,
    pub modified: Millis,
}

impl ValueDescriptor {
    /// Create a builder for constructing a [`ValueDescriptor`].
    #[must_use]
    pub fn builder() -> ValueDescriptorBuilder {
        ValueDescriptorBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::Validation`] when `name` is empty or the
    /// formatting pattern does not match.
    pub fn validate(&self) -> Result<(), CoreDataError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if !validate_format_string(&self.formatting)? {
            return Err(ValidationError::FormatMismatch(self.formatting.clone()).into());
        }
        Ok(())
    }

    /// Check a reading value against this descriptor.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the descriptor's own formatting is
    /// invalid, the value does not parse for the descriptor's type, or a
    /// numeric value lies outside parseable `min`/`max` bounds.
    pub fn check_value(&self, value: &str) -> Result<(), ValidationError> {
        if !validate_format_string(&self.formatting)? {
            return Err(ValidationError::FormatMismatch(self.formatting.clone()));
        }

        let value_type = ValueType::from_code(&self.value_type);
        let type_error = || ValidationError::ValueType {
            name: self.name.clone(),
            value: value.to_string(),
            expected: value_type.label(),
        };

        match value_type {
            ValueType::Bool => {
                value.parse::<bool>().map_err(|_| type_error())?;
            }
            ValueType::Integer => {
                value.trim().parse::<i64>().map_err(|_| type_error())?;
                self.check_range(value)?;
            }
            ValueType::Float => {
                value.trim().parse::<f64>().map_err(|_| type_error())?;
                self.check_range(value)?;
            }
            ValueType::Json => {
                serde_json::from_str::<serde_json::Value>(value).map_err(|_| type_error())?;
            }
            ValueType::String => {}
        }
        Ok(())
    }

    fn check_range(&self, value: &str) -> Result<(), ValidationError> {
        let Ok(number) = value.trim().parse::<f64>() else {
            return Ok(());
        };
        let below = self
            .min
            .trim()
            .parse::<f64>()
            .is_ok_and(|min| number < min);
        let above = self
            .max
            .trim()
            .parse::<f64>()
            .is_ok_and(|max| number > max);
        if below || above {
            return Err(ValidationError::OutOfRange {
                name: self.name.clone(),
                value: value.to_string(),
                min: self.min.clone(),
                max: self.max.clone(),
            });
        }
        Ok(())
    }
}

/// Step-by-step builder for [`ValueDescriptor`].
#[derive(Debug, Default)]
pub struct ValueDescriptorBuilder {
    id: Option<ValueDescriptorId>,
    name: Option<String>,
    description: String,
    value_type: String,
    formatting: String,
    min: String,
    max: String,
    default_value: String,
    uom_label: String,
    labels: Vec<String>,
    origin: Millis,
}

impl ValueDescriptorBuilder {
    #[must_use]
    pub fn id(mut self, id: ValueDescriptorId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn value_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = value_type.into();
        self
    }

    #[must_use]
    pub fn formatting(mut self, formatting: impl Into<String>) -> Self {
        self.formatting = formatting.into();
        self
    }

    #[must_use]
    pub fn min(mut self, min: impl Into<String>) -> Self {
        self.min = min.into();
        self
    }

    #[must_use]
    pub fn max(mut self, max: impl Into<String>) -> Self {
        self.max = max.into();
        self
    }

    #[must_use]
    pub fn default_value(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = default_value.into();
        self
    }

    #[must_use]
    pub fn uom_label(mut self, uom_label: impl Into<String>) -> Self {
        self.uom_label = uom_label.into();
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    #[must_use]
    pub fn origin(mut self, origin: Millis) -> Self {
        self.origin = origin;
        self
    }

    /// Consume the builder, validate, and return a [`ValueDescriptor`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreDataError::Validation`] if `name` is missing or empty, or
    /// the formatting pattern does not match.
    pub fn build(self) -> Result<ValueDescriptor, CoreDataError> {
        let descriptor = ValueDescriptor {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description,
            value_type: self.value_type,
            formatting: self.formatting,
            min: self.min,
            max: self.max,
            default_value: self.default_value,
            uom_label: self.uom_label,
            labels: self.labels,
            origin: self.origin,
            created: 0,
            modified: 0,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }
}

/// Merge-by-presence update for a [`ValueDescriptor`].
///
/// The target is located by `id` when present, otherwise by `name`.
/// `None` and empty strings leave the stored field untouched; `labels`
/// replaces the stored set whenever it is `Some`.
#[derive(Debug, Clone, Default)]
pub struct ValueDescriptorPatch {
    pub id: Option<ValueDescriptorId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub value_type: Option<String>,
    pub formatting: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub default_value: Option<String>,
    pub uom_label: Option<String>,
    pub labels: Option<Vec<String>>,
    pub origin: Option<Millis>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

impl ValueDescriptorPatch {
    #[must_use]
    pub fn new_name(&self) -> Option<&str> {
        present(self.name.as_ref())
    }

    #[must_use]
    pub fn new_formatting(&self) -> Option<&str> {
        present(self.formatting.as_ref())
    }

    /// Apply the present fields onto `target`.
    ///
    /// Format and rename checks are the caller's responsibility.
    pub fn apply(&self, target: &mut ValueDescriptor) {
        let assign = |slot: &mut String, value: Option<&String>| {
            if let Some(v) = present(value) {
                *slot = v.to_string();
            }
        };
        assign(&mut target.name, self.name.as_ref());
        assign(&mut target.description, self.description.as_ref());
        assign(&mut target.value_type, self.value_type.as_ref());
        assign(&mut target.formatting, self.formatting.as_ref());
        assign(&mut target.min, self.min.as_ref());
        assign(&mut target.max, self.max.as_ref());
        assign(&mut target.default_value, self.default_value.as_ref());
        assign(&mut target.uom_label, self.uom_label.as_ref());
        if let Some(labels) = &self.labels {
            target.labels.clone_from(labels);
        }
        if let Some(origin) = self.origin.filter(|o| *o != 0) {
            target.origin = origin;
        }
    }
}

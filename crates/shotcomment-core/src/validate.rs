//! Field-level validation for configuration values.
//!
//! A [`Field`] is a named slot guarded by a [`Validator`]. Every write goes
//! through [`Field::set`], which runs the validator against the candidate
//! value and only stores it when validation passes. Validators inspect a
//! [`serde_json::Value`] rendering of the candidate so that shape rules such
//! as "must be a string or a bool" can be expressed for any serializable type.

use serde::Serialize;
use serde_json::Value;

use crate::error::{CoreError, CoreResult, ValidationError};

/// A validation rule attached to a named field
pub trait Validator {
    /// Check `value` for the field called `field`
    fn validate(&self, field: &str, value: &Value) -> Result<(), ValidationError>;
}

impl<F> Validator for F
where
    F: Fn(&str, &Value) -> Result<(), ValidationError>,
{
    fn validate(&self, field: &str, value: &Value) -> Result<(), ValidationError> {
        self(field, value)
    }
}

/// Rejects empty lists, empty objects, and blank strings
///
/// Lists are only checked for length; their elements are not inspected.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEmpty;

impl Validator for NoEmpty {
    fn validate(&self, field: &str, value: &Value) -> Result<(), ValidationError> {
        let empty = match value {
            Value::String(s) => s.trim().is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Bool(_) | Value::Number(_) | Value::Null => {
                return Err(ValidationError::Unsized {
                    field: field.to_string(),
                });
            }
        };

        if empty {
            return Err(ValidationError::Empty {
                field: field.to_string(),
            });
        }

        Ok(())
    }
}

/// Accepts booleans and the strings `"true"` / `"false"` in any case
///
/// This only checks the shape of the value. Converting an accepted string to
/// a `bool` is left to the caller, see [`BoolLike::as_bool`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProperBool;

impl Validator for ProperBool {
    fn validate(&self, field: &str, value: &Value) -> Result<(), ValidationError> {
        match value {
            Value::Bool(_) => Ok(()),
            Value::String(s) => match s.to_lowercase().as_str() {
                "true" | "false" => Ok(()),
                _ => Err(ValidationError::InvalidBool {
                    field: field.to_string(),
                }),
            },
            _ => Err(ValidationError::NotBoolLike {
                field: field.to_string(),
            }),
        }
    }
}

/// Several validators applied in order
///
/// The first failing validator's error is returned and the remaining ones
/// are not run.
pub struct Composed {
    validators: Vec<Box<dyn Validator>>,
}

impl Validator for Composed {
    fn validate(&self, field: &str, value: &Value) -> Result<(), ValidationError> {
        for validator in &self.validators {
            validator.validate(field, value)?;
        }
        Ok(())
    }
}

/// Combine validators into a single one that runs them in sequence
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use shotcomment_core::validate::{NoEmpty, ProperBool, Validator, compose};
///
/// let rule = compose(vec![Box::new(NoEmpty), Box::new(ProperBool)]);
/// assert!(rule.validate("flag", &json!("true")).is_ok());
/// assert!(rule.validate("flag", &json!("")).is_err());
/// ```
pub fn compose(validators: Vec<Box<dyn Validator>>) -> Composed {
    Composed { validators }
}

/// A value that is either a native boolean or its textual form
///
/// Environment variables always arrive as text while defaults are real
/// booleans, so both shapes have to be accepted and validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BoolLike {
    Bool(bool),
    Text(String),
}

impl BoolLike {
    /// Interpret the value as a boolean
    ///
    /// Text is compared case-insensitively against `"true"`; anything else,
    /// including text [`ProperBool`] would reject, reads as `false`.
    pub fn as_bool(&self) -> bool {
        match self {
            BoolLike::Bool(b) => *b,
            BoolLike::Text(s) => s.eq_ignore_ascii_case("true"),
        }
    }
}

impl From<bool> for BoolLike {
    fn from(value: bool) -> Self {
        BoolLike::Bool(value)
    }
}

impl From<String> for BoolLike {
    fn from(value: String) -> Self {
        BoolLike::Text(value)
    }
}

/// A named, validated storage slot
///
/// The slot only ever holds a value that passed its validator. A rejected
/// write leaves whatever was stored before in place.
#[derive(Debug, Clone)]
pub struct Field<T, V = NoEmpty> {
    name: &'static str,
    validator: V,
    value: Option<T>,
}

impl<T, V> Field<T, V>
where
    T: Serialize,
    V: Validator,
{
    /// Declare an empty field guarded by `validator`
    pub fn new(name: &'static str, validator: V) -> Self {
        Self {
            name,
            validator,
            value: None,
        }
    }

    /// Name this field was declared with
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Validate `value` and store it on success
    pub fn set(&mut self, value: T) -> Result<(), ValidationError> {
        let rendered = serde_json::to_value(&value).map_err(|e| ValidationError::Unrepresentable {
            field: self.name.to_string(),
            reason: e.to_string(),
        })?;
        self.validator.validate(self.name, &rendered)?;

        tracing::trace!(field = self.name, "field value accepted");
        self.value = Some(value);
        Ok(())
    }

    /// Last successfully stored value
    pub fn get(&self) -> CoreResult<&T> {
        self.value.as_ref().ok_or(CoreError::UnsetField(self.name))
    }

    /// Whether a value has been stored
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }
}

//! Per-field JSON decoding for request bodies.

use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use serde_json::Value;
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

/// A body field decoded on its own.
///
/// A plain struct field stops serde at the first missing or mistyped key.
/// Wrapping each field in `JsonField` (with `#[serde(default)]`) lets the
/// whole body deserialize, so `Validate` can report every bad field in one
/// `VALIDATION_ERROR` response.
///
/// `null` is treated like an absent key.
///
/// ```ignore
/// #[derive(Deserialize)]
/// struct CreateBody {
///     #[serde(default)]
///     quantity: JsonField<i32>,
/// }
///
/// impl Validate for CreateBody {
///     fn validate(&self) -> Result<(), ValidationErrors> {
///         let mut errors = ValidationErrors::new();
///         self.quantity.check_required("quantity", &mut errors);
///         if errors.is_empty() { Ok(()) } else { Err(errors) }
///     }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum JsonField<T> {
    #[default]
    Missing,
    /// Present but not decodable as `T`; holds the raw value
    Invalid(Value),
    Present(T),
}

impl<T> JsonField<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            JsonField::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            JsonField::Present(value) => Some(value),
            _ => None,
        }
    }

    /// Record `required` for a missing field and `type` for a mistyped one.
    pub fn check_required(&self, field: &'static str, errors: &mut ValidationErrors) {
        match self {
            JsonField::Missing => errors.add(
                field,
                ValidationError::new("required").with_message(Cow::from("field is required")),
            ),
            JsonField::Invalid(raw) => errors.add(field, type_error(raw)),
            JsonField::Present(_) => {}
        }
    }

    /// Record `type` for a mistyped field; absence is fine.
    pub fn check_type(&self, field: &'static str, errors: &mut ValidationErrors) {
        if let JsonField::Invalid(raw) = self {
            errors.add(field, type_error(raw));
        }
    }
}

fn type_error(raw: &Value) -> ValidationError {
    let mut error =
        ValidationError::new("type").with_message(Cow::from("field has the wrong type"));
    error.add_param(Cow::from("value"), raw);
    error
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for JsonField<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        if raw.is_null() {
            return Ok(JsonField::Missing);
        }

        Ok(match T::deserialize(&raw) {
            Ok(value) => JsonField::Present(value),
            Err(_) => JsonField::Invalid(raw),
        })
    }
}

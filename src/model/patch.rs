//! A tri-state wrapper for partial update payloads.
//!
//! `serde` collapses "absent" and `null` into `None` for `Option<T>`, which makes it impossible to tell
//! "leave the stored value alone" from "clear the stored value". `Patch<T>` keeps the three cases apart,
//! fields using it need `#[serde(default)]` so that an absent key deserializes to `Patch::Missing`.

use std::borrow::Cow;

use serde::{Deserialize, Deserializer};
use validator::{ValidationError, ValidationErrors};

#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    /// The key was not present in the request body.
    Missing,
    /// The key was present with an explicit `null`.
    Null,
    /// The key was present with a value. `0`, `false` and `""` are values too.
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Missing
    }
}

impl<T> Patch<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Patch::Missing)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Applies the patch to a required (non-nullable) field.
    /// `Null` is rejected during validation so it keeps the current value here.
    pub fn apply_to(self, current: T) -> T {
        match self {
            Patch::Value(v) => v,
            Patch::Missing | Patch::Null => current,
        }
    }

    /// Applies the patch to a nullable field, where `Null` clears the stored value.
    pub fn apply_to_nullable(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Missing => current,
            Patch::Null => None,
            Patch::Value(v) => Some(v),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

// ###################################
// ->   VALIDATION HELPERS
// ###################################
// Shared by the hand-written `Validate` impls of the update payloads.

/// Builds a `max_length` violation the same way `#[validate(length(max = ..., code = "max_length"))]` does.
pub(crate) fn max_length_error(max: u64, value: &str) -> ValidationError {
    let mut err = ValidationError::new("max_length");
    err.message = Some(Cow::from(format!(
        "String should have at most {max} characters"
    )));
    err.add_param(Cow::from("max"), &max);
    err.add_param(Cow::from("value"), &value);
    err
}

pub(crate) fn check_patch_max_chars(
    errors: &mut ValidationErrors,
    field: &'static str,
    patch: &Patch<String>,
    max: u64,
) {
    if let Some(value) = patch.as_value() {
        if value.chars().count() as u64 > max {
            errors.add(field, max_length_error(max, value));
        }
    }
}

pub(crate) fn check_patch_not_null<T>(
    errors: &mut ValidationErrors,
    field: &'static str,
    patch: &Patch<T>,
) {
    if matches!(patch, Patch::Null) {
        let mut err = ValidationError::new("null_not_allowed");
        err.message = Some(Cow::from("Field can't be set to null"));
        err.add_param(Cow::from("value"), &serde_json::Value::Null);
        errors.add(field, err);
    }
}

/// The id in the body is optional, but when it is sent it has to match the id from the path.
pub(crate) fn check_id_matches(
    errors: &mut ValidationErrors,
    field: &'static str,
    body_id: Option<i32>,
    path_id: i32,
) {
    if let Some(body_id) = body_id {
        if body_id != path_id {
            let mut err = ValidationError::new("id_mismatch");
            err.message = Some(Cow::from(format!(
                "Id in the body ({body_id}) doesn't match the id in the path ({path_id})"
            )));
            err.add_param(Cow::from("value"), &body_id);
            err.add_param(Cow::from("expected"), &path_id);
            errors.add(field, err);
        }
    }
}

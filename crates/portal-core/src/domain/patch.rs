//! Tri-state field updates for partial modifications.

use serde::{Deserialize, Deserializer};

use crate::error::DomainError;

/// A single field of a partial update.
///
/// Deserializes from JSON as: missing key -> `Absent`, `null` -> `Null`,
/// any other value -> `Value`. Structs using it need `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// Apply to a nullable field: `Null` clears it.
    pub fn apply(self, target: &mut Option<T>) {
        match self {
            Patch::Absent => {}
            Patch::Null => *target = None,
            Patch::Value(v) => *target = Some(v),
        }
    }

    /// Apply to a required field: `Null` is rejected.
    pub fn apply_required(self, target: &mut T, field: &str) -> Result<(), DomainError> {
        match self {
            Patch::Absent => Ok(()),
            Patch::Null => Err(DomainError::validation(format!("{field} cannot be null"))),
            Patch::Value(v) => {
                *target = v;
                Ok(())
            }
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
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
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

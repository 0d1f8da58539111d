//! Customer record types.

use serde::{Deserialize, Deserializer, Serialize};

/// Customer identifier.
pub type CustomerId = i64;

/// A stored customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Assigned by the store, never changes
    pub id: CustomerId,
    pub name: String,
    pub role: String,
    pub email: String,
    pub phone: String,
    pub contacted: bool,
}

/// The writable part of a customer record.
///
/// Missing keys and explicit `null` values both decode to the empty
/// default. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerFields {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub contacted: bool,
}

impl CustomerFields {
    /// Fields with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns true if the name has non-whitespace content.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

impl Customer {
    /// Builds a record from an identifier and its fields.
    pub fn from_fields(id: CustomerId, fields: CustomerFields) -> Self {
        Self {
            id,
            name: fields.name,
            role: fields.role,
            email: fields.email,
            phone: fields.phone,
            contacted: fields.contacted,
        }
    }

    /// Replaces every field except the identifier.
    pub fn replace_fields(&mut self, fields: CustomerFields) {
        self.name = fields.name;
        self.role = fields.role;
        self.email = fields.email;
        self.phone = fields.phone;
        self.contacted = fields.contacted;
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

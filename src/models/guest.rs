//! Hotel guest model

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Identified, Resource, ResourceKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// Create / update guest request
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GuestInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 1, message = "Address is required"))]
    pub address: String,
}

/// Guest as populated inside a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identified for GuestSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Resource for Guest {
    type Input = GuestInput;

    const KIND: ResourceKind = ResourceKind::Guests;

    fn id(&self) -> &str {
        &self.id
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.email.to_lowercase().contains(needle)
    }

    fn summary(&self) -> String {
        format!("{} <{}> {} / {}", self.name, self.email, self.phone, self.address)
    }
}

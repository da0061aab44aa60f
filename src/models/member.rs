//! Library member model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{dates, Identified, Resource, ResourceKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, deserialize_with = "dates::flexible_option")]
    pub joined_at: Option<DateTime<Utc>>,
}

/// Create / update member request
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MemberInput {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Member as populated inside a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identified for MemberSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Resource for Member {
    type Input = MemberInput;

    const KIND: ResourceKind = ResourceKind::Members;

    fn id(&self) -> &str {
        &self.id
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.email.to_lowercase().contains(needle)
    }

    fn summary(&self) -> String {
        match &self.joined_at {
            Some(joined) => format!("{} <{}> (joined {})", self.name, self.email, dates::format_date(joined)),
            None => format!("{} <{}>", self.name, self.email),
        }
    }
}

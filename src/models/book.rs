//! Book model

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{Identified, Resource, ResourceKind};

/// Book as served by the library back end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: String,
    pub isbn: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub copies: i64,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.copies > 0
    }
}

/// Create / update book request
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    #[validate(length(min = 10, message = "ISBN must be at least 10 characters"))]
    pub isbn: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    #[validate(range(min = 0, message = "Copies must be a non-negative number"))]
    pub copies: i64,
}

/// Book as populated inside a loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
}

impl Identified for BookSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Resource for Book {
    type Input = BookInput;

    const KIND: ResourceKind = ResourceKind::Books;

    fn id(&self) -> &str {
        &self.id
    }

    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.author.to_lowercase().contains(needle)
            || self.isbn.to_lowercase().contains(needle)
    }

    fn summary(&self) -> String {
        let availability = if self.is_available() { "available" } else { "out of stock" };
        format!(
            "{} by {} (ISBN {}, {} copies, {})",
            self.title, self.author, self.isbn, self.copies, availability
        )
    }
}

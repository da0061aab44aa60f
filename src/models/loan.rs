//! Loan model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{
    book::BookSummary, dates, member::MemberSummary, LoanStatus, Reference, Resource, ResourceKind,
};

/// Placeholder shown when a reference was not populated by the back end
pub const MISSING: &str = "—";

/// Loan as served by the library back end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub member_id: Option<Reference<MemberSummary>>,
    #[serde(default)]
    pub book_id: Option<Reference<BookSummary>>,
    #[serde(deserialize_with = "dates::flexible")]
    pub loaned_at: DateTime<Utc>,
    #[serde(deserialize_with = "dates::flexible")]
    pub due_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "dates::flexible_option")]
    pub returned_at: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn status_at(&self, now: DateTime<Utc>) -> LoanStatus {
        if self.returned_at.is_some() {
            LoanStatus::Returned
        } else if self.due_at < now {
            LoanStatus::Overdue
        } else {
            LoanStatus::Active
        }
    }

    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }

    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now) == LoanStatus::Overdue
    }

    pub fn book_title(&self) -> &str {
        self.book_id
            .as_ref()
            .and_then(Reference::populated)
            .map(|book| book.title.as_str())
            .filter(|title| !title.is_empty())
            .unwrap_or(MISSING)
    }

    pub fn member_name(&self) -> &str {
        self.member_id
            .as_ref()
            .and_then(Reference::populated)
            .map(|member| member.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(MISSING)
    }

    /// Last six characters of the id, as shown on loan cards
    pub fn short_id(&self) -> &str {
        let start = self
            .id
            .char_indices()
            .rev()
            .nth(5)
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        &self.id[start..]
    }
}

/// Create / update loan request
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoanInput {
    #[validate(length(min = 1, message = "Member is required"))]
    pub member_id: String,
    #[validate(length(min = 1, message = "Book is required"))]
    pub book_id: String,
    pub loaned_at: NaiveDate,
    pub due_at: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_at: Option<NaiveDate>,
}

impl Resource for Loan {
    type Input = LoanInput;

    const KIND: ResourceKind = ResourceKind::Loans;

    fn id(&self) -> &str {
        &self.id
    }

    fn matches(&self, needle: &str) -> bool {
        self.book_title().to_lowercase().contains(needle)
            || self.member_name().to_lowercase().contains(needle)
    }

    fn status_label(&self) -> Option<String> {
        Some(self.status_at(Utc::now()).to_string())
    }

    fn summary(&self) -> String {
        let mut line = format!(
            "#{} [{}] {} -> {} (loaned {}, due {})",
            self.short_id(),
            self.status_at(Utc::now()),
            self.book_title(),
            self.member_name(),
            dates::format_date(&self.loaned_at),
            dates::format_date(&self.due_at),
        );
        if let Some(returned) = &self.returned_at {
            line.push_str(&format!(", returned {}", dates::format_date(returned)));
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_deserialize_populated_loan() {
        let loan: Loan = serde_json::from_value(json!({
            "_id": "65f0c1a2b3c4d5e6f7a8b9c0",
            "memberId": { "_id": "m1", "name": "Ada Lovelace", "email": "ada@example.org" },
            "bookId": { "_id": "b1", "title": "Dune", "author": "Frank Herbert" },
            "loanedAt": "2024-03-01T00:00:00.000Z",
            "dueAt": "2024-03-08",
            "returnedAt": null
        }))
        .unwrap();

        assert_eq!(loan.book_title(), "Dune");
        assert_eq!(loan.member_name(), "Ada Lovelace");
        assert_eq!(loan.member_id.as_ref().unwrap().id(), "m1");
        assert_eq!(loan.short_id(), "a8b9c0");
        assert!(loan.is_open());
    }

    #[test]
    fn test_deserialize_bare_ids_and_empty_return() {
        let loan: Loan = serde_json::from_value(json!({
            "_id": "l1",
            "memberId": "m1",
            "bookId": "b1",
            "loanedAt": "2024-03-01",
            "dueAt": "2024-03-08",
            "returnedAt": ""
        }))
        .unwrap();

        assert_eq!(loan.book_title(), MISSING);
        assert_eq!(loan.book_id.as_ref().unwrap().id(), "b1");
        assert!(loan.returned_at.is_none());
    }

    #[test]
    fn test_status_at() {
        let loan: Loan = serde_json::from_value(json!({
            "_id": "l1",
            "loanedAt": "2024-03-01",
            "dueAt": "2024-03-08"
        }))
        .unwrap();

        let before_due = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let after_due = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        assert_eq!(loan.status_at(before_due), LoanStatus::Active);
        assert_eq!(loan.status_at(after_due), LoanStatus::Overdue);

        let returned = Loan {
            returned_at: Some(after_due),
            ..loan
        };
        assert_eq!(returned.status_at(after_due), LoanStatus::Returned);
    }

    #[test]
    fn test_input_serializes_plain_dates() {
        let input = LoanInput {
            member_id: "m1".to_string(),
            book_id: "b1".to_string(),
            loaned_at: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            due_at: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            returned_at: None,
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["loanedAt"], "2024-03-01");
        assert_eq!(value["memberId"], "m1");
        assert!(value.get("returnedAt").is_none());
    }
}

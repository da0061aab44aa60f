//! Data models for the Frontdesk console
//!
//! Records mirror the documents served by the library and hotel back ends.
//! JSON keys are camelCase and identifiers are the back end's `_id` strings.

pub mod book;
pub mod booking;
pub mod dates;
pub mod enums;
pub mod guest;
pub mod loan;
pub mod member;
pub mod room;

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::{Validate, ValidationError};

// Re-export commonly used types
pub use book::{Book, BookInput, BookSummary};
pub use booking::{Booking, BookingInput};
pub use enums::{BookingStatus, LoanStatus, RoomStatus, RoomType};
pub use guest::{Guest, GuestInput, GuestSummary};
pub use loan::{Loan, LoanInput};
pub use member::{Member, MemberInput, MemberSummary};
pub use room::{Room, RoomInput, RoomSummary};

/// Back end serving a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Library,
    Hotel,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Library => write!(f, "library"),
            Backend::Hotel => write!(f, "hotel"),
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "library" => Ok(Backend::Library),
            "hotel" => Ok(Backend::Hotel),
            other => Err(format!("unknown back end '{}' (expected library or hotel)", other)),
        }
    }
}

/// REST resource kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Books,
    Members,
    Loans,
    Guests,
    Rooms,
    Bookings,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Books,
        ResourceKind::Members,
        ResourceKind::Loans,
        ResourceKind::Guests,
        ResourceKind::Rooms,
        ResourceKind::Bookings,
    ];

    /// Collection path relative to the back end's base URL
    pub fn path(self) -> &'static str {
        match self {
            ResourceKind::Books => "books",
            ResourceKind::Members => "members",
            ResourceKind::Loans => "loans",
            ResourceKind::Guests => "guests",
            ResourceKind::Rooms => "rooms",
            ResourceKind::Bookings => "bookings",
        }
    }

    /// Field name a loosely-shaped response may carry the collection under
    pub fn collection_field(self) -> &'static str {
        self.path()
    }

    pub fn backend(self) -> Backend {
        match self {
            ResourceKind::Books | ResourceKind::Members | ResourceKind::Loans => Backend::Library,
            ResourceKind::Guests | ResourceKind::Rooms | ResourceKind::Bookings => Backend::Hotel,
        }
    }

    /// Singular, human readable name
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Books => "book",
            ResourceKind::Members => "member",
            ResourceKind::Loans => "loan",
            ResourceKind::Guests => "guest",
            ResourceKind::Rooms => "room",
            ResourceKind::Bookings => "booking",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ResourceKind::ALL
            .into_iter()
            .find(|kind| kind.path() == wanted || kind.label() == wanted)
            .ok_or_else(|| format!("unknown resource '{}'", s))
    }
}

/// A back-end record type that can be listed, fetched, created, updated and deleted
pub trait Resource: DeserializeOwned + Serialize + Clone + fmt::Debug + Send + Sync + 'static {
    /// Typed payload sent on create and update
    type Input: Serialize + Validate + fmt::Debug + Send + Sync;

    const KIND: ResourceKind;

    fn id(&self) -> &str;

    /// Client-side search. `needle` is already lowercased and non-empty.
    fn matches(&self, needle: &str) -> bool;

    /// Status used by the client-side status filter, for resources that have one
    fn status_label(&self) -> Option<String> {
        None
    }

    /// One-line description for listings and confirmation prompts
    fn summary(&self) -> String;
}

/// Anything carrying a back-end identifier
pub trait Identified {
    fn id(&self) -> &str;
}

/// A foreign key that the back end either populated or left as a bare id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Populated(T),
    Id(String),
}

impl<T: Identified> Reference<T> {
    pub fn id(&self) -> &str {
        match self {
            Reference::Populated(inner) => inner.id(),
            Reference::Id(id) => id,
        }
    }

    pub fn populated(&self) -> Option<&T> {
        match self {
            Reference::Populated(inner) => Some(inner),
            Reference::Id(_) => None,
        }
    }
}

/// Pagination block of the success envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub pages: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// One page of a resource collection
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub items: Vec<R>,
    /// Requested page number (1-based)
    pub page: u32,
    /// Total number of pages, at least 1
    pub pages: u32,
    /// Total number of records, or the page length when the back end sent none
    pub total: u64,
}

impl<R> Page<R> {
    pub fn new(items: Vec<R>, page: u32, pagination: Option<&Pagination>) -> Self {
        let pages = pagination
            .and_then(|p| p.pages)
            .filter(|p| *p > 0)
            .unwrap_or(1);
        let total = pagination
            .and_then(|p| p.total)
            .filter(|t| *t > 0)
            .unwrap_or(items.len() as u64);
        Self {
            items,
            page,
            pages,
            total,
        }
    }
}

/// Confirmation of a delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deleted {
    pub kind: ResourceKind,
    pub id: String,
}

/// `validator` rule for monetary amounts that must be strictly positive
pub fn positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount > Decimal::ZERO {
        Ok(())
    } else {
        let mut err = ValidationError::new("positive_amount");
        err.message = Some("must be greater than zero".into());
        Err(err)
    }
}

//! Hotel booking model

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{
    dates, guest::GuestSummary, positive_amount, room::RoomSummary, BookingStatus, Guest, Reference,
    Resource, ResourceKind, Room,
};

pub const UNKNOWN_GUEST: &str = "Unknown Guest";
pub const UNKNOWN_ROOM: &str = "Unknown Room";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub guest_id: Option<Reference<GuestSummary>>,
    #[serde(default)]
    pub room_id: Option<Reference<RoomSummary>>,
    #[serde(deserialize_with = "dates::flexible")]
    pub check_in: DateTime<Utc>,
    #[serde(deserialize_with = "dates::flexible")]
    pub check_out: DateTime<Utc>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    #[serde(default)]
    pub notes: String,
}

impl Booking {
    pub fn nights(&self) -> i64 {
        (self.check_out.date_naive() - self.check_in.date_naive()).num_days()
    }

    /// Guest name, resolving a bare id against `guests` when the back end did not populate it
    pub fn guest_name<'a>(&'a self, guests: &'a [Guest]) -> &'a str {
        match &self.guest_id {
            Some(Reference::Populated(guest)) if !guest.name.is_empty() => &guest.name,
            Some(reference) => guests
                .iter()
                .find(|g| g.id == reference.id())
                .map(|g| g.name.as_str())
                .unwrap_or(UNKNOWN_GUEST),
            None => UNKNOWN_GUEST,
        }
    }

    /// Room label, resolving a bare id against `rooms` when the back end did not populate it
    pub fn room_label(&self, rooms: &[Room]) -> String {
        match &self.room_id {
            Some(Reference::Populated(room)) if !room.number.is_empty() => format!("Room {}", room.number),
            Some(reference) => rooms
                .iter()
                .find(|r| r.id == reference.id())
                .map(|r| format!("Room {}", r.number))
                .unwrap_or_else(|| UNKNOWN_ROOM.to_string()),
            None => UNKNOWN_ROOM.to_string(),
        }
    }
}

/// Create / update booking request
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingInput {
    #[validate(length(min = 1, message = "Guest is required"))]
    pub guest_id: String,
    #[validate(length(min = 1, message = "Room is required"))]
    pub room_id: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub status: BookingStatus,
    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "positive_amount"))]
    pub total_price: Decimal,
    pub notes: String,
}

impl Resource for Booking {
    type Input = BookingInput;

    const KIND: ResourceKind = ResourceKind::Bookings;

    fn id(&self) -> &str {
        &self.id
    }

    fn matches(&self, needle: &str) -> bool {
        self.status.as_str().contains(needle) || self.notes.to_lowercase().contains(needle)
    }

    fn status_label(&self) -> Option<String> {
        Some(self.status.to_string())
    }

    fn summary(&self) -> String {
        format!(
            "{} [{}] {} -> {} ({} nights, ${}) {}",
            self.room_label(&[]),
            self.status,
            dates::format_date(&self.check_in),
            dates::format_date(&self.check_out),
            self.nights(),
            self.total_price,
            self.guest_name(&[]),
        )
    }
}

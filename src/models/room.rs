//! Hotel room model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{positive_amount, Identified, Resource, ResourceKind, RoomStatus, RoomType};

/// Amenities offered in the room form
pub const AMENITIES: [&str; 6] = ["WiFi", "TV", "Mini Bar", "Jacuzzi", "Balcony", "Kitchen"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(rename = "_id")]
    pub id: String,
    pub number: String,
    #[serde(rename = "type", default)]
    pub room_type: RoomType,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub capacity: u32,
    #[serde(default)]
    pub status: RoomStatus,
    #[serde(default)]
    pub amenities: Vec<String>,
}

/// Create / update room request
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoomInput {
    #[validate(length(min = 1, message = "Room number is required"))]
    pub number: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "positive_amount"))]
    pub price: Decimal,
    #[validate(range(min = 1, message = "Valid capacity is required"))]
    pub capacity: u32,
    pub status: RoomStatus,
    pub amenities: Vec<String>,
}

/// Room as populated inside a booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub number: String,
    #[serde(rename = "type", default)]
    pub room_type: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
}

impl Identified for RoomSummary {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Resource for Room {
    type Input = RoomInput;

    const KIND: ResourceKind = ResourceKind::Rooms;

    fn id(&self) -> &str {
        &self.id
    }

    fn matches(&self, needle: &str) -> bool {
        self.number.to_lowercase().contains(needle) || self.room_type.as_str().contains(needle)
    }

    fn status_label(&self) -> Option<String> {
        Some(self.status.to_string())
    }

    fn summary(&self) -> String {
        let amenities = if self.amenities.is_empty() {
            "none".to_string()
        } else {
            self.amenities.join(", ")
        };
        format!(
            "Room {} [{}] {} - ${}/night, {} guests, amenities: {}",
            self.number, self.status, self.room_type, self.price, self.capacity, amenities
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_room_wire_format() {
        let room: Room = serde_json::from_value(json!({
            "_id": "r1",
            "number": "101",
            "type": "deluxe",
            "price": 149.5,
            "capacity": 2,
            "status": "occupied",
            "amenities": ["WiFi", "TV"]
        }))
        .unwrap();

        assert_eq!(room.room_type, RoomType::Deluxe);
        assert_eq!(room.price, Decimal::new(1495, 1));
        assert_eq!(room.status_label().as_deref(), Some("occupied"));

        let input = RoomInput {
            number: room.number.clone(),
            room_type: room.room_type,
            price: room.price,
            capacity: room.capacity,
            status: room.status,
            amenities: room.amenities.clone(),
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["type"], "deluxe");
        assert_eq!(value["price"], json!(149.5));
    }

    #[test]
    fn test_room_input_rejects_free_rooms() {
        let input = RoomInput {
            number: "12".to_string(),
            room_type: RoomType::Single,
            price: Decimal::ZERO,
            capacity: 0,
            status: RoomStatus::Available,
            amenities: vec![],
        };
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("capacity"));
    }
}

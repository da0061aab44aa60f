//! Editable form state for each resource.
//!
//! Fields hold raw text exactly as typed, like controlled inputs; parsing into
//! the typed request payload only happens after validation has passed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::{
        dates::{format_date, parse_date},
        Book, BookInput, Booking, BookingInput, BookingStatus, Guest, GuestInput, Loan, LoanInput,
        Member, MemberInput, Resource, Room, RoomInput, RoomStatus, RoomType,
    },
    validation::{self, FieldErrors},
};

/// Default loan duration
pub const LOAN_PERIOD_DAYS: i64 = 7;

/// Form backing the create / edit modal of one resource
pub trait Form: Clone + fmt::Debug + Send + Sync + 'static {
    type Record: Resource;

    /// Editable fields, by wire name
    const FIELDS: &'static [&'static str];

    /// Defaults for a new record
    fn blank(now: DateTime<Utc>) -> Self;

    /// Fields pre-filled from an existing record
    fn from_record(record: &Self::Record) -> Self;

    /// Replace one field's raw value
    fn set(&mut self, field: &str, value: &str) -> AppResult<()>;

    fn validate(&self, now: DateTime<Utc>) -> FieldErrors;

    /// Typed payload; only meaningful once `validate` returned no errors
    fn to_input(&self) -> AppResult<<Self::Record as Resource>::Input>;

    /// Server rejections that belong next to a specific field rather than in the form banner
    fn field_error_for(&self, _error: &AppError) -> Option<(&'static str, String)> {
        None
    }
}

fn unknown_field<R: Resource>(field: &str) -> AppError {
    AppError::InvalidInput(format!("unknown {} field '{}'", R::KIND.label(), field))
}

fn parse_field<T: FromStr>(field: &str, value: &str) -> AppResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| AppError::InvalidInput(format!("{}: '{}' is not valid", field, value)))
}

fn parse_enum<T: FromStr<Err = String>>(value: &str) -> AppResult<T> {
    value.parse::<T>().map_err(AppError::InvalidInput)
}

fn parse_date_field(field: &str, value: &str) -> AppResult<chrono::NaiveDate> {
    parse_date(value).ok_or_else(|| AppError::InvalidInput(format!("{}: '{}' is not a date", field, value)))
}

// ---------------------------------------------------------------------------
// Book
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookForm {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub copies: String,
}

impl Form for BookForm {
    type Record = Book;

    const FIELDS: &'static [&'static str] = &["isbn", "title", "author", "copies"];

    fn blank(_now: DateTime<Utc>) -> Self {
        Self {
            copies: "1".to_string(),
            ..Self::default()
        }
    }

    fn from_record(book: &Book) -> Self {
        Self {
            isbn: book.isbn.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            copies: book.copies.to_string(),
        }
    }

    fn set(&mut self, field: &str, value: &str) -> AppResult<()> {
        match field {
            "isbn" => self.isbn = value.to_string(),
            "title" => self.title = value.to_string(),
            "author" => self.author = value.to_string(),
            "copies" => self.copies = value.to_string(),
            other => return Err(unknown_field::<Book>(other)),
        }
        Ok(())
    }

    fn validate(&self, _now: DateTime<Utc>) -> FieldErrors {
        validation::validate_book(self)
    }

    fn to_input(&self) -> AppResult<BookInput> {
        Ok(BookInput {
            isbn: self.isbn.trim().to_string(),
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            copies: parse_field("copies", &self.copies)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberForm {
    pub name: String,
    pub email: String,
}

impl Form for MemberForm {
    type Record = Member;

    const FIELDS: &'static [&'static str] = &["name", "email"];

    fn blank(_now: DateTime<Utc>) -> Self {
        Self::default()
    }

    fn from_record(member: &Member) -> Self {
        Self {
            name: member.name.clone(),
            email: member.email.clone(),
        }
    }

    fn set(&mut self, field: &str, value: &str) -> AppResult<()> {
        match field {
            "name" => self.name = value.to_string(),
            "email" => self.email = value.to_string(),
            other => return Err(unknown_field::<Member>(other)),
        }
        Ok(())
    }

    fn validate(&self, _now: DateTime<Utc>) -> FieldErrors {
        validation::validate_member(self)
    }

    fn to_input(&self) -> AppResult<MemberInput> {
        Ok(MemberInput {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
        })
    }

    fn field_error_for(&self, error: &AppError) -> Option<(&'static str, String)> {
        match error {
            AppError::Api {
                status: 400,
                message: Some(message),
            } if message.contains("Email") => Some(("email", message.clone())),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoanForm {
    pub member_id: String,
    pub book_id: String,
    pub loaned_at: String,
    pub due_at: String,
    pub returned_at: String,
}

impl Form for LoanForm {
    type Record = Loan;

    const FIELDS: &'static [&'static str] = &["memberId", "bookId", "loanedAt", "dueAt", "returnedAt"];

    fn blank(now: DateTime<Utc>) -> Self {
        Self {
            loaned_at: format_date(&now),
            due_at: format_date(&(now + Duration::days(LOAN_PERIOD_DAYS))),
            ..Self::default()
        }
    }

    fn from_record(loan: &Loan) -> Self {
        Self {
            member_id: loan
                .member_id
                .as_ref()
                .map(|m| m.id().to_string())
                .unwrap_or_default(),
            book_id: loan
                .book_id
                .as_ref()
                .map(|b| b.id().to_string())
                .unwrap_or_default(),
            loaned_at: format_date(&loan.loaned_at),
            due_at: format_date(&loan.due_at),
            returned_at: loan.returned_at.as_ref().map(format_date).unwrap_or_default(),
        }
    }

    fn set(&mut self, field: &str, value: &str) -> AppResult<()> {
        match field {
            "memberId" => self.member_id = value.to_string(),
            "bookId" => self.book_id = value.to_string(),
            "loanedAt" => self.loaned_at = value.to_string(),
            "dueAt" => self.due_at = value.to_string(),
            "returnedAt" => self.returned_at = value.to_string(),
            other => return Err(unknown_field::<Loan>(other)),
        }
        Ok(())
    }

    fn validate(&self, now: DateTime<Utc>) -> FieldErrors {
        validation::validate_loan(self, now)
    }

    fn to_input(&self) -> AppResult<LoanInput> {
        let returned_at = if self.returned_at.trim().is_empty() {
            None
        } else {
            Some(parse_date_field("returnedAt", &self.returned_at)?)
        };
        Ok(LoanInput {
            member_id: self.member_id.trim().to_string(),
            book_id: self.book_id.trim().to_string(),
            loaned_at: parse_date_field("loanedAt", &self.loaned_at)?,
            due_at: parse_date_field("dueAt", &self.due_at)?,
            returned_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Guest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuestForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl Form for GuestForm {
    type Record = Guest;

    const FIELDS: &'static [&'static str] = &["name", "email", "phone", "address"];

    fn blank(_now: DateTime<Utc>) -> Self {
        Self::default()
    }

    fn from_record(guest: &Guest) -> Self {
        Self {
            name: guest.name.clone(),
            email: guest.email.clone(),
            phone: guest.phone.clone(),
            address: guest.address.clone(),
        }
    }

    fn set(&mut self, field: &str, value: &str) -> AppResult<()> {
        match field {
            "name" => self.name = value.to_string(),
            "email" => self.email = value.to_string(),
            "phone" => self.phone = value.to_string(),
            "address" => self.address = value.to_string(),
            other => return Err(unknown_field::<Guest>(other)),
        }
        Ok(())
    }

    fn validate(&self, _now: DateTime<Utc>) -> FieldErrors {
        validation::validate_guest(self)
    }

    fn to_input(&self) -> AppResult<GuestInput> {
        Ok(GuestInput {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomForm {
    pub number: String,
    pub room_type: RoomType,
    pub price: String,
    pub capacity: String,
    pub status: RoomStatus,
    pub amenities: Vec<String>,
}

impl RoomForm {
    /// Check or uncheck an amenity
    pub fn toggle_amenity(&mut self, amenity: &str) {
        if let Some(pos) = self.amenities.iter().position(|a| a == amenity) {
            self.amenities.remove(pos);
        } else {
            self.amenities.push(amenity.to_string());
        }
    }
}

impl Form for RoomForm {
    type Record = Room;

    const FIELDS: &'static [&'static str] = &["number", "type", "price", "capacity", "status", "amenities"];

    fn blank(_now: DateTime<Utc>) -> Self {
        Self::default()
    }

    fn from_record(room: &Room) -> Self {
        Self {
            number: room.number.clone(),
            room_type: room.room_type,
            price: room.price.to_string(),
            capacity: room.capacity.to_string(),
            status: room.status,
            amenities: room.amenities.clone(),
        }
    }

    fn set(&mut self, field: &str, value: &str) -> AppResult<()> {
        match field {
            "number" => self.number = value.to_string(),
            "type" => self.room_type = parse_enum(value)?,
            "price" => self.price = value.to_string(),
            "capacity" => self.capacity = value.to_string(),
            "status" => self.status = parse_enum(value)?,
            "amenities" => {
                self.amenities = value
                    .split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            other => return Err(unknown_field::<Room>(other)),
        }
        Ok(())
    }

    fn validate(&self, _now: DateTime<Utc>) -> FieldErrors {
        validation::validate_room(self)
    }

    fn to_input(&self) -> AppResult<RoomInput> {
        Ok(RoomInput {
            number: self.number.trim().to_string(),
            room_type: self.room_type,
            price: parse_field::<Decimal>("price", &self.price)?,
            capacity: parse_field("capacity", &self.capacity)?,
            status: self.status,
            amenities: self.amenities.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingForm {
    pub guest_id: String,
    pub room_id: String,
    pub check_in: String,
    pub check_out: String,
    pub status: BookingStatus,
    pub total_price: String,
    pub notes: String,
}

impl Form for BookingForm {
    type Record = Booking;

    const FIELDS: &'static [&'static str] =
        &["guestId", "roomId", "checkIn", "checkOut", "status", "totalPrice", "notes"];

    fn blank(_now: DateTime<Utc>) -> Self {
        Self::default()
    }

    fn from_record(booking: &Booking) -> Self {
        Self {
            guest_id: booking
                .guest_id
                .as_ref()
                .map(|g| g.id().to_string())
                .unwrap_or_default(),
            room_id: booking
                .room_id
                .as_ref()
                .map(|r| r.id().to_string())
                .unwrap_or_default(),
            check_in: format_date(&booking.check_in),
            check_out: format_date(&booking.check_out),
            status: booking.status,
            total_price: booking.total_price.to_string(),
            notes: booking.notes.clone(),
        }
    }

    fn set(&mut self, field: &str, value: &str) -> AppResult<()> {
        match field {
            "guestId" => self.guest_id = value.to_string(),
            "roomId" => self.room_id = value.to_string(),
            "checkIn" => self.check_in = value.to_string(),
            "checkOut" => self.check_out = value.to_string(),
            "status" => self.status = parse_enum(value)?,
            "totalPrice" => self.total_price = value.to_string(),
            "notes" => self.notes = value.to_string(),
            other => return Err(unknown_field::<Booking>(other)),
        }
        Ok(())
    }

    fn validate(&self, _now: DateTime<Utc>) -> FieldErrors {
        validation::validate_booking(self)
    }

    fn to_input(&self) -> AppResult<BookingInput> {
        Ok(BookingInput {
            guest_id: self.guest_id.trim().to_string(),
            room_id: self.room_id.trim().to_string(),
            check_in: parse_date_field("checkIn", &self.check_in)?,
            check_out: parse_date_field("checkOut", &self.check_out)?,
            status: self.status,
            total_price: parse_field("totalPrice", &self.total_price)?,
            notes: self.notes.trim().to_string(),
        })
    }
}

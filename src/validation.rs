//! Client-side form validation.
//!
//! Every `validate_*` function is pure: it reads the form's current field values
//! (and the caller's notion of "now" where a rule depends on time) and returns the
//! invalid fields mapped to the message to show next to them. A form may be
//! submitted only when the map is empty.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::forms::{BookForm, BookingForm, GuestForm, LoanForm, MemberForm, RoomForm};
use crate::models::dates::parse_date;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Field name to error message, in the order the fields were checked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(IndexMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; the first message for a field wins
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Record an error, replacing any earlier message for the field
    pub fn set(&mut self, field: &str, message: impl Into<String>) {
        self.0.insert(field.to_string(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.shift_remove(field)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// A form is valid iff it has no field errors
pub fn is_form_valid(errors: &FieldErrors) -> bool {
    errors.is_empty()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Check a required date field; returns the parsed value when present and well-formed
fn required_date(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    label: &str,
) -> Option<NaiveDate> {
    if is_blank(value) {
        errors.add(field, format!("{} is required", label));
        return None;
    }
    // Payloads carry calendar dates only, so rules compare at that granularity
    let parsed = parse_date(value);
    if parsed.is_none() {
        errors.add(field, format!("{} is not a valid date", label));
    }
    parsed
}

pub fn validate_book(book: &BookForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if is_blank(&book.isbn) {
        errors.add("isbn", "ISBN is required");
    } else if book.isbn.chars().count() < 10 {
        errors.add("isbn", "ISBN must be at least 10 characters");
    }

    if is_blank(&book.title) {
        errors.add("title", "Title is required");
    }

    if is_blank(&book.author) {
        errors.add("author", "Author is required");
    }

    if is_blank(&book.copies) {
        errors.add("copies", "Number of copies is required");
    } else {
        match book.copies.trim().parse::<i64>() {
            Ok(copies) if copies >= 0 => {}
            _ => errors.add("copies", "Copies must be a non-negative number"),
        }
    }

    errors
}

pub fn validate_member(member: &MemberForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if is_blank(&member.name) {
        errors.add("name", "Name is required");
    } else if member.name.chars().count() < 2 {
        errors.add("name", "Name must be at least 2 characters");
    }

    if is_blank(&member.email) {
        errors.add("email", "Email is required");
    } else if !is_valid_email(&member.email) {
        errors.add("email", "Invalid email address");
    }

    errors
}

pub fn validate_loan(loan: &LoanForm, now: DateTime<Utc>) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if is_blank(&loan.member_id) {
        errors.add("memberId", "Member is required");
    }

    if is_blank(&loan.book_id) {
        errors.add("bookId", "Book is required");
    }

    let loaned_at = required_date(&mut errors, "loanedAt", &loan.loaned_at, "Loan date");
    if matches!(loaned_at, Some(loaned) if loaned > now.date_naive()) {
        errors.add("loanedAt", "Loan date cannot be in the future");
    }

    let due_at = required_date(&mut errors, "dueAt", &loan.due_at, "Due date");
    if let (Some(loaned), Some(due)) = (loaned_at, due_at) {
        if due <= loaned {
            errors.add("dueAt", "Due date must be after loan date");
        }
    }

    if !is_blank(&loan.returned_at) {
        match parse_date(&loan.returned_at) {
            None => errors.add("returnedAt", "Return date is not a valid date"),
            Some(returned) if matches!(loaned_at, Some(loaned) if returned < loaned) => {
                errors.add("returnedAt", "Return date cannot be before loan date")
            }
            Some(_) => {}
        }
    }

    errors
}

pub fn validate_guest(guest: &GuestForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if is_blank(&guest.name) {
        errors.add("name", "Name is required");
    }

    if !is_valid_email(&guest.email) {
        errors.add("email", "Valid email is required");
    }

    if is_blank(&guest.phone) {
        errors.add("phone", "Phone is required");
    }

    if is_blank(&guest.address) {
        errors.add("address", "Address is required");
    }

    errors
}

pub fn validate_room(room: &RoomForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if is_blank(&room.number) {
        errors.add("number", "Room number is required");
    }

    match Decimal::from_str(room.price.trim()) {
        Ok(price) if price > Decimal::ZERO => {}
        _ => errors.add("price", "Valid price is required"),
    }

    match room.capacity.trim().parse::<u32>() {
        Ok(capacity) if capacity > 0 => {}
        _ => errors.add("capacity", "Valid capacity is required"),
    }

    errors
}

pub fn validate_booking(booking: &BookingForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if is_blank(&booking.guest_id) {
        errors.add("guestId", "Guest is required");
    }

    if is_blank(&booking.room_id) {
        errors.add("roomId", "Room is required");
    }

    let check_in = required_date(&mut errors, "checkIn", &booking.check_in, "Check-in date");
    let check_out = required_date(&mut errors, "checkOut", &booking.check_out, "Check-out date");
    if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
        if check_in >= check_out {
            errors.add("checkOut", "Check-out date must be after check-in date");
        }
    }

    match Decimal::from_str(booking.total_price.trim()) {
        Ok(total) if total > Decimal::ZERO => {}
        _ => errors.add("totalPrice", "Valid total price is required"),
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_validate_book_reports_each_bad_field() {
        let form = BookForm {
            isbn: "123456789".to_string(),
            title: String::new(),
            author: "A".to_string(),
            copies: "-1".to_string(),
        };
        let errors = validate_book(&form);

        assert_eq!(errors.get("isbn"), Some("ISBN must be at least 10 characters"));
        assert_eq!(errors.get("title"), Some("Title is required"));
        assert_eq!(errors.get("copies"), Some("Copies must be a non-negative number"));
        assert!(!errors.contains("author"));
        assert!(!is_form_valid(&errors));
    }

    #[test]
    fn test_validate_book_accepts_valid_form() {
        let form = BookForm {
            isbn: "978-0140449136".to_string(),
            title: "The Odyssey".to_string(),
            author: "Homer".to_string(),
            copies: "0".to_string(),
        };
        assert!(is_form_valid(&validate_book(&form)));
    }

    #[test]
    fn test_validate_book_whitespace_is_blank() {
        let form = BookForm {
            isbn: "   ".to_string(),
            title: "  ".to_string(),
            author: "\t".to_string(),
            copies: "".to_string(),
        };
        let errors = validate_book(&form);
        assert_eq!(errors.get("isbn"), Some("ISBN is required"));
        assert_eq!(errors.get("copies"), Some("Number of copies is required"));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_validate_member() {
        let errors = validate_member(&MemberForm {
            name: "A".to_string(),
            email: "not-an-email".to_string(),
        });
        assert_eq!(errors.get("name"), Some("Name must be at least 2 characters"));
        assert_eq!(errors.get("email"), Some("Invalid email address"));

        let errors = validate_member(&MemberForm {
            name: "Ada".to_string(),
            email: "ada@example.org".to_string(),
        });
        assert!(errors.is_empty());
    }

    fn loan(loaned_at: &str, due_at: &str) -> LoanForm {
        LoanForm {
            member_id: "m1".to_string(),
            book_id: "b1".to_string(),
            loaned_at: loaned_at.to_string(),
            due_at: due_at.to_string(),
            returned_at: String::new(),
        }
    }

    #[test]
    fn test_validate_loan_due_must_follow_loan_date() {
        let errors = validate_loan(&loan("2024-06-10", "2024-06-10"), now());
        assert_eq!(errors.get("dueAt"), Some("Due date must be after loan date"));

        let errors = validate_loan(&loan("2024-06-10", "2024-06-01"), now());
        assert_eq!(errors.get("dueAt"), Some("Due date must be after loan date"));

        let errors = validate_loan(&loan("2024-06-10", "2024-06-17"), now());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_loan_same_day_timestamps_are_not_a_loan_period() {
        let errors = validate_loan(&loan("2024-06-10T08:00:00Z", "2024-06-10T18:00:00Z"), now());
        assert_eq!(errors.get("dueAt"), Some("Due date must be after loan date"));

        let errors = validate_loan(&loan("2024-06-10T23:00:00Z", "2024-06-11T01:00:00Z"), now());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_loan_rejects_future_loan_date() {
        let errors = validate_loan(&loan("2024-06-16", "2024-06-23"), now());
        assert_eq!(errors.get("loanedAt"), Some("Loan date cannot be in the future"));
        assert!(!errors.contains("dueAt"));

        // Today's date is not in the future, whatever the time of day
        let errors = validate_loan(&loan("2024-06-15", "2024-06-22"), now());
        assert!(errors.is_empty());
        let errors = validate_loan(&loan("2024-06-15T20:00:00Z", "2024-06-22"), now());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_validate_loan_required_fields() {
        let errors = validate_loan(&LoanForm::default(), now());
        assert_eq!(errors.get("memberId"), Some("Member is required"));
        assert_eq!(errors.get("bookId"), Some("Book is required"));
        assert_eq!(errors.get("loanedAt"), Some("Loan date is required"));
        assert_eq!(errors.get("dueAt"), Some("Due date is required"));
    }

    #[test]
    fn test_validate_loan_return_date() {
        let mut form = loan("2024-06-10", "2024-06-17");
        form.returned_at = "2024-06-09".to_string();
        let errors = validate_loan(&form, now());
        assert_eq!(errors.get("returnedAt"), Some("Return date cannot be before loan date"));

        // Returned later on the loan day
        let mut form = loan("2024-06-10T15:00:00Z", "2024-06-17");
        form.returned_at = "2024-06-10T09:00:00Z".to_string();
        assert!(validate_loan(&form, now()).is_empty());
    }

    #[test]
    fn test_validate_guest() {
        let errors = validate_guest(&GuestForm {
            name: "Grace".to_string(),
            email: "grace@".to_string(),
            phone: String::new(),
            address: "1 Navy Way".to_string(),
        });
        assert_eq!(errors.get("email"), Some("Valid email is required"));
        assert_eq!(errors.get("phone"), Some("Phone is required"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_validate_guest_blank_email_uses_guest_message() {
        let errors = validate_guest(&GuestForm {
            name: "Grace".to_string(),
            email: "  ".to_string(),
            phone: "555-0100".to_string(),
            address: "1 Navy Way".to_string(),
        });
        assert_eq!(errors.get("email"), Some("Valid email is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_validate_room() {
        let form = RoomForm {
            number: "101".to_string(),
            price: "0".to_string(),
            capacity: "abc".to_string(),
            ..RoomForm::default()
        };
        let errors = validate_room(&form);
        assert_eq!(errors.get("price"), Some("Valid price is required"));
        assert_eq!(errors.get("capacity"), Some("Valid capacity is required"));
        assert!(!errors.contains("number"));
    }

    #[test]
    fn test_validate_booking_checkout_after_checkin() {
        let form = BookingForm {
            guest_id: "g1".to_string(),
            room_id: "r1".to_string(),
            check_in: "2024-07-03".to_string(),
            check_out: "2024-07-03".to_string(),
            total_price: "250.00".to_string(),
            ..BookingForm::default()
        };
        let errors = validate_booking(&form);
        assert_eq!(
            errors.get("checkOut"),
            Some("Check-out date must be after check-in date")
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_validate_booking_same_day_timestamps_are_rejected() {
        let form = BookingForm {
            guest_id: "g1".to_string(),
            room_id: "r1".to_string(),
            check_in: "2024-07-01T10:00:00Z".to_string(),
            check_out: "2024-07-01T20:00:00Z".to_string(),
            total_price: "120".to_string(),
            ..BookingForm::default()
        };
        let errors = validate_booking(&form);
        assert_eq!(
            errors.get("checkOut"),
            Some("Check-out date must be after check-in date")
        );
    }

    #[test]
    fn test_field_errors_keep_first_message() {
        let mut errors = FieldErrors::new();
        errors.add("email", "Email is required");
        errors.add("email", "Invalid email address");
        assert_eq!(errors.get("email"), Some("Email is required"));
        errors.set("email", "Email already registered");
        assert_eq!(errors.get("email"), Some("Email already registered"));
        assert_eq!(errors.to_string(), "email: Email already registered");
    }
}

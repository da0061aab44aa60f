//! Dashboard statistics.
//!
//! Each figure comes from its own request. The requests run concurrently and a
//! failed one only zeroes the figures it feeds; the rest are still reported.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    client::Transport,
    error::AppResult,
    lookups::LOOKUP_LIMIT,
    models::{Backend, Book, Booking, Guest, Loan, Member, Page, Resource, Room, RoomStatus},
    services::{health::HealthStatus, Services},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryDashboard {
    pub total_books: u64,
    pub total_members: u64,
    pub active_loans: u64,
    pub overdue_loans: u64,
    pub health: HealthStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelOverview {
    pub total_guests: u64,
    pub total_rooms: u64,
    pub available_rooms: u64,
    pub active_bookings: u64,
    pub health: HealthStatus,
}

/// Log a failed dashboard fetch and carry on without it
fn masked<R: Resource>(result: AppResult<Page<R>>) -> Option<Page<R>> {
    match result {
        Ok(page) => Some(page),
        Err(e) => {
            tracing::warn!(resource = %R::KIND, error = %e, "Dashboard fetch failed, reporting zero");
            None
        }
    }
}

fn count<T>(items: &[T], predicate: impl Fn(&T) -> bool) -> u64 {
    items.iter().filter(|item| predicate(item)).count() as u64
}

impl LibraryDashboard {
    pub async fn fetch<T: Transport>(services: &Services<T>, now: DateTime<Utc>) -> Self {
        let books = services.resource::<Book>();
        let members = services.resource::<Member>();
        let loans = services.resource::<Loan>();

        // Counts only need the pagination block
        let (books, members, loans, health) = tokio::join!(
            books.list(1, 1),
            members.list(1, 1),
            loans.list(1, LOOKUP_LIMIT),
            services.health(Backend::Library),
        );

        let loans = masked(loans).map(|page| page.items).unwrap_or_default();
        Self {
            total_books: masked(books).map_or(0, |page| page.total),
            total_members: masked(members).map_or(0, |page| page.total),
            active_loans: count(&loans, Loan::is_open),
            overdue_loans: count(&loans, |loan| loan.is_overdue_at(now)),
            health,
        }
    }
}

impl HotelOverview {
    pub async fn fetch<T: Transport>(services: &Services<T>) -> Self {
        let guests = services.resource::<Guest>();
        let rooms = services.resource::<Room>();
        let bookings = services.resource::<Booking>();

        let (guests, rooms, bookings, health) = tokio::join!(
            guests.list(1, LOOKUP_LIMIT),
            rooms.list(1, LOOKUP_LIMIT),
            bookings.list(1, LOOKUP_LIMIT),
            services.health(Backend::Hotel),
        );

        let rooms = masked(rooms);
        let bookings = masked(bookings).map(|page| page.items).unwrap_or_default();
        Self {
            total_guests: masked(guests).map_or(0, |page| page.total),
            total_rooms: rooms.as_ref().map_or(0, |page| page.total),
            available_rooms: rooms.as_ref().map_or(0, |page| {
                count(&page.items, |room| room.status == RoomStatus::Available)
            }),
            active_bookings: count(&bookings, |booking| booking.status.is_active()),
            health,
        }
    }
}

//! Choice lists for the loan and booking forms

use crate::{
    client::Transport,
    error::AppResult,
    models::{Book, Guest, Member, Page, Resource, Room},
    services::Services,
};

/// Page size used to fetch "everything" for choices and statistics
pub const LOOKUP_LIMIT: u32 = 1000;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoanChoices {
    /// Books with at least one copy on the shelf
    pub books: Vec<Book>,
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingChoices {
    pub guests: Vec<Guest>,
    pub rooms: Vec<Room>,
}

fn items_or_empty<R: Resource>(result: AppResult<Page<R>>) -> Vec<R> {
    match result {
        Ok(page) => page.items,
        Err(e) => {
            tracing::warn!(resource = %R::KIND, error = %e, "Could not load choices");
            Vec::new()
        }
    }
}

impl LoanChoices {
    pub async fn fetch<T: Transport>(services: &Services<T>) -> Self {
        let books = services.resource::<Book>();
        let members = services.resource::<Member>();
        let (books, members) = tokio::join!(books.list(1, LOOKUP_LIMIT), members.list(1, LOOKUP_LIMIT));

        Self {
            books: items_or_empty(books).into_iter().filter(Book::is_available).collect(),
            members: items_or_empty(members),
        }
    }
}

impl BookingChoices {
    pub async fn fetch<T: Transport>(services: &Services<T>) -> Self {
        let guests = services.resource::<Guest>();
        let rooms = services.resource::<Room>();
        let (guests, rooms) = tokio::join!(guests.list(1, LOOKUP_LIMIT), rooms.list(1, LOOKUP_LIMIT));

        Self {
            guests: items_or_empty(guests),
            rooms: items_or_empty(rooms),
        }
    }
}

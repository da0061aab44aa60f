//! Frontdesk console
//!
//! A client for two REST back ends: a library service (books, members, loans) and
//! a hotel service (guests, rooms, bookings). It provides typed resource services,
//! client-side validation, and the view models behind the console screens: paged
//! lists, create / edit forms, the app shell and the dashboards.

pub mod cli;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod forms;
pub mod lookups;
pub mod models;
pub mod normalize;
pub mod refresh;
pub mod services;
pub mod shell;
pub mod validation;
pub mod views;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

//! View models for the console screens

pub mod form;
pub mod list;

pub use form::{FormView, SubmitOutcome};
pub use list::{ListView, ViewState};

//! Google Sheets access for the form relay.
//!
//! [`SheetsClient`] reads and clears ranges on one spreadsheet, authenticating
//! through any [`TokenSource`]. [`ServiceAccountAuth`] is the production
//! token source; [`StaticToken`] is handy for tests and local proxies.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod client;
pub mod error;
pub mod models;

pub use auth::{ServiceAccountAuth, ServiceAccountKey, StaticToken, TokenSource};
pub use client::{quote_sheet_title, sheet_range, SheetsClient};
pub use error::SheetsError;

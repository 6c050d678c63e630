//! Form relay: forwards new Google Forms responses into Discord.
//!
//! The relay polls the first tab of a form's response spreadsheet on a fixed
//! interval. Every row whose unique key has not been seen yet is posted to a
//! primary channel as an embed; when the row carries a numeric Discord user
//! id, a templated pre-approval mention goes to a second channel. After a
//! pass that handled at least one row, the sheet's data rows are cleared.
//!
//! # Architecture
//!
//! - [`sheet::SheetApi`] abstracts the spreadsheet, with [`sheet::DisabledSheet`]
//!   standing in when credentials could not be set up
//! - [`fetcher::ResponseFetcher`] turns rows into [`FormResponse`]s
//! - [`notifier::Notifier`] formats and sends the messages
//! - [`clearer::SheetClearer`] wipes processed rows
//! - [`poller::FormRelay`] drives the cycle and owns the [`ProcessedKeySet`]

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod clearer;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod notifier;
pub mod poller;
pub mod response;
pub mod sheet;
pub mod store;

pub use config::{RelayArgs, RelaySettings};
pub use error::{CycleError, FetchError};
pub use poller::{CycleReport, FormRelay};
pub use response::FormResponse;
pub use sheet::{DisabledSheet, SheetApi};
pub use store::{InMemoryKeySet, ProcessedKeySet};

// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! SQLite database interface for maintenance procedure records.
//!
//! This crate owns the relational schema (workshops, users, components,
//! steps) and every query the rest of the system runs against it:
//! credential checks, component resolution, step logging, the role-filtered
//! report listing and the derivation of logical reports.
//!
//! A logical report has no table of its own. It is the set of step rows
//! sharing a `(component_id, action_type)` pair, ordered by step number,
//! and is reconstructed on demand from the id of any of its member steps.
//!
//! # Example
//!
//! ```ignore
//! use tekhne_store_db::{OpenMode, ReportDb};
//!
//! let db = ReportDb::open("tekhne.db", OpenMode::Create)?;
//! let session = db.authenticate("tech", &password_hash)?;
//! for summary in db.list_reports(&session)? {
//!     println!("{} {}", summary.inventory_code, summary.action_type);
//! }
//! ```

mod connection;
mod error;
mod query;
mod schema;
mod types;
mod write;

pub use connection::{OpenMode, ReportDb};
pub use error::{Error, Result};
pub use schema::SCHEMA_VERSION;
pub use types::*;
pub use write::*;

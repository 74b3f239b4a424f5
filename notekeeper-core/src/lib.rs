//! Core library for Notekeeper.
//!
//! This crate provides the note models, search ranking and the SQLite-backed
//! note store, independent of any transport layer.
//!
//! # Usage
//!
//! ```no_run
//! use notekeeper_core::db::Database;
//! use notekeeper_core::models::*;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let note = db.create_note(CreateNoteInput {
//!     title: "Groceries".into(),
//!     content: Some("eggs, milk".into()),
//! })?;
//! let page = db.list_notes(&ListNotesQuery::default())?;
//! assert_eq!(page.data[0].id, note.note.id);
//! # Ok::<(), notekeeper_core::Error>(())
//! ```

pub mod clock;
pub mod db;
pub mod error;
pub mod models;
pub mod search;
pub mod text;

// Re-export commonly used types at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use db::Database;
pub use error::{Error, Result};

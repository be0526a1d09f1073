//! ankr storage crate - SQLite persistence for action calls.
//!
//! Provides a WAL-mode SQLite database with migrations, the
//! [`ActionCallStore`] seam used by the lifecycle controller, its SQLite
//! repository, and the site-content tables written by executors.

pub mod db;
pub mod migrations;
pub mod repository;
pub mod site;

pub use db::Database;
pub use repository::{ActionCallRepository, ActionCallStore};
pub use site::{ChangeRequestRow, NoteRow, SiteRepository, TopicRow};

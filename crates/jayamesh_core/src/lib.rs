//! Core domain logic for Jayamesh, a local-first project planner.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod markup;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod state;
pub mod transfer;

pub use config::CoreConfig;
pub use db::{open_db, open_db_in_memory, open_db_with_outcome, DbError, MigrationOutcome};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use markup::{format_note, render_text, Inline, NoteBlock};
pub use model::focus::{FocusMode, FocusSession, FocusTimer};
pub use model::goal::{Goal, GoalId, GoalStatus};
pub use model::note::{Note, NoteId};
pub use model::project::{Project, ProjectId, ProjectStatus};
pub use model::section::{Section, SectionId};
pub use model::task::{Task, TaskId, TaskStatus};
pub use model::ValidationError;
pub use repo::{ListScope, RepoError, RepoResult};
pub use seed::seed_if_empty;
pub use state::{AppAction, AppState, Modal, ViewMode};
pub use transfer::{ExportDocument, StoreInfo, TransferError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

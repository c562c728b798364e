//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Apply creation defaults and derived fields before persistence.
//! - Keep the CLI decoupled from storage details.

pub mod focus_service;
pub mod goal_service;
pub mod note_service;
pub mod project_service;
pub mod section_service;
pub mod stats_service;
pub mod task_service;

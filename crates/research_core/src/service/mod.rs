//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate collection repositories into use-case level APIs.
//! - Enforce actor permissions, maintenance mode and form rules.
//! - Keep the CLI decoupled from storage details.

pub mod backup_service;
pub mod config_service;
pub mod project_service;
pub mod publication_service;
pub mod report_service;
pub mod user_service;
pub mod validation_service;
pub mod work;

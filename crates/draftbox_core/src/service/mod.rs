//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep presentation/routing callers decoupled from storage details.

pub mod comment_service;
pub mod draft_service;
pub mod repository_service;

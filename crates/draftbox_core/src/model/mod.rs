//! Domain model for repositories, introduction drafts and comments.
//!
//! # Responsibility
//! - Define the three-entity tree: Repository -> Introduction -> Comment.
//! - Own field validation and the draft carry-forward rule.
//!
//! # Invariants
//! - Every child references exactly one parent; there are no cross-links.
//! - Identifiers are store-assigned integers and never reused.

pub mod comment;
pub mod introduction;
pub mod repository;
pub mod validation;

//! Core types shared across progmerge facilities
//!
//! This crate provides foundational types used by both the error facility
//! and the logging facility:
//!
//! - **Correlation**: `RequestId`
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::RequestId;

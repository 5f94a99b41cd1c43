//! Unit tests for console components
//!
//! These tests drive single components directly, without going through a
//! controller or the Management API.
//!
//! ## Organization
//!
//! - [`codec_properties`] - Properties of scope encoding and decoding
//! - [`scope_documents`] - Worked examples and decode edge cases
//! - [`select`] - Searchable select filtering and events

pub mod codec_properties;
pub mod select;

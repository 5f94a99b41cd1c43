//! Integration tests for the console controllers
//!
//! These tests drive whole screens against the in-memory Management API,
//! checking the requests made, the resulting lists and the notifications a
//! user would see.
//!
//! ## Organization
//!
//! - [`groups`] - Group creation, scope imports, scope edits and deletes
//! - [`users`] - Human users and group membership edits
//! - [`m2m`] - Service accounts and one-time credentials
//! - [`config`] - Registry configuration fetching and caching
//! - [`concurrency`] - Racing submissions and shared API handles

pub mod concurrency;
pub mod config;
pub mod m2m;
pub mod users;

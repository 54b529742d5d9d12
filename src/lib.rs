//! Treetop - Terminal tree viewer for hierarchical issue trackers
//!
//! This library crate exposes internal modules for integration testing.

pub mod config;
pub mod data;
pub mod engine;
pub mod store;
pub mod tui;

//! Department hierarchy engine.
//!
//! Builds a forest from flat department records, reparents subtrees without
//! ever creating a cycle, and projects the forest into filtered, flattened
//! and aggregated views.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

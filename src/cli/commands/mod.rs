//! Command implementations

pub mod auth;
pub mod case;
pub mod code;
pub mod completions;
pub mod prosecutor;
pub mod report;
pub mod summary;

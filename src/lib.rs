//! Casebook: criminal case and crime report tracking
//!
//! Cases and reports move through workflow stages while the deadline rules
//! flag investigations and detentions about to expire and reports left
//! pending too long. Collections are kept per signed-in user in SQLite with a
//! JSON-file fallback.

pub mod auth;
pub mod cli;
pub mod core;
pub mod entities;
pub mod export;
pub mod reference;
pub mod storage;
pub mod store;

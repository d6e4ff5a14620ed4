//! Core module - fundamental types and utilities

pub mod config;
pub mod context;
pub mod dates;
pub mod deadline;
pub mod entity;
pub mod identity;
pub mod workflow;

pub use config::{Config, ConfigError};
pub use context::AppContext;
pub use dates::{Clock, DateParseError, DisplayDate, FixedClock, SystemClock};
pub use deadline::DeadlineWarning;
pub use entity::Record;
pub use identity::{EntityId, EntityPrefix, IdParseError};
pub use workflow::{check_transition, Stage, TransitionError};

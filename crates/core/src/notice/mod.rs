//! Customer notices: warnings, payment reminders, and informational messages.
//!
//! # Modules
//!
//! - `types` - Notice kinds, read state, reminder wording

pub mod types;

pub use types::{NoticeKind, NoticeState, reminder_text};

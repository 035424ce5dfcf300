//! Domain types for the discussion engine.
//!
//! The [`Discussion`] aggregate is the single source of truth for membership
//! and message content; [`DiscussionPreview`] entries on [`Account`] records
//! are a derived projection maintained by the fan-out path.

pub mod account;
pub mod discussion;
pub mod message;
pub mod preview;

pub use account::Account;
pub use discussion::Discussion;
pub use message::Message;
pub use preview::DiscussionPreview;

/// Stable account identifier.
pub type AccountId = uuid::Uuid;

/// Stable discussion identifier.
pub type DiscussionId = uuid::Uuid;

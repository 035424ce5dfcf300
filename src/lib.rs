//! Agora - threaded group discussions with role-based membership.
//!
//! # Overview
//!
//! This library implements a discussion/membership engine:
//!
//! - **`domain`** - The discussion aggregate (membership, roles, append-only
//!   message log), account records, and per-member discussion previews
//! - **`engine`** - Permission-checked mutation operations and the
//!   transactional message/preview fan-out
//! - **`realtime`** - Live snapshot feeds for discussions and preview maps
//! - **`store`** - The abstract document gateway the engine mutates through,
//!   plus an in-memory adapter
//! - **`error`** / **`config`** - Error kinds and engine configuration
//!
//! # Roles
//!
//! Every discussion has three membership tiers: participants may read and
//! send, admins additionally mutate membership and metadata, and the creator
//! is permanently an admin and can never be removed or demoted.
//!
//! # Consistency
//!
//! The aggregate is the source of truth; previews are a derived projection.
//! One `send_message` call appends to the log and rewrites every member's
//! preview in a single conflict-checked commit, recomputed from fresh state
//! whenever a concurrent writer wins the race.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use agora::store::DocumentGateway;
//! use agora::{Account, DiscussionService, MemoryGateway};
//!
//! # async fn demo() -> Result<(), agora::ServiceError> {
//! let gateway = Arc::new(MemoryGateway::new());
//! let alice = Account::new("Alice", "alice", "alice@example.com");
//! gateway.upsert_account(alice.clone()).await?;
//!
//! let service = DiscussionService::new(gateway);
//! let discussion = service.create_discussion("", "weekly sync", alice.id).await?;
//! service.send_message(discussion.id, alice.id, "hello").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The service is `Clone` and shares its gateway through an `Arc`; all
//! operations are async and safe to invoke concurrently.

/// Engine configuration
pub mod config;

/// Domain types: discussions, accounts, messages, previews
pub mod domain;

/// Permission-checked operations and fan-out
pub mod engine;

/// Error types
pub mod error;

/// Live subscription feeds
pub mod realtime;

/// Persistence gateway contract and in-memory adapter
pub mod store;

pub use config::EngineConfig;
pub use domain::{Account, AccountId, Discussion, DiscussionId, DiscussionPreview, Message};
pub use engine::DiscussionService;
pub use error::ServiceError;
pub use realtime::{DiscussionFeed, PreviewsFeed};
pub use store::{DocumentGateway, MemoryGateway};

//! Live subscription layer.
//!
//! Converts the gateway's change feeds into per-discussion and per-account
//! snapshot streams for observers. Feeds are independent: attaching,
//! lagging, or dropping one consumer never affects another, and dropping a
//! stream releases its gateway-side subscription.

mod watch;

pub use watch::{DiscussionFeed, PreviewsFeed};

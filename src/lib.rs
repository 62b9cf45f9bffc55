//! soapbox — quorum-gated social publishing bot.
//!
//! A user proposes a post in chat, confirms it via an interactive prompt,
//! teammates vote with reactions, and at quorum the post goes out to the
//! social platform.

pub mod adapters;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod publish;
pub mod server;
pub mod store;

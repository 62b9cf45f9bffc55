//! Adapter boundaries for the chat and social platforms.
//!
//! The core only sees the `ChatAdapter` and `SocialAdapter` traits — pure
//! I/O, no business logic. Concrete clients live alongside them.

pub mod chat;
pub mod slack;
pub mod social;
pub mod x;

pub use chat::{
    ActionButton, ActionEvent, ChatAdapter, MessageEvent, ReactionEvent, ACTION_CONFIRM,
    ACTION_DECLINE,
};
pub use slack::SlackChat;
pub use social::SocialAdapter;
pub use x::XSocial;

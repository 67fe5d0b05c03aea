//! # kbchat-rs
//!
//! A chat-style front end over a static knowledgebase: queries run through an
//! ordered classification chain and are answered with canned replies, a
//! keyword-ranked CSV table, or an external text-generation service.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kbchat_rs::{ChatSession, Config, KbTable};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load the knowledgebase once; it is shared and read-only afterwards.
//!     let table = Arc::new(KbTable::load("knowledgebase.csv")?);
//!
//!     let mut session = ChatSession::new(table, &Config::default())?;
//!
//!     let reply = session.respond("I am having a flashing error").await;
//!     println!("{}", reply);
//!
//!     Ok(())
//! }
//! ```

// Core modules
pub mod chat;
pub mod config;
pub mod error;
pub mod generation;
pub mod kb;
pub mod router;
pub mod text;

// Re-export main API types
pub use chat::{ChatSession, Role, Turn, run_chat_loop};
pub use config::Config;
pub use error::{KbChatError, Result};
pub use generation::{GenerationClient, GenerationError};
pub use kb::{KbRecord, KbSearch, KbStats, KbTable, NO_MATCH_REPLY, RankedMatch};
pub use router::{Decision, ResponseRouter, classify};
pub use text::Normalizer;

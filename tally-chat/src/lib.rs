#![deny(missing_docs)]
//! Streaming chat client for the Tally assistant backend.
//!
//! One HTTP POST per turn, answered with a chunked body of concatenated
//! JSON texts. This crate recovers each complete JSON text as bytes
//! arrive and hands it to the consumer unparsed, either as a
//! [`tally_types::ChatStream`] of events or through a
//! [`tally_types::ChatObserver`] with per-message callbacks and
//! cooperative cancellation via [`ChatHandle`].
//!
//! # Example
//!
//! ```no_run
//! use tally_chat::ChatClient;
//! use tally_types::{ChatError, ChatObserver, ChatRequest};
//!
//! struct Printer;
//!
//! impl ChatObserver for Printer {
//!     fn on_message(&mut self, raw_json: &str) {
//!         println!("frame: {raw_json}");
//!     }
//!
//!     fn on_error(&mut self, error: ChatError) {
//!         eprintln!("failed: {error}");
//!     }
//!
//!     fn on_complete(&mut self) {
//!         println!("done");
//!     }
//! }
//!
//! # async fn run() {
//! let client = ChatClient::new("api-token")
//!     .base_url("https://tally.example.com");
//! let handle = client.start(ChatRequest::new("categorize this invoice"), Printer);
//! // ... later, to abandon the turn:
//! handle.close();
//! # }
//! ```

mod client;
mod decoder;
mod error;
mod session;
mod streaming;

pub use client::ChatClient;
pub use session::ChatHandle;

// Re-export the shared types for convenience.
pub use tally_types::{ChatError, ChatEvent, ChatObserver, ChatRequest, ChatStream, DocumentRefs};

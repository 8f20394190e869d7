#![deny(missing_docs)]
//! Shared types for the Tally assistant chat client.
//!
//! The chat backend speaks a streaming protocol: one HTTP POST per turn,
//! answered with a chunked body of concatenated JSON texts. This crate
//! holds the wire request model, the event and error types produced
//! while that body is decoded, and the callback contract consumers
//! implement to receive them. The client lives in `tally-chat`.

pub mod error;
pub mod request;
pub mod stream;

pub use error::*;
pub use request::*;
pub use stream::*;

//! Core components of the `rankapi-rs` client.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The main [`RankClient`] and its builder.
//! - The primary [`RankError`] type.
//! - The [`Session`] / [`EventHandler`] seam to the session layer.
//! - The event model ([`Event`], [`Message`]) and correlation ids.

/// The main client (`RankClient`), builder, and defaults.
pub mod client;
/// Per-request correlation ids.
pub mod correlation;
/// The primary error type (`RankError`) for the crate.
pub mod error;
/// Events and messages delivered by a session.
pub mod event;
/// The session trait, its lifecycle states, and the event handler trait.
pub mod session;
pub(crate) mod wire;

// convenient re-exports so most code can just `use crate::core::RankClient`
pub use client::{RankClient, RankClientBuilder};
pub use correlation::CorrelationId;
pub use error::RankError;
pub use event::{Event, EventKind, Message, MessageType};
pub use session::{EventHandler, Session, SessionState};

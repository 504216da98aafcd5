//! Content negotiation subsystem.
//!
//! # Data Flow
//! ```text
//! request (path, query, headers)
//!     → Negotiator::signals  (format param, URL suffix, Content-Type, Accept)
//!     → accept.rs            (ranked media ranges)
//!     → resolver.rs          (decode codec, encode codec, canonical Content-Type)
//!     → NegotiationResult, held by the pipeline for the rest of the request
//! ```
//!
//! # Design Decisions
//! - An explicit format override always beats `Accept`
//! - Permissive by default: nothing acceptable means the default format,
//!   strict 406 behavior is opt-in through configuration

pub mod accept;
pub mod resolver;

pub use accept::{parse_accept, MediaRange};
pub use resolver::{NegotiationError, NegotiationResult, Negotiator, Selection, Signals};

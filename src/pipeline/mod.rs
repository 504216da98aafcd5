//! Request lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! Success path:
//!     Negotiate → Authenticate → DecodeInput → Dispatch → PrepareOutput
//!     → EncodeOutput → WriteResponse
//!
//! Error channel (entered from any stage above):
//!     classify.rs (status + body, or the strategy's challenge)
//!     → EncodeOutput(error body, plain) → WriteResponse
//!
//! Structural outcome:
//!     Dispatch finds no handler for the method → 405 + Allow → WriteResponse
//! ```
//!
//! # Design Decisions
//! - One `Engine` per process, shared behind `Arc`; per-request state lives
//!   on the stack of `Engine::handle`
//! - Panics are caught at the stage boundary and treated like any other
//!   unclassified failure
//! - Clients never see failure details beyond a classified error's content

pub mod classify;
pub mod engine;

pub use classify::{classify, Failure, Stage, StageError};
pub use engine::Engine;

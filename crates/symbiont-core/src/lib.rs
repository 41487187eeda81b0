#![forbid(unsafe_code)]

//! Core: addresses, row resolution, configuration, and wiring errors.
//!
//! # Role in Symbiont
//! `symbiont-core` holds the pieces every other crate agrees on: how a
//! `(section, row)` address picks a value out of an outlet's contents, the
//! process-wide configuration read from the environment, and the error type
//! raised when a binding declaration is structurally broken.
//!
//! # How it fits in the system
//! The runtime (`symbiont-runtime`) owns outlets, bindings and scenes and
//! calls into [`address`] for every lookup. The harness
//! (`symbiont-harness`) builds fake views on top of the runtime for tests.

pub mod address;
pub mod config;
pub mod error;

#[cfg(feature = "tracing")]
pub mod logging;

pub use address::{IndexPath, SectionFallback, resolve, resolve_nested};
pub use config::Config;
pub use error::WiringError;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, error, info, trace, warn};

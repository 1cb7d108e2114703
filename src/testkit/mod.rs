//! Test doubles for exercising clients without a network.
//!
//! Enabled for this crate's own tests and for downstream crates via the
//! `testkit` feature.

pub mod transport;

pub use transport::{RecordedCall, ScriptedTransport};

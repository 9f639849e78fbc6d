//! # Communications interface crate.
//!
//! Provides the message definitions exchanged with the driving simulator.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Simulator event framing, telemetry and control messages
pub mod sim;

//! Caller authorization for interaction commands.
//!
//! Request authenticity (the Ed25519 signature) is checked by the
//! interactions handler before anything here runs.

pub mod role;

pub use role::RoleGate;

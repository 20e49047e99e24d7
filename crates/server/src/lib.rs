//! HTTP front end for Archivist: verifies and routes Discord interactions
//! and hands accepted `/archive` commands to the background job runner.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

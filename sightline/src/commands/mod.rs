//! CLI command implementations.
//!
//! These modules implement the user-facing CLI commands and legitimately
//! use stdout for output.

pub mod init;
pub mod serve;

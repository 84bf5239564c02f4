// Copyright (c) 2025 Sightline Foundation

//! Sightline explorer library - an address explorer API over a bitcore
//! node.
//!
//! This library provides the HTTP API, the ledger reconciliation behind
//! the per-address routes, and the time-windowed response cache that
//! keeps repeated queries off the node.

#![deny(clippy::print_stdout)]

pub mod cache;
pub mod config;
pub mod metrics;
pub mod pagination;
pub mod prices;
pub mod recent_blocks;
pub mod reconcile;
pub mod server;

// Re-export commands module for CLI binary
#[allow(clippy::print_stdout)]
pub mod commands;

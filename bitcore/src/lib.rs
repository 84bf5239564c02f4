// Copyright (c) 2025 Sightline Foundation

//! Client for bitcore nodes built with `--addressindex`, `--txindex`,
//! `--timestampindex` and `--spentindex`.
//!
//! Exposes the address-index RPCs (balances, deltas, unspent outputs,
//! mempool effects) alongside the chain queries the explorer serves
//! from, with statically typed parameters and results.

pub mod client;
pub mod params;
pub mod types;

pub use client::{BitcoreClient, Error};

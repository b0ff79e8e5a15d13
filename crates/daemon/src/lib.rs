// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! subflow-daemon: the two worker processes — download and translation —
//! that consume work queues and drive jobs through their phases. This
//! crate is the library half (config, error taxonomy, per-message
//! handlers, bootstrap helpers); `src/bin/` holds the thin binary
//! entrypoints that wire them into a running process.

pub mod bootstrap;
pub mod config;
pub mod download;
pub mod error;
pub mod logging;
pub mod translation;

pub use error::DaemonError;

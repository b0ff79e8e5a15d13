// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Broker topology constants. Kept as plain `&str` constants rather than an
//! enum because they name concrete AMQP queue/exchange identifiers, not a
//! closed Rust-side choice.

/// Durable work queue consumed by the download worker.
pub const DOWNLOAD_QUEUE: &str = "subtitle.download";

/// Durable work queue consumed by the translation worker.
pub const TRANSLATION_QUEUE: &str = "subtitle.translation";

/// Durable topic exchange lifecycle events are published to. Routing key
/// equals the event type's wire string (see [`crate::event::EventType`]).
pub const EVENTS_EXCHANGE: &str = "subtitle.events";

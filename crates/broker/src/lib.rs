// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

#![cfg_attr(test, allow(clippy::unwrap_used))]

//! subflow-broker: the AMQP connection lifecycle, publish helpers, and
//! consume loop shared by the orchestrator and both workers. Topology
//! (queue/exchange names) comes from `subflow-wire`; this crate only
//! knows how to talk to the broker, not what the messages mean.

pub mod connection;
pub mod consumer;
pub mod error;
pub mod publisher;

pub use connection::{BrokerConfig, BrokerConnection};
pub use consumer::run_consumer;
pub use error::BrokerError;
pub use publisher::{publish_to_exchange, publish_to_queue, queue_message_count};

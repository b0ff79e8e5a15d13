// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Raw publish helpers: serialize to JSON, publish with persistent
//! delivery mode. Routing-key and exchange conventions come from
//! `subflow-wire::topology`; callers (the orchestrator, the workers)
//! decide what gets published and when.

use lapin::options::BasicPublishOptions;
use lapin::{BasicProperties, Channel};
use serde::Serialize;

use crate::error::BrokerError;

const CONTENT_TYPE_JSON: &str = "application/json";
/// AMQP delivery-mode 2: the broker persists the message to disk.
const DELIVERY_MODE_PERSISTENT: u8 = 2;

fn persistent_properties() -> BasicProperties {
    BasicProperties::default()
        .with_content_type(CONTENT_TYPE_JSON.into())
        .with_delivery_mode(DELIVERY_MODE_PERSISTENT)
}

/// Publishes `body` to the default direct exchange with `routing_key`
/// equal to the destination queue name — the work-queue convention.
pub async fn publish_to_queue<T: Serialize>(
    channel: &Channel,
    queue_name: &str,
    body: &T,
) -> Result<(), BrokerError> {
    let payload = serde_json::to_vec(body)?;
    channel
        .basic_publish(
            "",
            queue_name,
            BasicPublishOptions::default(),
            &payload,
            persistent_properties(),
        )
        .await?
        .await?;
    Ok(())
}

/// Publishes `body` to a topic exchange under `routing_key` — the
/// lifecycle-event convention.
pub async fn publish_to_exchange<T: Serialize>(
    channel: &Channel,
    exchange: &str,
    routing_key: &str,
    body: &T,
) -> Result<(), BrokerError> {
    let payload = serde_json::to_vec(body)?;
    channel
        .basic_publish(
            exchange,
            routing_key,
            BasicPublishOptions::default(),
            &payload,
            persistent_properties(),
        )
        .await?
        .await?;
    Ok(())
}

/// Broker-reported message counts for the two work queues, via a passive
/// (non-mutating) queue declare.
pub async fn queue_message_count(channel: &Channel, queue_name: &str) -> Result<u32, BrokerError> {
    use lapin::options::QueueDeclareOptions;
    let queue = channel
        .queue_declare(queue_name, QueueDeclareOptions { passive: true, ..Default::default() }, Default::default())
        .await?;
    Ok(queue.message_count())
}

#[cfg(test)]
#[path = "publisher_tests.rs"]
mod tests;

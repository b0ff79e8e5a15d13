// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Subflow Contributors

//! Single-channel, prefetch-1 consume loop shared by both workers. A
//! handler either acknowledges the message by returning `Ok`, or fails it
//! by returning `Err`, which nacks-with-requeue so the broker redelivers.
//! A handler that runs past `processing_timeout` leaves the message
//! unacknowledged entirely, per the shutdown/cancellation contract.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions};
use lapin::types::FieldTable;
use lapin::Channel;
use subflow_core::ShutdownManager;
use tracing::warn;

use crate::error::BrokerError;

/// Runs until the stream ends or `shutdown.shutdown_requested()` goes
/// true, polling at most every `poll_interval` so shutdown is noticed
/// promptly between deliveries.
pub async fn run_consumer<F, Fut>(
    channel: &Channel,
    queue_name: &str,
    consumer_tag: &str,
    shutdown: &Arc<ShutdownManager>,
    processing_timeout: Duration,
    mut handle: F,
) -> Result<(), BrokerError>
where
    F: FnMut(Vec<u8>) -> Fut,
    Fut: Future<Output = Result<(), BrokerError>>,
{
    channel.basic_qos(1, BasicQosOptions::default()).await?;
    let mut consumer = channel
        .basic_consume(queue_name, consumer_tag, BasicConsumeOptions::default(), FieldTable::default())
        .await?;

    while !shutdown.shutdown_requested() {
        let next = tokio::select! {
            delivery = consumer.next() => delivery,
            _ = tokio::time::sleep(Duration::from_millis(500)) => continue,
        };
        let Some(delivery) = next else {
            break;
        };
        let delivery = delivery?;
        let payload = delivery.data.clone();

        match tokio::time::timeout(processing_timeout, handle(payload)).await {
            Ok(Ok(())) => {
                delivery.ack(BasicAckOptions::default()).await?;
            }
            Ok(Err(error)) => {
                warn!(%error, "message processing failed, nacking for redelivery");
                delivery.nack(BasicNackOptions { requeue: true, ..Default::default() }).await?;
            }
            Err(_) => {
                warn!(
                    timeout_secs = processing_timeout.as_secs(),
                    "message processing timed out, leaving unacknowledged"
                );
            }
        }
    }

    Ok(())
}

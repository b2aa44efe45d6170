use std::sync::Arc;
use std::time::Duration;

use rskafka::client::partition::{OffsetAt, PartitionClient, UnknownTopicHandling};
use rskafka::client::{Client, ClientBuilder};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::broker::producer::TRANSACTIONS_TOPIC;
use crate::processor::MessageHandler;

const INITIAL_CONNECT_RETRY: Duration = Duration::from_secs(5);
const RECONNECT_BACKOFF_FLOOR: Duration = Duration::from_secs(1);
const RECONNECT_BACKOFF_CAP: Duration = Duration::from_secs(30);
const FETCH_MAX_WAIT_MS: i32 = 1_000;
const FETCH_MAX_BYTES: i32 = 1_000_000;

/// Mirrors the lifecycle documented for the broker consumer: an initial
/// connect loop, a steady read state, and a reconnect loop on any read
/// error that isn't a clean shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionState {
    Disconnected,
    Reading,
    Reconnecting,
    Terminated,
}

pub struct BrokerConsumer<H: MessageHandler> {
    broker: String,
    topic: String,
    partition: i32,
    handler: Arc<H>,
    shutdown: watch::Receiver<bool>,
}

impl<H: MessageHandler> BrokerConsumer<H> {
    pub fn new(
        broker: impl Into<String>,
        partition: i32,
        handler: Arc<H>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            broker: broker.into(),
            topic: TRANSACTIONS_TOPIC.to_string(),
            partition,
            handler,
            shutdown,
        }
    }

    /// Runs until a shutdown signal is observed. Reconnects transparently
    /// on any non-fatal broker error.
    pub async fn run(mut self) {
        let mut state = ConnectionState::Disconnected;
        let mut partition_client: Option<PartitionClient> = None;
        let mut offset: i64 = 0;

        loop {
            if *self.shutdown.borrow() {
                state = ConnectionState::Terminated;
            }

            match state {
                ConnectionState::Terminated => {
                    info!("broker consumer shutting down");
                    return;
                }
                ConnectionState::Disconnected => {
                    match self.connect().await {
                        Ok((client, start_offset)) => {
                            partition_client = Some(client);
                            offset = start_offset;
                            info!("kafka connected, starting message consumption");
                            state = ConnectionState::Reading;
                        }
                        Err(err) => {
                            error!(error = %err, "initial kafka connection failed");
                            sleep(INITIAL_CONNECT_RETRY).await;
                        }
                    }
                }
                ConnectionState::Reading => {
                    let client = partition_client.as_ref().expect("connected before reading");
                    match client
                        .fetch_records(offset, 1..FETCH_MAX_BYTES, FETCH_MAX_WAIT_MS)
                        .await
                    {
                        Ok((records, _high_watermark)) => {
                            for record in records {
                                if let Some(value) = record.record.value {
                                    self.handler.handle(value).await;
                                }
                                offset = record.offset + 1;
                            }
                        }
                        Err(err) => {
                            error!(error = %err, "kafka read error");
                            partition_client = None;
                            state = ConnectionState::Reconnecting;
                        }
                    }
                }
                ConnectionState::Reconnecting => {
                    let mut backoff = RECONNECT_BACKOFF_FLOOR;
                    loop {
                        if *self.shutdown.borrow() {
                            state = ConnectionState::Terminated;
                            break;
                        }
                        warn!("pinging kafka for availability");
                        match self.connect().await {
                            Ok((client, resumed_offset)) => {
                                partition_client = Some(client);
                                offset = resumed_offset.max(offset);
                                info!("kafka successfully reconnected");
                                state = ConnectionState::Reading;
                                break;
                            }
                            Err(err) => {
                                error!(error = %err, "kafka unavailable");
                                sleep(backoff).await;
                                backoff = (backoff * 2).min(RECONNECT_BACKOFF_CAP);
                            }
                        }
                    }
                }
            }
        }
    }

    async fn connect(&self) -> anyhow::Result<(PartitionClient, i64)> {
        let client: Client = ClientBuilder::new(vec![self.broker.clone()]).build().await?;
        let partition = client
            .partition_client(&self.topic, self.partition, UnknownTopicHandling::Error)
            .await?;
        let offset = partition.get_offset(OffsetAt::Earliest).await.unwrap_or(0);
        Ok((partition, offset))
    }
}

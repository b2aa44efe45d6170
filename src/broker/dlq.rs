use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rskafka::client::partition::{Compression, PartitionClient, UnknownTopicHandling};
use rskafka::client::Client;
use rskafka::record::Record;
use serde::Serialize;
use time::OffsetDateTime;

use crate::broker::producer::BrokerError;
use crate::model::Transaction;

pub const DEAD_LETTER_TOPIC: &str = "transactions-dlq";

#[derive(Debug, Serialize)]
struct DeadLetterEnvelope<'a> {
    transaction: &'a Transaction,
    error: String,
    #[serde(rename = "failedAt")]
    failed_at: DateTime<Utc>,
}

/// Publishes a transaction that exhausted its retries, along with the
/// terminal error and the time of failure, keyed by transaction id.
#[async_trait]
pub trait DeadLetterWriter: Send + Sync {
    async fn write(&self, txn: &Transaction, error: &str) -> Result<(), BrokerError>;
}

pub struct KafkaDeadLetterWriter {
    partition: PartitionClient,
}

impl KafkaDeadLetterWriter {
    pub async fn connect(client: &Client, partition: i32) -> Result<Self, BrokerError> {
        let partition = client
            .partition_client(DEAD_LETTER_TOPIC, partition, UnknownTopicHandling::Error)
            .await?;
        Ok(Self { partition })
    }
}

#[async_trait]
impl DeadLetterWriter for KafkaDeadLetterWriter {
    async fn write(&self, txn: &Transaction, error: &str) -> Result<(), BrokerError> {
        let envelope = DeadLetterEnvelope {
            transaction: txn,
            error: error.to_string(),
            failed_at: Utc::now(),
        };
        let payload = serde_json::to_vec(&envelope)?;
        let record = Record {
            key: Some(txn.id.to_string().into_bytes()),
            value: Some(payload),
            headers: BTreeMap::new(),
            timestamp: OffsetDateTime::now_utc(),
        };
        self.partition
            .produce(vec![record], Compression::NoCompression)
            .await?;
        Ok(())
    }
}

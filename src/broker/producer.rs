use std::collections::BTreeMap;

use async_trait::async_trait;
use rskafka::client::partition::{Compression, PartitionClient, UnknownTopicHandling};
use rskafka::client::{Client, ClientBuilder};
use rskafka::record::Record;
use thiserror::Error;
use time::OffsetDateTime;

use crate::model::Transaction;

pub const TRANSACTIONS_TOPIC: &str = "transactions";

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error(transparent)]
    Client(#[from] rskafka::client::error::Error),
    #[error(transparent)]
    Partition(#[from] rskafka::client::partition::Error),
    #[error(transparent)]
    Encode(#[from] serde_json::Error),
}

/// Publishes serialized transactions to the main topic, keyed by transaction
/// id. Ordering across accounts is not relied on; the ledger store
/// serializes per-account writes with a row lock.
#[async_trait]
pub trait Producer: Send + Sync {
    async fn publish_transaction(&self, txn: &Transaction) -> Result<(), BrokerError>;
}

pub struct KafkaProducer {
    partition: PartitionClient,
}

impl KafkaProducer {
    pub async fn connect(broker: &str, topic: &str, partition: i32) -> Result<Self, BrokerError> {
        let client = ClientBuilder::new(vec![broker.to_string()])
            .build()
            .await?;
        let partition = client
            .partition_client(topic, partition, UnknownTopicHandling::Error)
            .await?;
        Ok(Self { partition })
    }

    pub fn from_partition_client(partition: PartitionClient) -> Self {
        Self { partition }
    }
}

#[async_trait]
impl Producer for KafkaProducer {
    async fn publish_transaction(&self, txn: &Transaction) -> Result<(), BrokerError> {
        let payload = serde_json::to_vec(txn)?;
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

/// Helper shared by [`KafkaProducer`] and the dead-letter writer to stand up
/// a bare client without pinning to a topic yet.
pub async fn connect_client(broker: &str) -> Result<Client, BrokerError> {
    Ok(ClientBuilder::new(vec![broker.to_string()]).build().await?)
}

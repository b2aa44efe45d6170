use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::{Client, Collection};
use thiserror::Error;
use uuid::Uuid;

use crate::model::Transaction;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),
}

/// Append-only record of every terminal transaction outcome. Retries and
/// replays may each write their own copy; see `find_by_account` for how a
/// caller narrows that down.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn save(&self, txn: &Transaction) -> Result<(), AuditError>;
    async fn find_by_account(&self, account_id: Uuid) -> Result<Vec<Transaction>, AuditError>;
}

pub struct MongoAuditRepository {
    collection: Collection<Transaction>,
}

impl MongoAuditRepository {
    pub fn new(client: &Client, database: &str, collection: &str) -> Self {
        let collection = client.database(database).collection(collection);
        Self { collection }
    }
}

#[async_trait]
impl AuditRepository for MongoAuditRepository {
    async fn save(&self, txn: &Transaction) -> Result<(), AuditError> {
        self.collection.insert_one(txn, None).await?;
        Ok(())
    }

    async fn find_by_account(&self, account_id: Uuid) -> Result<Vec<Transaction>, AuditError> {
        use futures::stream::TryStreamExt;

        let mut cursor = self
            .collection
            .find(doc! { "account_id": account_id }, None)
            .await?;

        let mut results = Vec::new();
        while let Some(txn) = cursor.try_next().await? {
            results.push(txn);
        }
        Ok(results)
    }
}

use std::sync::Arc;

use ledger::broker::producer;
use ledger::{BrokerConsumer, Config, KafkaDeadLetterWriter, MongoAuditRepository, PostgresLedgerStore, TransactionProcessor};
use mongodb::Client as MongoClient;
use sqlx::postgres::PgPoolOptions;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::{error, info};

const AUDIT_DATABASE: &str = "ledger";
const AUDIT_COLLECTION: &str = "transactions";
const CONSUMER_PARTITION: i32 = 0;

/// Composition root for the consumer/applier service. Runs until a shutdown
/// signal is observed or the consumer terminates on its own.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    info!("transaction processor is starting...");

    let config = Config::load()?;
    ledger::logging::init(&config.logger);
    info!(kafka = %config.kafka_broker(), "config loaded");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.dsn)
        .await?;

    let mongo_client = MongoClient::with_uri_str(config.mongo_uri()).await?;
    let audit = Arc::new(MongoAuditRepository::new(
        &mongo_client,
        AUDIT_DATABASE,
        AUDIT_COLLECTION,
    ));

    let ledger_store = Arc::new(PostgresLedgerStore::new(pool));

    let kafka_client = producer::connect_client(config.kafka_broker()).await?;
    let dlq = Arc::new(KafkaDeadLetterWriter::connect(&kafka_client, CONSUMER_PARTITION).await?);

    let processor = Arc::new(TransactionProcessor::new(ledger_store, dlq, audit));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer = BrokerConsumer::new(config.kafka_broker(), CONSUMER_PARTITION, processor, shutdown_rx);

    let consumer_task = tokio::spawn(consumer.run());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down gracefully..."),
        _ = sigint.recv() => info!("received SIGINT, shutting down gracefully..."),
        result = consumer_task => {
            match result {
                Ok(()) => info!("consumer completed work and exited"),
                Err(err) => error!(error = %err, "consumer task panicked"),
            }
            return Ok(());
        }
    }

    let _ = shutdown_tx.send(true);
    Ok(())
}

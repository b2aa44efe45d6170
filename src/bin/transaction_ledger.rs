use std::sync::Arc;

use ledger::http::{self, AppState};
use ledger::{AccountService, Config, KafkaProducer, MongoAuditRepository, PostgresAccountStore, TransactionService};
use mongodb::Client as MongoClient;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

const AUDIT_DATABASE: &str = "ledger";
const AUDIT_COLLECTION: &str = "transactions";
const ENQUEUE_PARTITION: i32 = 0;

/// Composition root for the enqueue/HTTP service. Builds every component
/// bottom-up and wires them together explicitly -- no DI container, no
/// global state.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    info!("transaction ledger service is starting...");

    let config = Config::load()?;
    ledger::logging::init(&config.logger);
    info!("configuration is loaded successfully");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.dsn)
        .await?;
    info!("postgres connection established");

    let mongo_client = MongoClient::with_uri_str(config.mongo_uri()).await?;
    let audit = Arc::new(MongoAuditRepository::new(
        &mongo_client,
        AUDIT_DATABASE,
        AUDIT_COLLECTION,
    ));

    let producer = Arc::new(
        KafkaProducer::connect(config.kafka_broker(), ledger::broker::TRANSACTIONS_TOPIC, ENQUEUE_PARTITION)
            .await?,
    );

    let account_store = Arc::new(PostgresAccountStore::new(pool));
    let account_service = Arc::new(AccountService::new(account_store));
    let transaction_service = Arc::new(TransactionService::new(producer, audit));

    let state = AppState {
        account: account_service,
        transactions: transaction_service,
    };

    let listener = tokio::net::TcpListener::bind(config.http_address()).await?;
    info!(address = %config.http_address(), "http server listening");

    if let Err(err) = axum::serve(listener, http::router(state)).await {
        error!(error = %err, "http server exited with error");
        return Err(err.into());
    }

    Ok(())
}

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
struct HandlerConfig {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Clone, Deserialize)]
struct LogConfig {
    level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggerConfig {
    handler: HandlerConfig,
    log: LogConfig,
}

impl LoggerConfig {
    pub fn handler_type(&self) -> &str {
        &self.handler.kind
    }

    pub fn log_level(&self) -> &str {
        &self.log.level
    }
}

#[derive(Debug, Clone, Deserialize)]
struct HttpConfig {
    address: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MongoConfig {
    uri: String,
}

#[derive(Debug, Clone, Deserialize)]
struct KafkaConfig {
    broker: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    http: HttpConfig,
    pub dsn: String,
    mongo: MongoConfig,
    kafka: KafkaConfig,
    pub logger: LoggerConfig,
}

impl Config {
    pub fn http_address(&self) -> &str {
        &self.http.address
    }

    pub fn mongo_uri(&self) -> &str {
        &self.mongo.uri
    }

    pub fn kafka_broker(&self) -> &str {
        &self.kafka.broker
    }

    /// Loads `http.address`, `dsn`, `mongo.uri`, `kafka.broker` and the
    /// `logger.*` keys, each overridable by an environment variable of the
    /// same name with dots replaced by underscores (`KAFKA_BROKER`, etc).
    /// The `config` crate treats dots as nesting separators, which is why
    /// these keys map onto nested structs rather than flat, dotted field
    /// names.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .set_default("http.address", "0.0.0.0:3000")?
            .set_default("logger.handler.type", "json")?
            .set_default("logger.log.level", "debug")?
            .add_source(
                config::Environment::default()
                    .separator("_")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

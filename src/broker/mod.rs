pub mod consumer;
pub mod dlq;
pub mod producer;

pub use consumer::BrokerConsumer;
pub use dlq::{DeadLetterWriter, KafkaDeadLetterWriter, DEAD_LETTER_TOPIC};
pub use producer::{BrokerError, KafkaProducer, Producer, TRANSACTIONS_TOPIC};

//! Event routing: bus and ingestion.

pub mod bus;
pub mod ingestor;

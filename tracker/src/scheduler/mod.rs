pub mod scheduler;

pub use scheduler::{IngestionScheduler, TickReport};

pub mod model;
pub mod registry;
pub mod repository;
pub mod repository_sqlx;
pub mod surge;

pub use model::{AlertStatus, PriceAlert};
pub use registry::AlertRegistry;
pub use surge::SurgeDetector;

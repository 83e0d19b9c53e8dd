pub mod model;
pub mod repository;
pub mod repository_sqlx;
pub mod resampler;
pub mod store;

pub use model::{Asset, PriceSample, UnknownAsset};
pub use resampler::{HourlyPrice, HourlyResampler, PriceHistory};
pub use store::TimeSeriesStore;

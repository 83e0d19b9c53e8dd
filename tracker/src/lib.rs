pub mod alerts;
pub mod config;
pub mod db;
pub mod metrics;
pub mod notify;
pub mod oracle;
pub mod prices;
pub mod scheduler;
pub mod service;
pub mod swap;

pub mod error;
pub mod time;

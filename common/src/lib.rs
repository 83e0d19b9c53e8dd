//! Shared bootstrap helpers for the price tracker binaries.

pub mod logger;

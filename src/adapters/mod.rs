//! Concrete implementations of the port traits.

pub mod file_config_adapter;
pub mod fs_cache_adapter;
pub mod sleep_pacer;
pub mod yahoo_adapter;

#[cfg(feature = "web")]
pub mod web;

//! # oom-core
//!
//! Ambient runtime shared by the OOM crates: layered configuration
//! ([`OomConfig`]) and tracing setup ([`init_tracing`]).

pub mod config;
pub mod logging;

pub use config::{
    ConfigError, ConfigValue, DefaultSecretResolver, FromConfigValue, OomConfig, SecretResolver,
};
pub use logging::{init_tracing, init_tracing_with};

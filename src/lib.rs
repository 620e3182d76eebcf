//! BoardHub mock backend: catalog and account stores persisted in a
//! client-local JSON key-value blob, with simulated network latency on
//! every operation.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod services;
pub mod state;

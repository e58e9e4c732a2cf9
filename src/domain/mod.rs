//! Core domain types and logic.

pub mod bar;
pub mod config;
pub mod indicator;
pub mod enrich;
pub mod signal;
pub mod backtest;
pub mod metrics;
pub mod error;

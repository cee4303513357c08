//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod regime;
pub mod sizing;
pub mod evaluator;
pub mod ranking;
pub mod pool;
pub mod pipeline;
pub mod config_validation;
pub mod error;

pub mod analyzer;
pub mod candle_store;
pub mod config;
pub mod error;
pub mod indicator;
pub mod model;
pub mod predictor;

/// 설정 로더
pub mod config_loader;

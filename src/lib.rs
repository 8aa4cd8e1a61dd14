// Core clustering
pub mod drain_config;
pub mod drain_engine;
pub mod masks;
pub mod regex_library;
pub mod tokenizer;

// Mask synthesis
pub mod llm_config;
pub mod llm_synthesizer;
pub mod offline_synthesizer;
pub mod sampling;
pub mod synthesis;
pub mod traits;

// Datasets, evaluation and binary support
pub mod api;
pub mod cli;
pub mod config;
pub mod dataset_loader;
pub mod error;
pub mod evaluation;
pub mod logging;
pub mod metrics;

pub use api::{synth_masks, Drain};
pub use drain_config::DrainConfig;
pub use drain_engine::{DrainCluster, DrainEngine};
pub use error::{MinerError, Result};
pub use masks::{Mask, MaskApplier, WILDCARD};

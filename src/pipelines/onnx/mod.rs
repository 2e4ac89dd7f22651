//! # ONNX Runtime inference
//! The exported LTP graph runs through the `ort` crate. `ModelBackend` is the seam between the
//! pipeline and the inference engine: `ONNXBackend` is the production implementation, tests plug
//! in deterministic backends.

mod backend;
pub(crate) mod common;
pub mod config;

pub use backend::ONNXBackend;
pub use common::{GraphOutput, ModelBackend, ModelInput, ModelOutput, SRLOutput};
pub use config::{ExecutionDevice, ONNXEnvironmentConfig, OptimizationLevel};

use crate::common::error::ort_builder_error;
use crate::LTPError;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use serde::{Deserialize, Serialize};

/// Name of the ONNX model file in a model directory
pub const MODEL_FILE_NAME: &str = "ltp.onnx";

/// Graph optimization level applied by ONNX Runtime when the session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    Disable,
    Level1,
    Level2,
    Level3,
}

impl From<OptimizationLevel> for GraphOptimizationLevel {
    fn from(level: OptimizationLevel) -> Self {
        match level {
            OptimizationLevel::Disable => GraphOptimizationLevel::Disable,
            OptimizationLevel::Level1 => GraphOptimizationLevel::Level1,
            OptimizationLevel::Level2 => GraphOptimizationLevel::Level2,
            OptimizationLevel::Level3 => GraphOptimizationLevel::Level3,
        }
    }
}

/// Device the ONNX session runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionDevice {
    Cpu,
    #[cfg(feature = "cuda")]
    Cuda(i32),
    #[cfg(feature = "coreml")]
    CoreML,
}

/// # ONNX Runtime session settings
/// Unset values keep the ONNX Runtime defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ONNXEnvironmentConfig {
    pub optimization_level: Option<OptimizationLevel>,
    pub num_intra_threads: Option<usize>,
    pub num_inter_threads: Option<usize>,
    pub parallel_execution: Option<bool>,
    pub enable_memory_pattern: Option<bool>,
    pub device: ExecutionDevice,
}

impl Default for ONNXEnvironmentConfig {
    fn default() -> Self {
        ONNXEnvironmentConfig {
            optimization_level: None,
            num_intra_threads: None,
            num_inter_threads: None,
            parallel_execution: None,
            enable_memory_pattern: None,
            device: ExecutionDevice::Cpu,
        }
    }
}

impl crate::Config for ONNXEnvironmentConfig {}

impl ONNXEnvironmentConfig {
    pub(crate) fn get_session_builder(&self) -> Result<SessionBuilder, LTPError> {
        let mut session_builder = Session::builder()?;
        match self.optimization_level {
            Some(OptimizationLevel::Level3) | None => {}
            Some(level) => {
                session_builder = session_builder
                    .with_optimization_level(level.into())
                    .map_err(ort_builder_error)?
            }
        }
        if let Some(num_intra_threads) = self.num_intra_threads {
            session_builder = session_builder
                .with_intra_threads(num_intra_threads)
                .map_err(ort_builder_error)?;
        }
        if let Some(num_inter_threads) = self.num_inter_threads {
            session_builder = session_builder
                .with_inter_threads(num_inter_threads)
                .map_err(ort_builder_error)?;
        }
        if let Some(parallel_execution) = self.parallel_execution {
            session_builder = session_builder
                .with_parallel_execution(parallel_execution)
                .map_err(ort_builder_error)?;
        }
        if let Some(enable_memory_pattern) = self.enable_memory_pattern {
            session_builder = session_builder
                .with_memory_pattern(enable_memory_pattern)
                .map_err(ort_builder_error)?;
        }
        match self.device {
            ExecutionDevice::Cpu => {}
            #[cfg(feature = "cuda")]
            ExecutionDevice::Cuda(device_id) => {
                use ort::execution_providers::CUDAExecutionProvider;
                session_builder = session_builder
                    .with_execution_providers([CUDAExecutionProvider::default()
                        .with_device_id(device_id)
                        .build()])
                    .map_err(ort_builder_error)?;
            }
            #[cfg(feature = "coreml")]
            ExecutionDevice::CoreML => {
                use ort::execution_providers::CoreMLExecutionProvider;
                session_builder = session_builder
                    .with_execution_providers([CoreMLExecutionProvider::default().build()])
                    .map_err(ort_builder_error)?;
            }
        }
        Ok(session_builder)
    }
}

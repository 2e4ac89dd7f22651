//! Ready-to-use Chinese NLP pipeline on ONNX Runtime: word segmentation, part-of-speech tagging,
//! named entity recognition, semantic role labelling, dependency parsing and semantic dependency
//! parsing with the LTP multi-task models.
//!
//! The model directory holds three files:
//! - `ltp.onnx`: the exported multi-task model
//! - `vocab.txt`: the WordPiece vocabulary
//! - `vocab.json`: the label vocabularies of the task heads
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use ltp::LTPModel;
//!
//! let mut ltp = LTPModel::new("path/to/ltp/model")?;
//! let output = ltp.predict(&["他叫汤姆去拿外衣！", "我爱赛尔！"])?;
//! println!("{:?}", output[1].seg);
//! # Ok(())
//! # }
//! ```
//!
//! Model files may also be fetched and cached through the `resources` module (feature `remote`,
//! cache location overridable with the `LTP_CACHE` environment variable).
//!
//! Inference runs on the CPU by default; the `cuda` and `coreml` features enable the matching
//! ONNX Runtime execution providers (`pipelines::onnx::ExecutionDevice`).

pub mod common;
pub mod pipelines;

pub use common::error::LTPError;
pub use common::{resources, Config};
pub use pipelines::columnar::{
    assemble_record_batch, ltp_result_schema, record_batch_to_map, results_from_record_batch,
    results_to_arrays,
};
pub use pipelines::ltp::{
    Dependency, Entity, LTPConfig, LTPModel, LTPResult, SRLArgument, SRLFrame, SemanticDependency,
};

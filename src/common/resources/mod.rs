//! # Resource definitions for the model, vocabulary and label files
//!
//! This crate relies on the concept of Resources to access the files used by the pipeline.
//! An LTP model directory contains:
//! - the exported ONNX graph (`ltp.onnx`)
//! - the WordPiece vocabulary used by the tokenizer (`vocab.txt`)
//! - the label vocabularies of each task head (`vocab.json`)
//!
//! Two types of resources are pre-defined:
//! - LocalResource: points to a local file
//! - RemoteResource: points to a remote file via a URL (requires the `remote` feature)
//!
//! For both types of resources, the local location of the file can be retrieved using
//! `get_local_path`, allowing to reference the resource file location regardless if it is a remote
//! or local resource.

mod local;

use crate::common::error::LTPError;
pub use local::LocalResource;
use std::path::PathBuf;

/// # Resource Trait that can provide the location of the model, vocabulary or label resources
pub trait ResourceProvider {
    /// Provides the local path for a resource.
    ///
    /// # Returns
    ///
    /// * `PathBuf` pointing to the resource file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ltp::resources::{LocalResource, ResourceProvider};
    /// use std::path::PathBuf;
    /// let labels_resource = LocalResource {
    ///     local_path: PathBuf::from("path/to/vocab.json"),
    /// };
    /// let labels_path = labels_resource.get_local_path();
    /// ```
    fn get_local_path(&self) -> Result<PathBuf, LTPError>;
}

#[cfg(feature = "remote")]
mod remote;
#[cfg(feature = "remote")]
pub use remote::RemoteResource;

//! # Ready-to-use Chinese language technology pipeline
//!
//! A single multi-task model annotates sentences with six layers:
//!
//! #### 1. Word segmentation (`seg`)
//! #### 2. Part of speech tagging (`pos`)
//! #### 3. Named entity recognition (`ner`)
//! #### 4. Semantic role labelling (`srl`)
//! #### 5. Dependency parsing (`dep`)
//! #### 6. Semantic dependency parsing (`sdp`)
//!
//! Results are returned per sentence (`ltp::LTPModel::predict`) or as Apache Arrow columns
//! (`ltp::LTPModel::pipeline_arrow`, see the `columnar` module).
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use ltp::pipelines::ltp::LTPModel;
//! let mut ltp = LTPModel::new("path/to/ltp/model")?;
//! let output = ltp.predict(&["他叫汤姆去拿外衣！"])?;
//! for entity in output[0].entities() {
//!     println!("{} {}", entity.label, entity.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod columnar;
pub mod decoding;
pub mod ltp;
pub mod onnx;
pub mod tokenizer;
pub mod vocabs;

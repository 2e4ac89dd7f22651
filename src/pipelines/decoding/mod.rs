//! # Decoders turning raw task-head outputs into annotations
//!
//! - `get_entities`: chunks of BIO/BIOES tag sequences (segmentation, NER, SRL arguments)
//! - `viterbi_decode_postprocess`: CRF back-tracking for semantic role labelling
//! - `eisner`: projective tree decoding for dependency and semantic dependency parsing

mod eisner;
mod entities;
mod viterbi;

pub use eisner::eisner;
pub use entities::get_entities;
pub use viterbi::viterbi_decode_postprocess;

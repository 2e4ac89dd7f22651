use crate::pipelines::vocabs::Task;
use crate::LTPError;
use ndarray::{Array2, Array3};

/// # Padded model inputs of a batch
/// All tensors are flattened row-major with shape `[batch_size, sequence_length]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    pub batch_size: usize,
    pub sequence_length: usize,
    pub input_ids: Vec<i64>,
    pub token_type_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub position_ids: Vec<i64>,
}

impl ModelInput {
    /// Shape shared by the four input tensors
    pub fn shape(&self) -> Vec<usize> {
        vec![self.batch_size, self.sequence_length]
    }
}

/// CRF outputs of the semantic role labelling head.
#[derive(Debug, Clone)]
pub struct SRLOutput {
    /// Back-pointers, `[max_len - 1, total_sequences, labels_num]` flattened
    pub history: Vec<i64>,
    /// Best last tag of every sequence
    pub last_tags: Vec<i64>,
}

/// Outputs of a biaffine graph head (dependency or semantic dependency parsing).
#[derive(Debug, Clone)]
pub struct GraphOutput {
    /// Arc scores `[batch, dep, head]`
    pub scores: Array3<f32>,
    /// Relation label ids `[batch, dep, head]`
    pub labels: Array3<i64>,
}

/// # Raw outputs of the task heads
/// Heads that were not requested are `None`.
#[derive(Debug, Clone)]
pub struct ModelOutput {
    /// Segmentation tag ids over content tokens, `[batch, tokens]`
    pub seg: Array2<i64>,
    /// Part-of-speech tag ids, `[batch, words]`
    pub pos: Option<Array2<i64>>,
    /// Named entity tag ids, `[batch, words]`
    pub ner: Option<Array2<i64>>,
    pub srl: Option<SRLOutput>,
    pub dep: Option<GraphOutput>,
    pub sdp: Option<GraphOutput>,
}

/// # Inference backend of the pipeline
/// Runs the multi-task model on a padded batch. `tasks` lists the heads the model provides, in
/// output order.
pub trait ModelBackend {
    fn forward(&mut self, input: &ModelInput, tasks: &[Task]) -> Result<ModelOutput, LTPError>;
}

impl<B: ModelBackend + ?Sized> ModelBackend for Box<B> {
    fn forward(&mut self, input: &ModelInput, tasks: &[Task]) -> Result<ModelOutput, LTPError> {
        (**self).forward(input, tasks)
    }
}

use crate::common::error::ort_builder_error;
use crate::pipelines::onnx::common::{
    GraphOutput, ModelBackend, ModelInput, ModelOutput, SRLOutput,
};
use crate::pipelines::onnx::config::ONNXEnvironmentConfig;
use crate::pipelines::vocabs::Task;
use crate::LTPError;
use ndarray::{Array, Array3, ArrayD, Dimension, IxDyn};
use ort::session::{Session, SessionOutputs};
use ort::value::PrimitiveTensorElementType;
use ort::value::Tensor;
use std::fmt::Debug;
use std::path::Path;
use tracing::{debug, info};

/// # Multi-task LTP model running on ONNX Runtime
/// The graph takes `input_ids`, `token_type_ids`, `attention_mask` and `position_ids` (in this
/// order, `i64`, `[batch, sequence]`) and emits the task outputs in task order.
pub struct ONNXBackend {
    session: Session,
}

impl ONNXBackend {
    /// Creates a session for the model file.
    ///
    /// # Arguments
    ///
    /// * `model_file` - path to the `ltp.onnx` file
    /// * `onnx_config` - session settings
    pub fn new<P: AsRef<Path>>(
        model_file: P,
        onnx_config: &ONNXEnvironmentConfig,
    ) -> Result<Self, LTPError> {
        let model_file = model_file.as_ref();
        info!(model = %model_file.display(), "loading ONNX model");
        let session = onnx_config
            .get_session_builder()?
            .commit_from_file(model_file)
            .map_err(ort_builder_error)?;
        debug!("ONNX session ready");
        Ok(Self { session })
    }
}

fn extract_flat<T>(outputs: &SessionOutputs<'_>, index: usize) -> Result<Vec<T>, LTPError>
where
    T: PrimitiveTensorElementType + Clone + Debug,
{
    let (_, data) = outputs[index].try_extract_tensor::<T>()?;
    Ok(data.to_vec())
}

fn extract<T>(outputs: &SessionOutputs<'_>, index: usize) -> Result<ArrayD<T>, LTPError>
where
    T: PrimitiveTensorElementType + Clone + Debug,
{
    let (shape, data) = outputs[index].try_extract_tensor::<T>()?;
    let dims = shape.iter().map(|&d| d as usize).collect::<Vec<usize>>();
    Ok(ArrayD::from_shape_vec(IxDyn(&dims), data.to_vec())?)
}

fn extract_fixed<T, D>(
    outputs: &SessionOutputs<'_>,
    index: usize,
) -> Result<Array<T, D>, LTPError>
where
    T: PrimitiveTensorElementType + Clone + Debug,
    D: Dimension,
{
    Ok(extract::<T>(outputs, index)?.into_dimensionality::<D>()?)
}

impl ModelBackend for ONNXBackend {
    fn forward(&mut self, input: &ModelInput, tasks: &[Task]) -> Result<ModelOutput, LTPError> {
        let expected_outputs = tasks.iter().map(Task::output_count).sum::<usize>();
        let shape = input.shape();
        let input_ids = Tensor::from_array((shape.clone(), input.input_ids.clone()))?;
        let token_type_ids = Tensor::from_array((shape.clone(), input.token_type_ids.clone()))?;
        let attention_mask = Tensor::from_array((shape.clone(), input.attention_mask.clone()))?;
        let position_ids = Tensor::from_array((shape, input.position_ids.clone()))?;

        let outputs = self.session.run(ort::inputs![
            input_ids,
            token_type_ids,
            attention_mask,
            position_ids
        ])?;
        if outputs.len() != expected_outputs {
            return Err(LTPError::ModelOutputError(format!(
                "model returned {} outputs, {} expected for tasks {:?}",
                outputs.len(),
                expected_outputs,
                tasks
            )));
        }

        let (mut seg, mut pos, mut ner, mut srl, mut dep, mut sdp) =
            (None, None, None, None, None, None);
        let mut index = 0;
        for task in tasks {
            match task {
                Task::Seg => seg = Some(extract_fixed(&outputs, index)?),
                Task::Pos => pos = Some(extract_fixed(&outputs, index)?),
                Task::Ner => ner = Some(extract_fixed(&outputs, index)?),
                Task::Srl => {
                    srl = Some(SRLOutput {
                        history: extract_flat(&outputs, index)?,
                        last_tags: extract_flat(&outputs, index + 1)?,
                    })
                }
                Task::Dep => dep = Some(graph_output(&outputs, index)?),
                Task::Sdp => sdp = Some(graph_output(&outputs, index)?),
            }
            index += task.output_count();
        }
        let seg = seg.ok_or_else(|| {
            LTPError::InvalidConfigurationError("the segmentation task is required".to_string())
        })?;
        Ok(ModelOutput {
            seg,
            pos,
            ner,
            srl,
            dep,
            sdp,
        })
    }
}

fn graph_output(outputs: &SessionOutputs<'_>, index: usize) -> Result<GraphOutput, LTPError> {
    let scores: Array3<f32> = extract_fixed(outputs, index)?;
    let labels: Array3<i64> = extract_fixed(outputs, index + 1)?;
    if scores.shape() != labels.shape() {
        return Err(LTPError::ModelOutputError(format!(
            "arc scores {:?} and arc labels {:?} shapes differ",
            scores.shape(),
            labels.shape()
        )));
    }
    Ok(GraphOutput { scores, labels })
}

// Copyright 2021-present, the HIT-SCIR LTP team, Harbin Institute of Technology.
// Copyright 2019 Guillaume Becquin
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # LTP pipeline
//! Chinese word segmentation, part-of-speech tagging, named entity recognition, semantic role
//! labelling, dependency parsing and semantic dependency parsing in a single forward pass of a
//! multi-task model.
//!
//! A model directory holds the ONNX graph (`ltp.onnx`), the WordPiece vocabulary (`vocab.txt`)
//! and the label vocabularies of the task heads (`vocab.json`). Tasks absent from `vocab.json`
//! are reported as `None`.
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use ltp::pipelines::ltp::LTPModel;
//! let mut ltp = LTPModel::new("path/to/ltp/model")?;
//!
//! let input = ["他叫汤姆去拿外衣！", "我爱赛尔！"];
//! let output = ltp.predict(&input)?;
//! # Ok(())
//! # }
//! ```
//! Output for the second sentence: \
//! ```no_run
//! # use ltp::pipelines::ltp::{Dependency, LTPResult};
//! # let output =
//! LTPResult {
//!     seg: Some(vec!["我".into(), "爱".into(), "赛尔".into(), "！".into()]),
//!     pos: Some(vec!["r".into(), "v".into(), "nz".into(), "wp".into()]),
//!     ner: Some(vec!["O".into(), "O".into(), "O".into(), "O".into()]),
//!     srl: None,
//!     dep: Some(vec![
//!         Dependency { arc: 2, rel: "SBV".into() },
//!         Dependency { arc: 0, rel: "HED".into() },
//!         Dependency { arc: 2, rel: "VOB".into() },
//!         Dependency { arc: 2, rel: "WP".into() },
//!     ]),
//!     sdp: None,
//! }
//! # ;
//! ```

use crate::common::error::LTPError;
use crate::pipelines::decoding::{eisner, get_entities, viterbi_decode_postprocess};
use crate::pipelines::onnx::config::MODEL_FILE_NAME;
use crate::pipelines::onnx::{
    GraphOutput, ModelBackend, ModelOutput, ONNXBackend, ONNXEnvironmentConfig,
};
use crate::pipelines::tokenizer::{CharSpan, LTPTokenizer};
use crate::pipelines::vocabs::{Task, Vocab};
#[cfg(feature = "remote")]
use crate::resources::RemoteResource;
use crate::resources::{LocalResource, ResourceProvider};
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Name of the WordPiece vocabulary file in a model directory
pub const VOCAB_FILE_NAME: &str = "vocab.txt";
/// Name of the label vocabularies file in a model directory
pub const LABELS_FILE_NAME: &str = "vocab.json";

/// Sequence length (special tokens included) of the position embeddings of the LTP models
pub const DEFAULT_MAX_LENGTH: usize = 512;
pub const DEFAULT_BATCH_SIZE: usize = 8;

/// # Dependency arc of a word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// 1-based index of the head word, 0 for the root
    pub arc: usize,
    /// Relation label
    pub rel: String,
}

/// # Labelled edge of the semantic dependency graph
/// Word indices are 1-based, `tgt == 0` is the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticDependency {
    pub src: usize,
    pub tgt: usize,
    pub rel: String,
}

/// # Named entity spanning words `start..=end`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub label: String,
    pub start: usize,
    pub end: usize,
    /// Concatenation of the entity words
    pub text: String,
}

/// # Argument of a semantic role frame, spanning words `start..=end`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SRLArgument {
    pub label: String,
    pub start: usize,
    pub end: usize,
}

/// # Semantic role frame of a predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SRLFrame {
    /// 0-based index of the predicate word
    pub predicate: usize,
    pub arguments: Vec<SRLArgument>,
}

/// # Annotations of a sentence
/// Per-word layers hold exactly one entry per word of `seg`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LTPResult {
    /// Words
    pub seg: Option<Vec<String>>,
    /// Part-of-speech tag of each word
    pub pos: Option<Vec<String>>,
    /// Named entity tag of each word (BIO/BIOES)
    pub ner: Option<Vec<String>>,
    /// Argument tags of the whole sentence with each word taken as predicate
    pub srl: Option<Vec<Vec<String>>>,
    /// Dependency arc of each word
    pub dep: Option<Vec<Dependency>>,
    /// Semantic dependency graph edges
    pub sdp: Option<Vec<SemanticDependency>>,
}

impl LTPResult {
    /// Named entities decoded from the `ner` tags.
    pub fn entities(&self) -> Vec<Entity> {
        let (Some(words), Some(tags)) = (&self.seg, &self.ner) else {
            return Vec::new();
        };
        get_entities(tags.as_slice())
            .into_iter()
            .filter(|(_, _, end)| *end < words.len())
            .map(|(label, start, end)| Entity {
                label: label.to_string(),
                start,
                end,
                text: words[start..=end].concat(),
            })
            .collect()
    }

    /// Semantic role frames of the predicates that have at least one argument.
    pub fn srl_frames(&self) -> Vec<SRLFrame> {
        let Some(srl) = &self.srl else {
            return Vec::new();
        };
        srl.iter()
            .enumerate()
            .filter_map(|(predicate, tags)| {
                let arguments = get_entities(tags.as_slice())
                    .into_iter()
                    .map(|(label, start, end)| SRLArgument {
                        label: label.to_string(),
                        start,
                        end,
                    })
                    .collect::<Vec<SRLArgument>>();
                if arguments.is_empty() {
                    None
                } else {
                    Some(SRLFrame {
                        predicate,
                        arguments,
                    })
                }
            })
            .collect()
    }
}

/// # Configuration for the LTP pipeline
pub struct LTPConfig {
    /// ONNX graph resource (`ltp.onnx`)
    pub model_resource: Box<dyn ResourceProvider + Send>,
    /// WordPiece vocabulary resource (`vocab.txt`)
    pub vocab_resource: Box<dyn ResourceProvider + Send>,
    /// Label vocabularies resource (`vocab.json`)
    pub labels_resource: Box<dyn ResourceProvider + Send>,
    /// ONNX Runtime session settings
    pub onnx_config: ONNXEnvironmentConfig,
    /// Number of sentences per forward pass
    pub batch_size: usize,
    /// Maximum number of tokens per sentence, `[CLS]` and `[SEP]` included
    pub max_length: usize,
}

impl LTPConfig {
    /// Configuration for a local model directory with the default settings.
    ///
    /// # Arguments
    ///
    /// * `directory` - directory containing `ltp.onnx`, `vocab.txt` and `vocab.json`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ltp::pipelines::ltp::LTPConfig;
    /// let config = LTPConfig::from_directory("path/to/ltp/model");
    /// ```
    pub fn from_directory<P: AsRef<Path>>(directory: P) -> LTPConfig {
        let directory = directory.as_ref();
        LTPConfig {
            model_resource: Box::new(LocalResource::from_directory(directory, MODEL_FILE_NAME)),
            vocab_resource: Box::new(LocalResource::from_directory(directory, VOCAB_FILE_NAME)),
            labels_resource: Box::new(LocalResource::from_directory(
                directory,
                LABELS_FILE_NAME,
            )),
            onnx_config: ONNXEnvironmentConfig::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    /// Configuration for a model directory published under `base_url`. The model files are
    /// downloaded on first use and cached under `<cache root>/<model_name>`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use ltp::pipelines::ltp::{LTPConfig, LTPModel};
    /// let config = LTPConfig::from_remote("ltp-small", "https://my-mirror/ltp-small");
    /// let ltp = LTPModel::new_with_config(config)?;
    /// # Ok(())
    /// # }
    /// ```
    #[cfg(feature = "remote")]
    pub fn from_remote(model_name: &str, base_url: &str) -> LTPConfig {
        let resource = |file_name: &str| {
            RemoteResource::from_model_directory(model_name, base_url, file_name)
        };
        LTPConfig {
            model_resource: Box::new(resource(MODEL_FILE_NAME)),
            vocab_resource: Box::new(resource(VOCAB_FILE_NAME)),
            labels_resource: Box::new(resource(LABELS_FILE_NAME)),
            onnx_config: ONNXEnvironmentConfig::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

/// # LTP pipeline model
pub struct LTPModel<B = ONNXBackend> {
    tokenizer: LTPTokenizer,
    vocab: Vocab,
    tasks: Vec<Task>,
    backend: B,
    batch_size: usize,
    max_length: usize,
}

impl LTPModel<ONNXBackend> {
    /// Loads the pipeline from a model directory with the default settings.
    ///
    /// # Arguments
    ///
    /// * `model_directory` - directory containing `ltp.onnx`, `vocab.txt` and `vocab.json`
    pub fn new<P: AsRef<Path>>(model_directory: P) -> Result<LTPModel<ONNXBackend>, LTPError> {
        Self::new_with_config(LTPConfig::from_directory(model_directory))
    }

    /// Builds the pipeline from a configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - `LTPConfig` object containing the resource references and run settings
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use ltp::pipelines::ltp::{LTPConfig, LTPModel};
    /// let config = LTPConfig {
    ///     batch_size: 32,
    ///     ..LTPConfig::from_directory("path/to/ltp/model")
    /// };
    /// let ltp = LTPModel::new_with_config(config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new_with_config(config: LTPConfig) -> Result<LTPModel<ONNXBackend>, LTPError> {
        let labels_path = config.labels_resource.get_local_path()?;
        let vocab_path = config.vocab_resource.get_local_path()?;
        let model_path = config.model_resource.get_local_path()?;

        let vocab = Vocab::load(&labels_path)?;
        let tokenizer = LTPTokenizer::from_file(&vocab_path)?;
        let backend = ONNXBackend::new(&model_path, &config.onnx_config)?;
        LTPModel::new_with_backend(
            tokenizer,
            vocab,
            backend,
            config.batch_size,
            config.max_length,
        )
    }
}

impl<B: ModelBackend> LTPModel<B> {
    /// Builds the pipeline around an inference backend.
    ///
    /// # Arguments
    ///
    /// * `tokenizer` - WordPiece tokenizer of the model
    /// * `vocab` - label vocabularies, `seg` is required
    /// * `backend` - inference backend emitting the outputs of `vocab.tasks()`
    /// * `batch_size` - number of sentences per forward pass
    /// * `max_length` - maximum number of tokens per sentence, special tokens included
    pub fn new_with_backend(
        tokenizer: LTPTokenizer,
        vocab: Vocab,
        backend: B,
        batch_size: usize,
        max_length: usize,
    ) -> Result<LTPModel<B>, LTPError> {
        vocab.validate()?;
        if batch_size == 0 {
            return Err(LTPError::InvalidConfigurationError(
                "batch size must be at least 1".to_string(),
            ));
        }
        if max_length < 3 {
            return Err(LTPError::InvalidConfigurationError(format!(
                "maximum length {max_length} leaves no room for the sentence tokens"
            )));
        }
        let tasks = vocab.tasks();
        info!(?tasks, batch_size, max_length, "LTP pipeline ready");
        Ok(LTPModel {
            tokenizer,
            vocab,
            tasks,
            backend,
            batch_size,
            max_length,
        })
    }

    /// Tasks produced by the loaded model, in output order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn vocab(&self) -> &Vocab {
        &self.vocab
    }

    /// Annotates a list of sentences.
    ///
    /// # Arguments
    ///
    /// * `input` - sentences to annotate
    ///
    /// # Returns
    ///
    /// * `Vec<LTPResult>` one result per input sentence, in input order
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use ltp::pipelines::ltp::LTPModel;
    /// let mut ltp = LTPModel::new("path/to/ltp/model")?;
    /// let output = ltp.predict(&["他叫汤姆去拿外衣！", "我爱赛尔！"])?;
    /// assert_eq!(output.len(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn predict<S>(&mut self, input: &[S]) -> Result<Vec<LTPResult>, LTPError>
    where
        S: AsRef<str>,
    {
        let mut results = Vec::with_capacity(input.len());
        for batch in input.chunks(self.batch_size) {
            let sentences = batch
                .iter()
                .map(|sentence| sentence.as_ref())
                .collect::<Vec<&str>>();
            results.extend(self.predict_batch(&sentences)?);
        }
        Ok(results)
    }

    /// Annotates a single sentence.
    pub fn predict_one(&mut self, sentence: &str) -> Result<LTPResult, LTPError> {
        self.predict(&[sentence])?.pop().ok_or_else(|| {
            LTPError::ModelOutputError("no result returned for the sentence".to_string())
        })
    }

    fn predict_batch(&mut self, sentences: &[&str]) -> Result<Vec<LTPResult>, LTPError> {
        let encoded = self.tokenizer.encode_batch(sentences, self.max_length)?;
        debug!(
            batch_size = encoded.input.batch_size,
            sequence_length = encoded.input.sequence_length,
            "running batch"
        );
        let output = self.backend.forward(&encoded.input, &self.tasks)?;
        self.decode(sentences, &encoded.spans, output)
    }

    fn decode(
        &self,
        sentences: &[&str],
        spans: &[Vec<CharSpan>],
        output: ModelOutput,
    ) -> Result<Vec<LTPResult>, LTPError> {
        let words = self.decode_segmentation(sentences, spans, &output.seg)?;
        let word_lengths = words.iter().map(Vec::len).collect::<Vec<usize>>();

        let pos = output
            .pos
            .map(|pos| self.decode_tags(Task::Pos, &pos, &word_lengths))
            .transpose()?;
        let ner = output
            .ner
            .map(|ner| self.decode_tags(Task::Ner, &ner, &word_lengths))
            .transpose()?;
        let srl = output
            .srl
            .map(|srl| {
                let paths = viterbi_decode_postprocess(
                    &srl.history,
                    &srl.last_tags,
                    &word_lengths,
                    self.vocab.num_labels(Task::Srl),
                )?;
                let mut paths = paths.into_iter();
                word_lengths
                    .iter()
                    .map(|&length| {
                        paths
                            .by_ref()
                            .take(length)
                            .map(|path| self.labels_of(Task::Srl, &path))
                            .collect::<Result<Vec<Vec<String>>, LTPError>>()
                    })
                    .collect::<Result<Vec<_>, LTPError>>()
            })
            .transpose()?;
        let dep = output
            .dep
            .map(|dep| self.decode_dependencies(&dep, &word_lengths))
            .transpose()?;
        let sdp = output
            .sdp
            .map(|sdp| self.decode_semantic_dependencies(&sdp, &word_lengths))
            .transpose()?;

        let mut pos = pos.map(Vec::into_iter);
        let mut ner = ner.map(Vec::into_iter);
        let mut srl = srl.map(Vec::into_iter);
        let mut dep = dep.map(Vec::into_iter);
        let mut sdp = sdp.map(Vec::into_iter);
        Ok(words
            .into_iter()
            .map(|seg| LTPResult {
                seg: Some(seg),
                pos: pos.as_mut().and_then(|pos| pos.next()),
                ner: ner.as_mut().and_then(|ner| ner.next()),
                srl: srl.as_mut().and_then(|srl| srl.next()),
                dep: dep.as_mut().and_then(|dep| dep.next()),
                sdp: sdp.as_mut().and_then(|sdp| sdp.next()),
            })
            .collect())
    }

    fn labels_of(&self, task: Task, ids: &[i64]) -> Result<Vec<String>, LTPError> {
        ids.iter()
            .map(|&id| self.vocab.label(task, id).map(String::from))
            .collect()
    }

    fn decode_segmentation(
        &self,
        sentences: &[&str],
        spans: &[Vec<CharSpan>],
        seg: &Array2<i64>,
    ) -> Result<Vec<Vec<String>>, LTPError> {
        let max_tokens = spans.iter().map(Vec::len).max().unwrap_or(0);
        if seg.nrows() != sentences.len() || seg.ncols() < max_tokens {
            return Err(LTPError::ModelOutputError(format!(
                "segmentation output of shape {:?} for {} sentences of at most {} tokens",
                seg.shape(),
                sentences.len(),
                max_tokens
            )));
        }

        sentences
            .iter()
            .zip(spans.iter())
            .enumerate()
            .map(|(b, (sentence, token_spans))| {
                let tags = self.labels_of(
                    Task::Seg,
                    &seg.slice(s![b, ..token_spans.len()]).to_vec(),
                )?;
                let chars = sentence.chars().collect::<Vec<char>>();
                get_entities(tags.as_slice())
                    .into_iter()
                    .map(|(_, first, last)| {
                        let (begin, _) = token_spans[first];
                        let (_, end) = token_spans[last];
                        chars
                            .get(begin..end)
                            .map(|word| word.iter().collect::<String>())
                            .ok_or_else(|| {
                                LTPError::TokenizerError(format!(
                                    "token span {begin}..{end} outside of sentence {b}"
                                ))
                            })
                    })
                    .collect::<Result<Vec<String>, LTPError>>()
            })
            .collect()
    }

    fn decode_tags(
        &self,
        task: Task,
        tags: &Array2<i64>,
        word_lengths: &[usize],
    ) -> Result<Vec<Vec<String>>, LTPError> {
        check_rows(task, tags.nrows(), tags.ncols(), word_lengths, 0)?;
        word_lengths
            .iter()
            .enumerate()
            .map(|(b, &length)| self.labels_of(task, &tags.slice(s![b, ..length]).to_vec()))
            .collect()
    }

    fn decode_dependencies(
        &self,
        dep: &GraphOutput,
        word_lengths: &[usize],
    ) -> Result<Vec<Vec<Dependency>>, LTPError> {
        check_graph(Task::Dep, dep, word_lengths)?;
        word_lengths
            .iter()
            .enumerate()
            .map(|(b, &length)| {
                let heads = sentence_heads(dep, b, length)?;
                heads
                    .iter()
                    .enumerate()
                    .map(|(word, &head)| {
                        Ok(Dependency {
                            arc: head,
                            rel: self
                                .vocab
                                .label(Task::Dep, dep.labels[[b, word + 1, head]])?
                                .to_string(),
                        })
                    })
                    .collect()
            })
            .collect()
    }

    fn decode_semantic_dependencies(
        &self,
        sdp: &GraphOutput,
        word_lengths: &[usize],
    ) -> Result<Vec<Vec<SemanticDependency>>, LTPError> {
        check_graph(Task::Sdp, sdp, word_lengths)?;
        word_lengths
            .iter()
            .enumerate()
            .map(|(b, &length)| {
                let heads = sentence_heads(sdp, b, length)?;
                let mut edges = Vec::new();
                for word in 1..=length {
                    for target in 0..=length {
                        // the tree backbone keeps the graph connected
                        if sdp.scores[[b, word, target]] > 0.0 || heads[word - 1] == target {
                            edges.push(SemanticDependency {
                                src: word,
                                tgt: target,
                                rel: self
                                    .vocab
                                    .label(Task::Sdp, sdp.labels[[b, word, target]])?
                                    .to_string(),
                            });
                        }
                    }
                }
                Ok(edges)
            })
            .collect()
    }
}

fn check_rows(
    task: Task,
    rows: usize,
    columns: usize,
    word_lengths: &[usize],
    extra_columns: usize,
) -> Result<(), LTPError> {
    let max_words = word_lengths.iter().copied().max().unwrap_or(0);
    if rows != word_lengths.len() || columns < max_words + extra_columns {
        return Err(LTPError::ModelOutputError(format!(
            "`{task}` output of {rows}x{columns} for {} sentences of at most {max_words} words",
            word_lengths.len()
        )));
    }
    Ok(())
}

fn check_graph(task: Task, graph: &GraphOutput, word_lengths: &[usize]) -> Result<(), LTPError> {
    if graph.scores.dim() != graph.labels.dim() {
        return Err(LTPError::ModelOutputError(format!(
            "`{task}` arc scores {:?} and arc labels {:?} shapes differ",
            graph.scores.shape(),
            graph.labels.shape()
        )));
    }
    let (batch, dependents, heads) = graph.scores.dim();
    check_rows(task, batch, dependents.min(heads), word_lengths, 1)
}

/// Eisner heads of the words of sentence `b`, the root excluded.
fn sentence_heads(graph: &GraphOutput, b: usize, length: usize) -> Result<Vec<usize>, LTPError> {
    if length == 0 {
        return Ok(Vec::new());
    }
    let scores = graph
        .scores
        .slice(s![b, ..length + 1, ..length + 1])
        .iter()
        .copied()
        .collect::<Vec<f32>>();
    eisner(&scores, &[length + 1], true)?
        .pop()
        .ok_or_else(|| LTPError::ModelOutputError(format!("no tree decoded for sentence {b}")))
}

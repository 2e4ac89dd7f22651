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

//! # Label vocabularies of the task heads
//!
//! `vocab.json` holds, for each task the exported model was trained on, the list of labels
//! indexed by the ids the model outputs. A task absent from the file is not produced by the
//! model, and its output tensors are absent from the ONNX graph.
//!
//! ```json
//! {
//!   "seg": ["B-W", "I-W"],
//!   "pos": ["n", "v", "wp"],
//!   "ner": ["O", "B-Nh", "I-Nh"]
//! }
//! ```

use crate::common::error::LTPError;
use crate::Config;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// # Annotation layers produced by the pipeline, in model output order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Word segmentation
    Seg,
    /// Part-of-speech tagging
    Pos,
    /// Named entity recognition
    Ner,
    /// Semantic role labelling
    Srl,
    /// Dependency parsing
    Dep,
    /// Semantic dependency parsing
    Sdp,
}

impl Task {
    /// All tasks, in the order of the model outputs and of the columnar schema.
    pub const ALL: [Task; 6] = [
        Task::Seg,
        Task::Pos,
        Task::Ner,
        Task::Srl,
        Task::Dep,
        Task::Sdp,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Task::Seg => "seg",
            Task::Pos => "pos",
            Task::Ner => "ner",
            Task::Srl => "srl",
            Task::Dep => "dep",
            Task::Sdp => "sdp",
        }
    }

    /// Number of tensors the exported graph emits for this task.
    pub fn output_count(&self) -> usize {
        match self {
            Task::Seg | Task::Pos | Task::Ner => 1,
            // CRF history + last tags / arc scores + arc labels
            Task::Srl | Task::Dep | Task::Sdp => 2,
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// # Label vocabularies, one optional list per task
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Vocab {
    pub seg: Option<Vec<String>>,
    pub pos: Option<Vec<String>>,
    pub ner: Option<Vec<String>>,
    pub srl: Option<Vec<String>>,
    pub dep: Option<Vec<String>>,
    pub sdp: Option<Vec<String>>,
}

impl Config for Vocab {}

impl Vocab {
    /// Loads and validates the label vocabularies from a `vocab.json` file.
    ///
    /// # Arguments
    ///
    /// * `path` - path to the `vocab.json` file
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use ltp::pipelines::vocabs::Vocab;
    /// let vocab = Vocab::load("path/to/model/vocab.json")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Vocab, LTPError> {
        let vocab = Vocab::from_file(path)?;
        vocab.validate()?;
        Ok(vocab)
    }

    /// Checks the segmentation labels are present and no task has an empty label list.
    pub fn validate(&self) -> Result<(), LTPError> {
        if self.seg.is_none() {
            return Err(LTPError::InvalidConfigurationError(
                "the label vocabulary has no `seg` entry, segmentation is required".to_string(),
            ));
        }
        for task in Task::ALL {
            if let Some(labels) = self.labels(task) {
                if labels.is_empty() {
                    return Err(LTPError::InvalidConfigurationError(format!(
                        "empty label list for task `{task}`"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn labels(&self, task: Task) -> Option<&[String]> {
        match task {
            Task::Seg => self.seg.as_deref(),
            Task::Pos => self.pos.as_deref(),
            Task::Ner => self.ner.as_deref(),
            Task::Srl => self.srl.as_deref(),
            Task::Dep => self.dep.as_deref(),
            Task::Sdp => self.sdp.as_deref(),
        }
    }

    pub fn has_task(&self, task: Task) -> bool {
        self.labels(task).is_some()
    }

    /// Tasks provided by the model, in output order.
    pub fn tasks(&self) -> Vec<Task> {
        Task::ALL
            .iter()
            .copied()
            .filter(|task| self.has_task(*task))
            .collect()
    }

    /// Number of labels of a task (0 for an absent task).
    pub fn num_labels(&self, task: Task) -> usize {
        self.labels(task).map_or(0, |labels| labels.len())
    }

    /// Resolves a label id emitted by the model.
    ///
    /// # Arguments
    ///
    /// * `task` - task head that emitted the id
    /// * `id` - label index
    ///
    /// # Returns
    ///
    /// * `&str` label, or a `ModelOutputError` if the task is absent or the id out of range
    pub fn label(&self, task: Task, id: i64) -> Result<&str, LTPError> {
        let labels = self.labels(task).ok_or_else(|| {
            LTPError::ModelOutputError(format!("no label vocabulary for task `{task}`"))
        })?;
        usize::try_from(id)
            .ok()
            .and_then(|index| labels.get(index))
            .map(String::as_str)
            .ok_or_else(|| {
                LTPError::ModelOutputError(format!(
                    "label id {id} out of range for task `{task}` ({} labels)",
                    labels.len()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_vocab() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(
            file,
            r#"{{"seg": ["B-W", "I-W"], "pos": ["n", "v"], "dep": ["HED", "SBV"]}}"#
        )?;

        let vocab = Vocab::load(file.path())?;

        assert_eq!(vocab.tasks(), vec![Task::Seg, Task::Pos, Task::Dep]);
        assert_eq!(vocab.num_labels(Task::Pos), 2);
        assert_eq!(vocab.num_labels(Task::Ner), 0);
        assert_eq!(vocab.label(Task::Dep, 1)?, "SBV");
        assert!(vocab.label(Task::Dep, 2).is_err());
        assert!(vocab.label(Task::Dep, -1).is_err());
        assert!(vocab.label(Task::Srl, 0).is_err());
        Ok(())
    }

    #[test]
    fn vocab_without_segmentation_is_rejected() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{"pos": ["n", "v"]}}"#)?;

        assert!(matches!(
            Vocab::load(file.path()),
            Err(LTPError::InvalidConfigurationError(_))
        ));
        Ok(())
    }

    #[test]
    fn malformed_vocab_is_rejected() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, r#"{{"seg": "B-W"}}"#)?;

        assert!(Vocab::load(file.path()).is_err());
        Ok(())
    }
}

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

//! # WordPiece tokenization of the pipeline inputs
//! Chinese characters are split into individual tokens by the BERT pre-tokenizer, other scripts go
//! through WordPiece. Every content token keeps its character span in the original sentence, which
//! is how segmentation chunks are mapped back to words.

use crate::common::error::LTPError;
use crate::pipelines::onnx::ModelInput;
use rust_tokenizers::tokenizer::{BertTokenizer, MultiThreadedTokenizer, TruncationStrategy};
use rust_tokenizers::vocab::BertVocab;
use rust_tokenizers::TokenizedInput;
use std::path::Path;

/// Character span `[begin, end)` of a token in its sentence.
pub type CharSpan = (usize, usize);

/// # Tokenized and padded batch of sentences
#[derive(Debug, Clone)]
pub struct EncodedBatch {
    /// Padded model inputs
    pub input: ModelInput,
    /// Character spans of the content tokens of each sentence (`[CLS]`/`[SEP]` excluded)
    pub spans: Vec<Vec<CharSpan>>,
}

impl EncodedBatch {
    /// Number of content tokens of each sentence.
    pub fn token_lengths(&self) -> Vec<usize> {
        self.spans.iter().map(Vec::len).collect()
    }
}

/// # BERT WordPiece tokenizer of the LTP models
pub struct LTPTokenizer {
    tokenizer: BertTokenizer,
    pad_id: i64,
}

impl LTPTokenizer {
    /// Loads the tokenizer from a WordPiece vocabulary (`vocab.txt`).
    ///
    /// Input is lower-cased and accents are stripped, matching the normalization the models were
    /// trained with.
    ///
    /// # Arguments
    ///
    /// * `vocab_path` - path to the `vocab.txt` file
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use ltp::pipelines::tokenizer::LTPTokenizer;
    /// let tokenizer = LTPTokenizer::from_file("path/to/model/vocab.txt")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(vocab_path: P) -> Result<LTPTokenizer, LTPError> {
        let vocab_path = vocab_path.as_ref();
        let path_str = vocab_path.to_str().ok_or_else(|| {
            LTPError::IOError(format!("non UTF-8 vocabulary path {}", vocab_path.display()))
        })?;
        let tokenizer = BertTokenizer::from_file(path_str, true, true)?;
        Self::new(tokenizer)
    }

    /// Wraps an existing `BertTokenizer`. The vocabulary must define the `[PAD]` token.
    pub fn new(tokenizer: BertTokenizer) -> Result<LTPTokenizer, LTPError> {
        let pad_id = *MultiThreadedTokenizer::vocab(&tokenizer)
            .special_values
            .get(BertVocab::pad_value())
            .ok_or_else(|| {
                LTPError::TokenizerError("PAD token not found in vocabulary".to_string())
            })?;
        Ok(LTPTokenizer { tokenizer, pad_id })
    }

    pub fn pad_id(&self) -> i64 {
        self.pad_id
    }

    /// Tokenizes a batch of sentences and pads it to its longest sequence.
    ///
    /// # Arguments
    ///
    /// * `sentences` - sentences to encode
    /// * `max_length` - maximum sequence length accepted by the model, special tokens included
    ///
    /// # Returns
    ///
    /// * `EncodedBatch` with right-padded `input_ids`, `token_type_ids` (all 0),
    ///   `attention_mask` and `position_ids` (`0..sequence_length` on every row)
    pub fn encode_batch(
        &self,
        sentences: &[&str],
        max_length: usize,
    ) -> Result<EncodedBatch, LTPError> {
        let tokenized_input: Vec<TokenizedInput> = MultiThreadedTokenizer::encode_list(
            &self.tokenizer,
            sentences,
            max_length,
            &TruncationStrategy::LongestFirst,
            0,
        );

        let mut spans = Vec::with_capacity(tokenized_input.len());
        for (sentence_index, input) in tokenized_input.iter().enumerate() {
            if input.num_truncated_tokens > 0 {
                return Err(LTPError::ValueError(format!(
                    "sentence {} is {} tokens longer than the maximum length of {}",
                    sentence_index, input.num_truncated_tokens, max_length
                )));
            }
            spans.push(Self::content_spans(input, sentence_index)?);
        }

        let batch_size = tokenized_input.len();
        let sequence_length = tokenized_input
            .iter()
            .map(|input| input.token_ids.len())
            .max()
            .unwrap_or(0);

        let mut input_ids = Vec::with_capacity(batch_size * sequence_length);
        let mut attention_mask = Vec::with_capacity(batch_size * sequence_length);
        for input in tokenized_input.iter() {
            let padding = sequence_length - input.token_ids.len();
            input_ids.extend_from_slice(&input.token_ids);
            input_ids.extend(std::iter::repeat(self.pad_id).take(padding));
            attention_mask.extend(std::iter::repeat(1i64).take(input.token_ids.len()));
            attention_mask.extend(std::iter::repeat(0i64).take(padding));
        }
        let token_type_ids = vec![0i64; batch_size * sequence_length];
        let position_ids = (0..batch_size)
            .flat_map(|_| 0..sequence_length as i64)
            .collect::<Vec<i64>>();

        Ok(EncodedBatch {
            input: ModelInput {
                batch_size,
                sequence_length,
                input_ids,
                token_type_ids,
                attention_mask,
                position_ids,
            },
            spans,
        })
    }

    fn content_spans(
        input: &TokenizedInput,
        sentence_index: usize,
    ) -> Result<Vec<CharSpan>, LTPError> {
        // [CLS] content [SEP]
        let content_length = input.token_ids.len().saturating_sub(2);
        input
            .token_offsets
            .iter()
            .skip(1)
            .take(content_length)
            .map(|offset| {
                offset
                    .map(|offset| (offset.begin as usize, offset.end as usize))
                    .ok_or_else(|| {
                        LTPError::TokenizerError(format!(
                            "token without character offset in sentence {sentence_index}"
                        ))
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vocab_file() -> anyhow::Result<tempfile::NamedTempFile> {
        let mut file = tempfile::NamedTempFile::new()?;
        for token in [
            "[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]", "我", "爱", "赛", "尔", "！",
        ] {
            writeln!(file, "{token}")?;
        }
        Ok(file)
    }

    #[test]
    fn test_tokenizer() -> anyhow::Result<()> {
        let vocab = vocab_file()?;
        let tokenizer = LTPTokenizer::from_file(vocab.path())?;

        let batch = tokenizer.encode_batch(&["我爱赛尔！", "我爱"], 512)?;

        assert_eq!(batch.input.batch_size, 2);
        assert_eq!(batch.input.sequence_length, 7);
        assert_eq!(batch.token_lengths(), vec![5, 2]);
        assert_eq!(batch.spans[0], vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);
        assert_eq!(&batch.input.input_ids[..7], &[2, 5, 6, 7, 8, 9, 3]);
        assert_eq!(&batch.input.input_ids[7..], &[2, 5, 6, 3, 0, 0, 0]);
        assert_eq!(&batch.input.attention_mask[7..], &[1, 1, 1, 1, 0, 0, 0]);
        assert_eq!(&batch.input.position_ids[7..], &[0, 1, 2, 3, 4, 5, 6]);
        assert!(batch.input.token_type_ids.iter().all(|&id| id == 0));
        Ok(())
    }

    #[test]
    fn unknown_characters_keep_their_offsets() -> anyhow::Result<()> {
        let vocab = vocab_file()?;
        let tokenizer = LTPTokenizer::from_file(vocab.path())?;

        let batch = tokenizer.encode_batch(&["他爱我"], 512)?;

        assert_eq!(&batch.input.input_ids, &[2, 1, 6, 5, 3]);
        assert_eq!(batch.spans[0], vec![(0, 1), (1, 2), (2, 3)]);
        Ok(())
    }

    #[test]
    fn over_long_sentences_are_rejected() -> anyhow::Result<()> {
        let vocab = vocab_file()?;
        let tokenizer = LTPTokenizer::from_file(vocab.path())?;

        let result = tokenizer.encode_batch(&["我爱赛尔"], 4);

        assert!(matches!(result, Err(LTPError::ValueError(_))));
        Ok(())
    }
}

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

//! # CRF best path back-tracking
//! The semantic role labelling head runs the Viterbi forward pass inside the model and emits the
//! back-pointer history together with the best last tag of every sequence. Decoding only has
//! to follow the back-pointers.

use crate::common::error::LTPError;
use num_traits::PrimInt;

/// Back-tracks the CRF best paths of the semantic role labelling head.
///
/// Every word of every sentence is scored as a predicate, so a sentence of `n` words
/// contributes `n` sequences of length `n`. Sequences are numbered consecutively across the
/// batch (sentence-major, predicate-minor).
///
/// # Arguments
///
/// * `history` - back-pointers, laid out `[max_len - 1, total_sequences, labels_num]`. Shorter
///   sequences are aligned to the end of the time axis.
/// * `last_tags` - best final tag of each sequence, `[total_sequences]`
/// * `stn_lengths` - number of words of each sentence
/// * `labels_num` - size of the tag set
///
/// # Returns
///
/// * `Vec<Vec<T>>` one tag path per sequence, in sequence order
pub fn viterbi_decode_postprocess<T>(
    history: &[T],
    last_tags: &[T],
    stn_lengths: &[usize],
    labels_num: usize,
) -> Result<Vec<Vec<T>>, LTPError>
where
    T: PrimInt,
{
    let total_sequences: usize = stn_lengths.iter().sum();
    let max_stn_len = stn_lengths.iter().copied().max().unwrap_or(0);
    if total_sequences == 0 {
        return Ok(Vec::new());
    }

    if last_tags.len() < total_sequences {
        return Err(LTPError::ModelOutputError(format!(
            "expected {} CRF last tags, got {}",
            total_sequences,
            last_tags.len()
        )));
    }
    let step_bias = total_sequences * labels_num;
    let expected_history = (max_stn_len - 1) * step_bias;
    if history.len() < expected_history {
        return Err(LTPError::ModelOutputError(format!(
            "expected {} CRF history entries, got {}",
            expected_history,
            history.len()
        )));
    }

    let to_index = |tag: T| -> Result<usize, LTPError> {
        tag.to_usize()
            .filter(|&index| index < labels_num)
            .ok_or_else(|| LTPError::ModelOutputError("CRF tag out of range".to_string()))
    };

    let mut result: Vec<Vec<T>> = Vec::with_capacity(total_sequences);
    let mut sequence_idx = 0;
    for &stn_len in stn_lengths {
        let path_bias = max_stn_len - stn_len;
        for _predicate in 0..stn_len {
            let mut best_tags = Vec::with_capacity(stn_len);
            best_tags.push(last_tags[sequence_idx]);
            // the last step has been used
            for step in 1..stn_len {
                let time = stn_len - 1 - step + path_bias;
                let forward_best = *best_tags.last().unwrap_or(&last_tags[sequence_idx]);
                let index =
                    time * step_bias + sequence_idx * labels_num + to_index(forward_best)?;
                best_tags.push(history[index]);
            }
            best_tags.reverse();
            result.push(best_tags);
            sequence_idx += 1;
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_back_pointers() -> anyhow::Result<()> {
        // one sentence of 3 words, 2 labels: 3 sequences, history [2, 3, 2]
        let labels_num = 2;
        let mut history = vec![0i64; 2 * 3 * labels_num];
        // sequence 1: best last tag 1, at t=1 tag 1 comes from 0, at t=0 tag 0 comes from 1
        history[1 * 3 * labels_num + 1 * labels_num + 1] = 0;
        history[0 * 3 * labels_num + 1 * labels_num + 0] = 1;
        // sequence 2: always comes from 1
        for t in 0..2 {
            for tag in 0..labels_num {
                history[t * 3 * labels_num + 2 * labels_num + tag] = 1;
            }
        }
        let last_tags = vec![0i64, 1, 1];

        let paths = viterbi_decode_postprocess(&history, &last_tags, &[3], labels_num)?;

        assert_eq!(paths, vec![vec![0, 0, 0], vec![1, 0, 1], vec![1, 1, 1]]);
        Ok(())
    }

    #[test]
    fn batch_shapes() -> anyhow::Result<()> {
        let labels_num = 3;
        let lengths = [3usize, 1, 2];
        let total: usize = lengths.iter().sum();
        let history = vec![2i64; 2 * total * labels_num];
        let last_tags = vec![2i64; total];

        let paths = viterbi_decode_postprocess(&history, &last_tags, &lengths, labels_num)?;

        let path_lengths = paths.iter().map(|p| p.len()).collect::<Vec<_>>();
        assert_eq!(path_lengths, vec![3, 3, 3, 1, 2, 2]);
        assert!(paths.iter().flatten().all(|&tag| tag == 2));
        Ok(())
    }

    #[test]
    fn empty_and_invalid_inputs() {
        let paths = viterbi_decode_postprocess::<i64>(&[], &[], &[0, 0], 4).unwrap();
        assert!(paths.is_empty());

        assert!(viterbi_decode_postprocess::<i64>(&[0; 4], &[0], &[2], 2).is_err());
        assert!(viterbi_decode_postprocess::<i64>(&[0; 8], &[5, 0], &[2], 2).is_err());
    }
}

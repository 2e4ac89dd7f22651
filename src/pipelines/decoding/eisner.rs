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

//! # Eisner decoding of projective dependency trees
//! First-order projective maximum spanning tree search over arc scores, restricted to trees where
//! the virtual root (node 0) has exactly one child.
//!
//! The chart is stored per sentence as two `len x len` blocks (incomplete and complete spans).
//! Cell `[i * len + j]` holds the span between `i` and `j` headed by `i`, so left-headed and
//! right-headed spans live in the two triangles of the same block.

use crate::common::error::LTPError;
use num_traits::Float;
use std::cmp::{max, min};

struct BackPointers<'a> {
    incomplete: &'a [usize],
    complete: &'a [usize],
    stride: usize,
}

impl BackPointers<'_> {
    fn backtrack(&self, i: usize, j: usize, complete: bool, head: &mut [usize], remove_root: usize) {
        if i == j {
            return;
        }
        if complete {
            let r = self.complete[i * self.stride + j];
            self.backtrack(i, r, false, head, remove_root);
            self.backtrack(r, j, true, head, remove_root);
        } else {
            let r = self.incomplete[i * self.stride + j];
            head[j - remove_root] = i;
            self.backtrack(min(i, j), r, true, head, remove_root);
            self.backtrack(max(i, j), r + 1, true, head, remove_root);
        }
    }
}

/// Decodes the highest scoring projective tree of each sentence of a batch.
///
/// # Arguments
///
/// * `scores` - arc scores laid out `[batch, max_len, max_len]` where `scores[b, d, h]` is the
///   score of node `h` heading node `d`; `max_len` is the largest value of `stn_lengths`
/// * `stn_lengths` - number of nodes of each sentence, virtual root included
/// * `remove_root` - if `true`, the head of the root node is not returned
///
/// # Returns
///
/// * `Vec<Vec<usize>>` head of every node of every sentence (`len - 1` heads per sentence when
///   `remove_root` is set)
///
/// # Example
///
/// ```
/// # fn main() -> anyhow::Result<()> {
/// use ltp::pipelines::decoding::eisner;
///
/// // root + 2 words, word 2 prefers word 1 as head, word 1 prefers the root
/// let scores = [
///     0.0, 0.0, 0.0, //
///     5.0, 0.0, 1.0, //
///     1.0, 5.0, 0.0f32,
/// ];
/// let heads = eisner(&scores, &[3], true)?;
/// assert_eq!(heads, vec![vec![0, 1]]);
/// # Ok(())
/// # }
/// ```
pub fn eisner<T>(
    scores: &[T],
    stn_lengths: &[usize],
    remove_root: bool,
) -> Result<Vec<Vec<usize>>, LTPError>
where
    T: Float,
{
    let batch = stn_lengths.len();
    let max_stn_len = stn_lengths.iter().copied().max().unwrap_or(0);
    let score_block_size = max_stn_len * max_stn_len;
    if scores.len() < batch * score_block_size {
        return Err(LTPError::ModelOutputError(format!(
            "expected {} arc scores for {} sentences of at most {} nodes, got {}",
            batch * score_block_size,
            batch,
            max_stn_len,
            scores.len()
        )));
    }
    if stn_lengths.iter().any(|&length| length == 0) {
        return Err(LTPError::ValueError(
            "sentence lengths must count the root node".to_string(),
        ));
    }

    let remove_root = remove_root as usize;

    let mut bs_i = vec![T::neg_infinity(); score_block_size];
    let mut bs_c = vec![T::neg_infinity(); score_block_size];
    let mut bp_i = vec![0usize; score_block_size];
    let mut bp_c = vec![0usize; score_block_size];

    let mut res = Vec::with_capacity(batch);
    for (b, &len) in stn_lengths.iter().enumerate() {
        bs_i.fill(T::neg_infinity());
        bs_c.fill(T::neg_infinity());
        bp_i.fill(0);
        bp_c.fill(0);

        let bscore_bias = b * score_block_size;
        let score = |dep: usize, head: usize| scores[bscore_bias + dep * max_stn_len + head];

        for k in 0..len {
            bs_i[k * len + k] = T::zero();
            bs_c[k * len + k] = T::zero();
        }

        for w in 1..len {
            let n = len - w;
            // I(j->i) = max(C(i->r) + C(j->r+1) + s(j->i)), i <= r < j
            for i in 0..n {
                let j = i + w;
                let mut max_score = T::neg_infinity();
                let mut max_index = i;
                for r in i..j {
                    let s = bs_c[i * len + r] + bs_c[j * len + r + 1] + score(i, j);
                    if s > max_score {
                        max_score = s;
                        max_index = r;
                    }
                }
                bs_i[j * len + i] = max_score;
                bp_i[j * len + i] = max_index;
            }
            // I(i->j) = max(C(i->r) + C(j->r+1) + s(i->j)), i <= r < j
            for i in 0..n {
                let j = i + w;
                let mut max_score = T::neg_infinity();
                let mut max_index = i;
                for r in i..j {
                    let s = bs_c[i * len + r] + bs_c[j * len + r + 1] + score(j, i);
                    if s > max_score {
                        max_score = s;
                        max_index = r;
                    }
                }
                bs_i[i * len + j] = max_score;
                bp_i[i * len + j] = max_index;
            }
            // C(j->i) = max(C(r->i) + I(j->r)), i <= r < j
            for i in 0..n {
                let j = i + w;
                let mut max_score = T::neg_infinity();
                let mut max_index = i;
                for r in i..j {
                    let s = bs_c[r * len + i] + bs_i[j * len + r];
                    if s > max_score {
                        max_score = s;
                        max_index = r;
                    }
                }
                bs_c[j * len + i] = max_score;
                bp_c[j * len + i] = max_index;
            }
            // C(i->j) = max(I(i->r) + C(r->j)), i < r <= j
            for i in 0..n {
                let j = i + w;
                let mut max_score = T::neg_infinity();
                let mut max_index = i + 1;
                for r in i + 1..=j {
                    let s = bs_i[i * len + r] + bs_c[r * len + j];
                    if s > max_score {
                        max_score = s;
                        max_index = r;
                    }
                }
                bs_c[i * len + j] = max_score;
                bp_c[i * len + j] = max_index;
            }
            // a complete span headed by the root may only be closed over the whole sentence
            if w != len - 1 {
                bs_c[w] = T::neg_infinity();
            }
        }

        let back_pointers = BackPointers {
            incomplete: &bp_i,
            complete: &bp_c,
            stride: len,
        };
        let mut b_head = vec![0usize; len - remove_root];
        back_pointers.backtrack(0, len - 1, true, &mut b_head, remove_root);
        res.push(b_head);
    }
    Ok(res)
}

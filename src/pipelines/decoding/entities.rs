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

//! # Chunk extraction from BIO / BIOES tag sequences
//! Used for word segmentation (tags `B-W`, `I-W`...), for named entities and for the arguments of
//! each semantic role labelling predicate.

fn is_outside(tag: &str) -> bool {
    tag == "O" || tag == "."
}

fn start_of_chunk(prev_tag: &str, tag: &str, prev_type: &str, type_: &str) -> bool {
    match (prev_tag, tag) {
        (_, "B") | (_, "S") => true,
        ("E", "E") | ("E", "I") | ("S", "E") | ("S", "I") | ("O", "E") | ("O", "I") => true,
        _ => !is_outside(tag) && prev_type != type_,
    }
}

fn end_of_chunk(prev_tag: &str, tag: &str, prev_type: &str, type_: &str) -> bool {
    match (prev_tag, tag) {
        ("E", _) | ("S", _) => true,
        ("B", "B") | ("B", "S") | ("B", "O") | ("I", "B") | ("I", "S") | ("I", "O") => true,
        _ => !is_outside(prev_tag) && prev_type != type_,
    }
}

fn split_tag(chunk: &str) -> (&str, &str) {
    match chunk.find('-') {
        None => (chunk, "_"),
        Some(cut) => (&chunk[..cut], &chunk[cut + 1..]),
    }
}

/// Extracts the chunks of a tag sequence.
///
/// # Arguments
///
/// * `tags` - sequence of tags of the form `B-TYPE`, `I-TYPE`, `E-TYPE`, `S-TYPE` or `O`. Tags
///   without a type (e.g. `B`) get the placeholder type `_`.
///
/// # Returns
///
/// * `Vec<(&str, usize, usize)>` chunks as (type, first index, last index), last index inclusive
///
/// # Example
///
/// ```
/// use ltp::pipelines::decoding::get_entities;
///
/// let chunks = get_entities(&["B-PER", "I-PER", "O", "B-LOC"]);
/// assert_eq!(chunks, vec![("PER", 0, 1), ("LOC", 3, 3)]);
/// ```
pub fn get_entities<'a, S>(tags: &'a [S]) -> Vec<(&'a str, usize, usize)>
where
    S: AsRef<str>,
{
    let mut prev_tag = "O";
    let mut prev_type = "_";
    let mut begin_offset: usize = 0;
    let mut chunks: Vec<(&str, usize, usize)> = Vec::new();

    // a trailing "O" closes the last chunk
    let sequence = tags.iter().map(AsRef::as_ref).chain(std::iter::once("O"));
    for (i, chunk) in sequence.enumerate() {
        let (tag, type_) = split_tag(chunk);
        if end_of_chunk(prev_tag, tag, prev_type, type_) {
            chunks.push((prev_type, begin_offset, i - 1));
        }
        if start_of_chunk(prev_tag, tag, prev_type, type_) {
            begin_offset = i;
        }
        prev_tag = tag;
        prev_type = type_;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_entities() {
        let example = vec!["B-PER", "I-PER", "O", "B-LOC"];
        let result = get_entities(&example);
        assert_eq!(result, vec![("PER", 0, 1), ("LOC", 3, 3)]);
    }

    #[test]
    fn bioes_chunks() {
        let example = ["S-Nh", "B-Ns", "I-Ns", "E-Ns", "O", "S-Ni"];
        let result = get_entities(&example);
        assert_eq!(result, vec![("Nh", 0, 0), ("Ns", 1, 3), ("Ni", 5, 5)]);
    }

    #[test]
    fn untyped_segmentation_tags() {
        let example = ["B-W", "I-W", "B-W", "B-W", "I-W", "I-W"];
        let result = get_entities(&example);
        assert_eq!(result, vec![("W", 0, 1), ("W", 2, 2), ("W", 3, 5)]);

        let example = ["B", "I", "B"];
        let result = get_entities(&example);
        assert_eq!(result, vec![("_", 0, 1), ("_", 2, 2)]);
    }

    #[test]
    fn type_change_splits_chunks() {
        let example = ["B-A0", "I-A0", "I-A1", "O"];
        let result = get_entities(&example);
        assert_eq!(result, vec![("A0", 0, 1), ("A1", 2, 2)]);
    }

    #[test]
    fn empty_and_outside_sequences() {
        let empty: [&str; 0] = [];
        assert!(get_entities(&empty).is_empty());
        assert!(get_entities(&["O", "O", "."]).is_empty());
    }
}

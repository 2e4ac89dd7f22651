#![allow(dead_code)]

use ltp::pipelines::onnx::{GraphOutput, ModelBackend, ModelInput, ModelOutput, SRLOutput};
use ltp::pipelines::tokenizer::LTPTokenizer;
use ltp::pipelines::vocabs::{Task, Vocab};
use ltp::{LTPError, LTPModel};
use ndarray::{Array2, Array3};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

pub const SENTENCES: [&str; 2] = ["他叫汤姆去拿外衣！", "我爱赛尔！"];

fn labels(labels: &[&str]) -> Option<Vec<String>> {
    Some(labels.iter().map(|label| label.to_string()).collect())
}

pub fn full_vocab() -> Vocab {
    Vocab {
        seg: labels(&["B-W", "I-W"]),
        pos: labels(&["n", "v", "wp"]),
        ner: labels(&["O", "S-Nh"]),
        srl: labels(&["O", "B-A0"]),
        dep: labels(&["HED", "SBV", "VOB"]),
        sdp: labels(&["Root", "Agt", "Pat"]),
    }
}

pub fn seg_only_vocab() -> Vocab {
    Vocab {
        seg: labels(&["B-W", "I-W"]),
        ..Default::default()
    }
}

pub fn vocab_file() -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    for token in ["[PAD]", "[UNK]", "[CLS]", "[SEP]", "[MASK]"] {
        writeln!(file, "{token}")?;
    }
    for character in "他叫汤姆去拿外衣！我爱赛尔同时".chars() {
        writeln!(file, "{character}")?;
    }
    Ok(file)
}

/// Deterministic stand-in for the multi-task model.
///
/// - segmentation groups tokens two by two
/// - the SRL path of predicate `p` in a sentence of `n` words tags word `(p + n - 1) % n` as
///   `B-A0`, every other word as `O`
/// - dependency heads form a left-branching chain: word `i` is headed by word `i - 1` and the
///   first word by the root
/// - semantic dependencies add a positive off-tree arc from word `i` to `i - 2`
/// - arc labels are 0 towards the root, 1 towards a word on the left and 2 towards a word on the
///   right
#[derive(Default)]
pub struct ChainBackend {
    pub calls: Calls,
}

const SRL_LABELS: usize = 2;

impl ChainBackend {
    fn content_lengths(input: &ModelInput) -> Vec<usize> {
        input
            .attention_mask
            .chunks(input.sequence_length.max(1))
            .map(|row| (row.iter().sum::<i64>() as usize).saturating_sub(2))
            .collect()
    }

    fn srl_tag(predicate: usize, position: usize, words: usize) -> i64 {
        ((predicate + words - 1) % words == position) as i64
    }

    /// CRF history `[max_words - 1, total_sequences, labels]` whose back-pointers ignore the
    /// following tag, sequences aligned to the end of the time axis.
    fn srl(word_counts: &[usize]) -> SRLOutput {
        let max_words = word_counts.iter().copied().max().unwrap_or(0);
        let total = word_counts.iter().sum::<usize>();
        let mut history = vec![0; max_words.saturating_sub(1) * total * SRL_LABELS];
        let mut last_tags = Vec::with_capacity(total);
        let mut sequence = 0;
        for &words in word_counts {
            let bias = max_words - words;
            for predicate in 0..words {
                last_tags.push(Self::srl_tag(predicate, words - 1, words));
                for time in bias..max_words - 1 {
                    let tag = Self::srl_tag(predicate, time - bias, words);
                    for label in 0..SRL_LABELS {
                        history[(time * total + sequence) * SRL_LABELS + label] = tag;
                    }
                }
                sequence += 1;
            }
        }
        SRLOutput { history, last_tags }
    }

    fn arc_label(dep: usize, head: usize) -> i64 {
        match head {
            0 => 0,
            head if head < dep => 1,
            _ => 2,
        }
    }

    fn chain(batch: usize, nodes: usize, negative: f32) -> GraphOutput {
        let mut scores = Array3::from_elem((batch, nodes, nodes), negative);
        let labels = Array3::from_shape_fn((batch, nodes, nodes), |(_, dep, head)| {
            Self::arc_label(dep, head)
        });
        for b in 0..batch {
            for dep in 1..nodes {
                scores[[b, dep, dep - 1]] = 10.0;
            }
        }
        GraphOutput { scores, labels }
    }

    fn semantic_graph(batch: usize, nodes: usize) -> GraphOutput {
        let mut graph = Self::chain(batch, nodes, -1.0);
        for b in 0..batch {
            for dep in 2..nodes {
                graph.scores[[b, dep, dep - 2]] = 1.0;
            }
        }
        graph
    }
}

impl ModelBackend for ChainBackend {
    fn forward(&mut self, input: &ModelInput, tasks: &[Task]) -> Result<ModelOutput, LTPError> {
        self.calls.borrow_mut().push(input.batch_size);
        let batch = input.batch_size;
        let lengths = Self::content_lengths(input);
        let max_tokens = lengths.iter().copied().max().unwrap_or(0);
        let word_counts = lengths.iter().map(|length| (length + 1) / 2).collect::<Vec<_>>();
        let max_words = word_counts.iter().copied().max().unwrap_or(0);

        let seg = Array2::from_shape_fn((batch, max_tokens), |(_, token)| (token % 2) as i64);
        let pos = Array2::from_shape_fn((batch, max_words), |(_, word)| (word % 3) as i64);
        let ner = Array2::zeros((batch, max_words));

        Ok(ModelOutput {
            seg,
            pos: tasks.contains(&Task::Pos).then_some(pos),
            ner: tasks.contains(&Task::Ner).then_some(ner),
            srl: tasks.contains(&Task::Srl).then(|| Self::srl(&word_counts)),
            dep: tasks
                .contains(&Task::Dep)
                .then(|| Self::chain(batch, max_words + 1, 0.0)),
            sdp: tasks
                .contains(&Task::Sdp)
                .then(|| Self::semantic_graph(batch, max_words + 1)),
        })
    }
}

pub type Calls = Rc<RefCell<Vec<usize>>>;

/// Pipeline over `ChainBackend`, with the batch sizes the backend received.
pub fn chain_model(
    vocab: Vocab,
    batch_size: usize,
) -> anyhow::Result<(LTPModel<ChainBackend>, Calls)> {
    let vocab_file = vocab_file()?;
    let tokenizer = LTPTokenizer::from_file(vocab_file.path())?;
    let backend = ChainBackend::default();
    let calls = backend.calls.clone();
    let model = LTPModel::new_with_backend(tokenizer, vocab, backend, batch_size, 512)?;
    Ok((model, calls))
}

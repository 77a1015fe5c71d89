// File: src/learning.rs
use crate::core::confusion::{in_visual_quartet, VISUAL_WEIGHT_STEP};
use crate::core::types::UserProfile;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpTag {
    Equal,
    Replace,
    Insert,
    Delete,
}

/// One span of an alignment, in character offsets: `source[src]` becomes `target[dst]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opcode {
    pub tag: OpTag,
    pub src: Range<usize>,
    pub dst: Range<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Step {
    Keep,
    Drop,
    Add,
}

/// Aligns `source` to `target` along a longest common subsequence and groups
/// the edit script into equal/replace/insert/delete spans. A run of edits
/// containing both drops and adds becomes a single `Replace`.
pub fn align(source: &str, target: &str) -> Vec<Opcode> {
    let a: Vec<char> = source.chars().collect();
    let b: Vec<char> = target.chars().collect();
    let (n, m) = (a.len(), b.len());

    // lcs[i][j] = LCS length of a[i..] and b[j..]
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut steps = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            steps.push(Step::Keep);
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            steps.push(Step::Drop);
            i += 1;
        } else {
            steps.push(Step::Add);
            j += 1;
        }
    }
    steps.extend(std::iter::repeat(Step::Drop).take(n - i));
    steps.extend(std::iter::repeat(Step::Add).take(m - j));

    group(&steps)
}

fn group(steps: &[Step]) -> Vec<Opcode> {
    let mut opcodes = Vec::new();
    let (mut i, mut j) = (0, 0);
    let mut k = 0;
    while k < steps.len() {
        let (i0, j0) = (i, j);
        if steps[k] == Step::Keep {
            while k < steps.len() && steps[k] == Step::Keep {
                i += 1;
                j += 1;
                k += 1;
            }
            opcodes.push(Opcode { tag: OpTag::Equal, src: i0..i, dst: j0..j });
            continue;
        }
        while k < steps.len() && steps[k] != Step::Keep {
            if steps[k] == Step::Drop {
                i += 1;
            } else {
                j += 1;
            }
            k += 1;
        }
        let tag = match (i > i0, j > j0) {
            (true, true) => OpTag::Replace,
            (true, false) => OpTag::Delete,
            _ => OpTag::Insert,
        };
        opcodes.push(Opcode { tag, src: i0..i, dst: j0..j });
    }
    opcodes
}

/// A correction the user accepted.
pub struct CorrectionEvent {
    pub misspelling: String,
    pub chosen: String,
}

pub struct LearningEngine {
    frequency_increment: u32,
}

impl Default for LearningEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LearningEngine {
    pub fn new() -> Self {
        Self { frequency_increment: 1 }
    }

    /// Folds an accepted correction into `profile` and returns the error
    /// patterns it recorded, e.g. `["b->d"]`.
    ///
    /// Every single-character replacement is counted. A swap inside the
    /// b/d/p/q quartet also raises `visual_substitution`, with no ceiling.
    pub fn learn(&self, profile: &mut UserProfile, correction: &CorrectionEvent) -> Vec<String> {
        *profile
            .accepted_words
            .entry(correction.chosen.clone())
            .or_insert(0) += self.frequency_increment;

        let typed: Vec<char> = correction.misspelling.chars().collect();
        let meant: Vec<char> = correction.chosen.chars().collect();
        let mut patterns = Vec::new();

        for op in align(&correction.misspelling, &correction.chosen) {
            if op.tag != OpTag::Replace || op.src.len() != 1 || op.dst.len() != 1 {
                continue;
            }
            let (from, to) = (typed[op.src.start], meant[op.dst.start]);
            let key = format!("{}->{}", from, to);
            *profile.error_counts.entry(key.clone()).or_insert(0) += 1;

            if in_visual_quartet(from) && in_visual_quartet(to) {
                profile.adaptive_weights.visual_substitution += VISUAL_WEIGHT_STEP;
            }
            patterns.push(key);
        }
        patterns
    }
}

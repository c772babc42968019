use crate::client::PageSource;
use crate::error::Result;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_TOP_N: usize = 7;
pub const DEFAULT_CATEGORY_THRESHOLD: f32 = 0.4;

/// Vocabulary the scorer consults. `relatedness` answers in [0, 1] and
/// returns `None` when the pair has no comparable basis (a word the oracle
/// does not know, or two words with no shared taxonomy). Neither case is an
/// error; such pairs are simply skipped.
pub trait LexicalOracle: Send + Sync {
    fn knows(&self, word: &str) -> bool;
    fn relatedness(&self, a: &str, b: &str) -> Option<f32>;
}

/// Break text into maximal alphabetic runs. Digits, punctuation and
/// whitespace all separate words; there is no empty word.
pub fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_alphabetic() {
            current.push(c);
        } else if !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Scores candidate page titles against a target word set using a
/// [`LexicalOracle`].
#[derive(Clone)]
pub struct Scorer {
    oracle: Arc<dyn LexicalOracle>,
    category_threshold: f32,
}

impl Scorer {
    pub fn new(oracle: Arc<dyn LexicalOracle>) -> Self {
        Self {
            oracle,
            category_threshold: DEFAULT_CATEGORY_THRESHOLD,
        }
    }

    pub fn with_category_threshold(mut self, threshold: f32) -> Self {
        self.category_threshold = threshold;
        self
    }

    /// Mean relatedness over all word pairs the oracle can compare. Pairs it
    /// cannot compare are left out of the average entirely, and a word set
    /// with no comparable pair at all scores 0.
    pub fn similarity(&self, a: &[String], b: &[String]) -> f32 {
        let mut sum = 0.0;
        let mut comparisons = 0u32;
        for w1 in a {
            if !self.oracle.knows(w1) {
                continue;
            }
            for w2 in b {
                if !self.oracle.knows(w2) {
                    continue;
                }
                if let Some(score) = self.oracle.relatedness(w1, w2) {
                    sum += score;
                    comparisons += 1;
                }
            }
        }
        if comparisons == 0 {
            0.0
        } else {
            sum / comparisons as f32
        }
    }

    /// Word set describing the search target, used to score every candidate
    /// link. Known words of the title form the base; category names either
    /// enrich that base (words scoring at least the category threshold
    /// against it) or replace it when no title word is known, keeping only
    /// capitalized known words and dropping the generic "articles".
    pub async fn target_words(
        &self,
        source: &dyn PageSource,
        title: &str,
    ) -> Result<Vec<String>> {
        let title_words: Vec<String> = split_words(title)
            .into_iter()
            .filter(|w| self.oracle.knows(w))
            .collect();

        let categories = source.categories(title).await?;
        let category_words = categories
            .iter()
            .map(|c| c.strip_prefix("Category:").unwrap_or(c))
            .flat_map(split_words);

        let mut target = title_words.clone();
        if title_words.is_empty() {
            for word in category_words {
                let capitalized = word.chars().next().is_some_and(|c| c.is_uppercase());
                if capitalized
                    && !word.eq_ignore_ascii_case("articles")
                    && self.oracle.knows(&word)
                {
                    target.push(word);
                }
            }
        } else {
            for word in category_words {
                if self.similarity(std::slice::from_ref(&word), &title_words)
                    >= self.category_threshold
                {
                    target.push(word);
                }
            }
        }

        target.sort();
        target.dedup();
        debug!("Target words for {:?}: {:?}", title, target);
        Ok(target)
    }

    /// Score each candidate title against the target words, keep the `top_n`
    /// best, and return them ordered worst to best.
    pub fn rank_and_select(
        &self,
        candidates: Vec<String>,
        target: &[String],
        top_n: usize,
    ) -> Vec<(String, f32)> {
        let mut scored: Vec<(String, f32)> = candidates
            .into_iter()
            .map(|title| {
                let score = self.similarity(&split_words(&title), target);
                (title, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(top_n);
        scored.reverse();
        scored
    }
}

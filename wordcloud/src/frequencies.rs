//! Word counting for the cloud: case variants and simple plurals are merged.

use crate::stopwords::StopWords;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq)]
pub struct WordFrequency {
    pub word: String,
    pub count: usize,
    /// `count` relative to the most frequent word, in (0, 1].
    pub weight: f64,
}

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\w[\w']+").expect("token pattern is valid"))
}

/// Counts per lowercased word, remembering every surface form in first-seen order.
#[derive(Default)]
struct CaseCounts {
    order: Vec<String>,
    variants: HashMap<String, Vec<(String, usize)>>,
}

impl CaseCounts {
    fn add(&mut self, lower: String, variant: &str, count: usize) {
        let forms = self.variants.entry(lower.clone()).or_insert_with(|| {
            self.order.push(lower);
            Vec::new()
        });
        match forms.iter_mut().find(|(form, _)| form == variant) {
            Some((_, n)) => *n += count,
            None => forms.push((variant.to_string(), count)),
        }
    }

    /// Folds `cats` into `cat` when both were seen.
    fn merge_plurals(&mut self) {
        for key in self.order.clone() {
            if !key.ends_with('s') || key.ends_with("ss") {
                continue;
            }
            let singular = &key[..key.len() - 1];
            if !self.variants.contains_key(singular) {
                continue;
            }
            let Some(plural_forms) = self.variants.remove(&key) else {
                continue;
            };
            let singular = singular.to_string();
            for (form, count) in plural_forms {
                self.add(singular.clone(), drop_last_char(&form), count);
            }
        }
        self.order.retain(|key| self.variants.contains_key(key));
    }

    /// Most common surface form per word with the summed count, in first-seen order.
    fn fuse(self) -> Vec<(String, usize)> {
        let mut variants = self.variants;
        self.order
            .into_iter()
            .filter_map(|key| variants.remove(&key))
            .map(|forms| {
                let total: usize = forms.iter().map(|(_, n)| n).sum();
                let mut best = &forms[0];
                for form in &forms[1..] {
                    if form.1 > best.1 {
                        best = form;
                    }
                }
                (best.0.clone(), total)
            })
            .collect()
    }
}

fn drop_last_char(word: &str) -> &str {
    match word.char_indices().last() {
        Some((index, _)) => &word[..index],
        None => word,
    }
}

/// The `max_words` most frequent words of `text`, most frequent first.
pub fn word_frequencies(text: &str, stop_words: &StopWords, max_words: usize) -> Vec<WordFrequency> {
    let mut counts = CaseCounts::default();

    for token in token_regex().find_iter(text).map(|m| m.as_str()) {
        if stop_words.contains_ignore_case(token) {
            continue;
        }
        let mut lower = token.to_lowercase();
        let mut word = token;
        if lower.ends_with("'s") {
            lower.truncate(lower.len() - 2);
            word = &token[..token.len() - 2];
        }
        if word.chars().all(char::is_numeric) {
            continue;
        }
        counts.add(lower, word, 1);
    }

    counts.merge_plurals();
    let mut fused = counts.fuse();
    // stable: ties keep first-seen order
    fused.sort_by(|a, b| b.1.cmp(&a.1));
    fused.truncate(max_words);

    let Some(max_count) = fused.first().map(|(_, n)| *n as f64) else {
        return Vec::new();
    };
    fused
        .into_iter()
        .map(|(word, count)| WordFrequency {
            word,
            count,
            weight: count as f64 / max_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop() -> StopWords {
        StopWords::english_with(&["just"])
    }

    fn pairs(freqs: &[WordFrequency]) -> Vec<(&str, usize)> {
        freqs.iter().map(|f| (f.word.as_str(), f.count)).collect()
    }

    #[test]
    fn test_basic_counts_and_weights() {
        let freqs = word_frequencies("dog cat cat", &stop(), 200);
        assert_eq!(pairs(&freqs), vec![("cat", 2), ("dog", 1)]);
        assert_eq!(freqs[0].weight, 1.0);
        assert_eq!(freqs[1].weight, 0.5);
    }

    #[test]
    fn test_stop_words_ignore_case_and_short_tokens_dropped() {
        let freqs = word_frequencies("The THE Just x y dog", &stop(), 200);
        assert_eq!(pairs(&freqs), vec![("dog", 1)]);
    }

    #[test]
    fn test_possessive_and_numbers() {
        let freqs = word_frequencies("mom's mom 2021 42 b2b", &stop(), 200);
        assert_eq!(pairs(&freqs), vec![("mom", 2), ("b2b", 1)]);
    }

    #[test]
    fn test_case_variants_merge_to_most_common() {
        let freqs = word_frequencies("Wedding wedding Wedding", &stop(), 200);
        assert_eq!(pairs(&freqs), vec![("Wedding", 3)]);
    }

    #[test]
    fn test_plurals_merge_into_singular() {
        let freqs = word_frequencies("cats cat dogs boss bos glass", &stop(), 200);
        assert_eq!(
            pairs(&freqs),
            vec![("cat", 2), ("dogs", 1), ("boss", 1), ("bos", 1), ("glass", 1)]
        );
    }

    #[test]
    fn test_max_words_and_empty() {
        let freqs = word_frequencies("aa bb bb cc cc cc", &stop(), 2);
        assert_eq!(pairs(&freqs), vec![("cc", 3), ("bb", 2)]);
        assert!(word_frequencies("the a of", &stop(), 200).is_empty());
    }
}

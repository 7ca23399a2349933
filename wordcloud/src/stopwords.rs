use std::collections::HashSet;

/// English stop words removed before accumulation.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can't", "cannot", "could", "couldn't", "did", "didn't", "do", "does", "doesn't",
    "doing", "don't", "down", "during", "each", "few", "for", "from", "further", "had", "hadn't",
    "has", "hasn't", "have", "haven't", "having", "he", "he'd", "he'll", "he's", "her", "here",
    "here's", "hers", "herself", "him", "himself", "his", "how", "how's", "i", "i'd", "i'll",
    "i'm", "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself", "let's",
    "me", "more", "most", "mustn't", "my", "myself", "no", "nor", "not", "of", "off", "on",
    "once", "only", "or", "other", "ought", "our", "ours", "ourselves", "out", "over", "own",
    "same", "shan't", "she", "she'd", "she'll", "she's", "should", "shouldn't", "so", "some",
    "such", "than", "that", "that's", "the", "their", "theirs", "them", "themselves", "then",
    "there", "there's", "these", "they", "they'd", "they'll", "they're", "they've", "this",
    "those", "through", "to", "too", "under", "until", "up", "very", "was", "wasn't", "we",
    "we'd", "we'll", "we're", "we've", "were", "weren't", "what", "what's", "when", "when's",
    "where", "where's", "which", "while", "who", "who's", "whom", "why", "why's", "with",
    "won't", "would", "wouldn't", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
    "yourself", "yourselves",
];

#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// The English list plus `extra`.
    pub fn english_with<S: AsRef<str>>(extra: &[S]) -> Self {
        let words = ENGLISH_STOP_WORDS
            .iter()
            .map(|w| w.to_string())
            .chain(extra.iter().map(|w| w.as_ref().to_string()))
            .collect();
        Self { words }
    }

    /// Exact match, as used when filtering raw input files.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn contains_ignore_case(&self, word: &str) -> bool {
        self.words.contains(word) || self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whitespace-split `text` with stop words dropped, order kept.
    pub fn filter<'t>(&self, text: &'t str) -> Vec<&'t str> {
        text.split_whitespace()
            .filter(|word| !self.contains(word))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extras_are_added() {
        let stop = StopWords::english_with(&["just", "know"]);
        assert!(stop.contains("the"));
        assert!(stop.contains("know"));
        assert!(!stop.contains("dog"));
        assert_eq!(stop.len(), ENGLISH_STOP_WORDS.len() + 2);
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let stop = StopWords::english_with::<&str>(&[]);
        assert_eq!(stop.filter("The the dog\n  sat"), vec!["The", "dog", "sat"]);
        assert!(stop.contains_ignore_case("The"));
    }
}

use crate::lemmatizer::lemmatize;
use crate::stopwords::remove_stop_words;
use regex::Regex;
use std::sync::OnceLock;
use verdict_core::ModelError;

pub const URL_PLACEHOLDER: &str = "urlplaceholder";

const URL_PATTERN: &str =
    r"http[s]?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\(\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+";

const WORD_PATTERN: &str = r"\w+(?:'\w+)?";

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(URL_PATTERN).expect("URL pattern is valid"))
}

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(WORD_PATTERN).expect("word pattern is valid"))
}

/// Turns raw post text into the token sequence the vectorizer counts.
///
/// URLs become [`URL_PLACEHOLDER`]; tokens are lowercased, stop words are
/// dropped, and the rest lemmatized. Stop words are filtered again after
/// lemmatization so that normalizing the output changes nothing.
pub fn normalize(text: &str) -> Result<Vec<String>, ModelError> {
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let text = url_regex().replace_all(text, URL_PLACEHOLDER);
    let tokens: Vec<String> = word_regex()
        .find_iter(&text)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    let lemmas: Vec<String> = remove_stop_words(&tokens)?
        .iter()
        .map(|token| lemmatize(token))
        .collect();
    remove_stop_words(&lemmas)
}

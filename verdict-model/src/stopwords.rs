use aprender::text::stopwords::StopWordsFilter;
use std::sync::OnceLock;
use verdict_core::ModelError;

fn english() -> &'static StopWordsFilter {
    static FILTER: OnceLock<StopWordsFilter> = OnceLock::new();
    FILTER.get_or_init(StopWordsFilter::english)
}

/// Drops English stop words from lowercase `tokens`, keeping order.
pub fn remove_stop_words(tokens: &[String]) -> Result<Vec<String>, ModelError> {
    english()
        .filter(tokens)
        .map_err(|e| ModelError::Preprocessing {
            reason: format!("stop word filter: {}", e),
        })
}

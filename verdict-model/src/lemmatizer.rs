//! Rule-based noun lemmatizer.
//!
//! Covers the common English plural forms: an irregular table first, then
//! suffix rules. Every output is a fixed point, so lemmatizing a lemma
//! returns it unchanged.

const IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("men", "man"),
    ("women", "woman"),
    ("wolves", "wolf"),
    ("knives", "knife"),
    ("wives", "wife"),
    ("lives", "life"),
    ("leaves", "leaf"),
    // -ie nouns, which the -ies rule would turn into -y
    ("movies", "movie"),
    ("cookies", "cookie"),
    ("rookies", "rookie"),
    ("hippies", "hippie"),
    ("selfies", "selfie"),
    ("zombies", "zombie"),
    ("calories", "calorie"),
    ("brownies", "brownie"),
    ("hoodies", "hoodie"),
    ("smoothies", "smoothie"),
    ("aunties", "auntie"),
    ("besties", "bestie"),
    ("newbies", "newbie"),
    ("goalies", "goalie"),
    ("genies", "genie"),
    ("prairies", "prairie"),
    ("species", "species"),
    ("series", "series"),
];

/// Endings that look plural but are not.
const PROTECTED_ENDINGS: [&str; 3] = ["ss", "us", "is"];

const ES_ENDINGS: [&str; 5] = ["sses", "ches", "shes", "xes", "zes"];

fn irregular(word: &str) -> Option<&'static str> {
    IRREGULAR
        .iter()
        .find(|(plural, _)| *plural == word)
        .map(|(_, singular)| *singular)
}

fn strip_plural(word: &str) -> Option<String> {
    if word.chars().count() <= 3 || !word.chars().all(|c| c.is_alphabetic()) {
        return None;
    }
    if PROTECTED_ENDINGS.iter().any(|e| word.ends_with(e)) {
        return None;
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if word.chars().count() > 4 {
            return Some(format!("{}y", stem));
        }
    }
    if ES_ENDINGS.iter().any(|e| word.ends_with(e)) {
        return word.strip_suffix("es").map(str::to_string);
    }
    word.strip_suffix('s').map(str::to_string)
}

/// Lemmatizes a lowercase token.
pub fn lemmatize(word: &str) -> String {
    if let Some(singular) = irregular(word) {
        return singular.to_string();
    }
    match strip_plural(word) {
        Some(stem) => irregular(&stem).map(str::to_string).unwrap_or(stem),
        None => word.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_plurals() {
        assert_eq!(lemmatize("cats"), "cat");
        assert_eq!(lemmatize("parties"), "party");
        assert_eq!(lemmatize("classes"), "class");
        assert_eq!(lemmatize("watches"), "watch");
        assert_eq!(lemmatize("boxes"), "box");
        assert_eq!(lemmatize("wishes"), "wish");
    }

    #[test]
    fn test_irregular_plurals() {
        assert_eq!(lemmatize("children"), "child");
        assert_eq!(lemmatize("wives"), "wife");
        assert_eq!(lemmatize("feet"), "foot");
    }

    #[test]
    fn test_ie_nouns_keep_their_ending() {
        assert_eq!(lemmatize("movies"), "movie");
        assert_eq!(lemmatize("cookies"), "cookie");
        assert_eq!(lemmatize("selfies"), "selfie");
        assert_eq!(lemmatize("series"), "series");
        assert_eq!(lemmatize("movie"), "movie");
        // the -ies rule still applies elsewhere
        assert_eq!(lemmatize("babies"), "baby");
    }

    #[test]
    fn test_words_left_alone() {
        for word in ["boss", "bus", "thesis", "was", "pies", "1990s", "don't", "dog"] {
            let expected = if word == "pies" { "pie" } else { word };
            assert_eq!(lemmatize(word), expected, "{}", word);
        }
    }

    #[test]
    fn test_outputs_are_fixed_points() {
        let words = [
            "cats", "parties", "classes", "watches", "children", "childrens", "wolves", "gases",
            "quizzes", "series", "buses", "leaves", "caches", "grass", "movies", "cookies",
        ];
        for word in words {
            let once = lemmatize(word);
            assert_eq!(lemmatize(&once), once, "{} -> {}", word, once);
        }
    }
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Column order of the tabular post file.
pub const POST_COLUMNS: [&str; 11] = [
    "title",
    "id",
    "score",
    "upvote_ratio",
    "url",
    "num_comments",
    "body",
    "created",
    "edited",
    "verdict",
    "over_18",
];

/// One flattened forum post, one row of the tabular post file.
///
/// Field order is the column order; `csv` serializes structs positionally
/// under a header derived from the field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub title: String,
    pub id: String,
    pub score: i64,
    pub upvote_ratio: f64,
    pub url: String,
    pub num_comments: u64,
    pub body: String,
    #[serde(with = "created_format")]
    pub created: NaiveDateTime,
    pub edited: bool,
    pub verdict: Option<String>,
    pub over_18: bool,
}

/// A (body, verdict) pair that survived dataset filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub body: String,
    pub verdict: String,
}

mod created_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

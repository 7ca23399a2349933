//! Loading (body, verdict) training pairs from the scraped post table.

use std::path::Path;
use tracing::{debug, info};
use verdict_core::{CoreError, DataError, TrainingExample};

/// Bodies that carry no text of the original post.
pub const INVALID_BODIES: [&str; 2] = ["[deleted]", "[removed]"];

/// Flair values that are not verdicts.
pub const EXCLUDED_VERDICTS: [&str; 7] = [
    "TL;DR",
    "UPDATE",
    "Talk ENDED",
    "Open Forum",
    "Mods Needed!",
    "META",
    "Not enough info",
];

/// Parallel feature and label sequences, index-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub bodies: Vec<String>,
    pub verdicts: Vec<String>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn examples(&self) -> impl Iterator<Item = TrainingExample> + '_ {
        self.bodies
            .iter()
            .zip(&self.verdicts)
            .map(|(body, verdict)| TrainingExample {
                body: body.clone(),
                verdict: verdict.clone(),
            })
    }
}

impl FromIterator<TrainingExample> for Dataset {
    fn from_iter<I: IntoIterator<Item = TrainingExample>>(iter: I) -> Self {
        let mut dataset = Dataset::default();
        for example in iter {
            dataset.bodies.push(example.body);
            dataset.verdicts.push(example.verdict);
        }
        dataset
    }
}

/// Whether a raw (body, verdict) row is usable for training.
pub fn is_valid_row(body: &str, verdict: Option<&str>) -> bool {
    if body.trim().is_empty() || INVALID_BODIES.contains(&body) {
        return false;
    }
    match verdict {
        Some(v) if !v.trim().is_empty() => !EXCLUDED_VERDICTS.contains(&v),
        _ => false,
    }
}

/// Reads the post table at `path` and keeps the rows fit for training.
pub fn load_dataset(path: &Path) -> Result<Dataset, CoreError> {
    let source = path.display().to_string();
    if !path.exists() {
        return Err(DataError::SourceMissing { path: source }.into());
    }

    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DataError::MissingColumn {
                column: name.to_string(),
                path: source.clone(),
            })
    };
    let body_idx = column("body")?;
    let verdict_idx = column("verdict")?;

    let mut dataset = Dataset::default();
    let mut total = 0usize;
    for row in reader.records() {
        let row = row?;
        total += 1;

        let body = row.get(body_idx).unwrap_or_default();
        let verdict = row.get(verdict_idx);
        if !is_valid_row(body, verdict) {
            continue;
        }
        dataset.bodies.push(body.to_string());
        dataset.verdicts.push(verdict.unwrap_or_default().to_string());
    }

    debug!("Kept {} of {} rows from {}", dataset.len(), total, source);
    if dataset.is_empty() {
        return Err(DataError::EmptyDataset { path: source }.into());
    }

    info!("Loaded {} training examples from {}", dataset.len(), source);
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("verdict-data-{}.csv", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_excluded_verdict_row_is_dropped() {
        let path = write_csv("title,body,verdict\nt1,I did a thing,META\nt2,I did another thing,NTA\n");
        let dataset = load_dataset(&path).unwrap();

        assert_eq!(dataset.bodies, vec!["I did another thing".to_string()]);
        assert_eq!(dataset.verdicts, vec!["NTA".to_string()]);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_invalid_bodies_and_missing_verdicts() {
        let path = write_csv(
            "body,verdict\n[deleted],NTA\n[removed],YTA\n,NTA\nkept,\nalso kept,YTA\n\"quoted, body\",ESH\n",
        );
        let dataset = load_dataset(&path).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.verdicts, vec!["YTA".to_string(), "ESH".to_string()]);
        assert_eq!(dataset.bodies[1], "quoted, body");
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_never_returns_excluded_verdicts() {
        let mut contents = String::from("body,verdict\n");
        for verdict in EXCLUDED_VERDICTS {
            contents.push_str(&format!("text,\"{}\"\n", verdict));
        }
        contents.push_str("text,NTA\n");
        let path = write_csv(&contents);

        let dataset = load_dataset(&path).unwrap();
        assert!(dataset
            .verdicts
            .iter()
            .all(|v| !EXCLUDED_VERDICTS.contains(&v.as_str())));
        assert_eq!(dataset.len(), 1);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_column() {
        let path = write_csv("title,body\nt,b\n");
        match load_dataset(&path) {
            Err(CoreError::Data(DataError::MissingColumn { column, .. })) => {
                assert_eq!(column, "verdict")
            }
            other => panic!("expected missing column, got {:?}", other),
        }
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join(format!("missing-{}.csv", uuid::Uuid::new_v4()));
        assert!(matches!(
            load_dataset(&path),
            Err(CoreError::Data(DataError::SourceMissing { .. }))
        ));
    }

    #[test]
    fn test_ragged_row_is_a_csv_error() {
        let path = write_csv("body,verdict\nsome text,NTA\nonly one field\n");
        assert!(matches!(
            load_dataset(&path),
            Err(CoreError::Data(DataError::Csv(_)))
        ));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_all_rows_filtered_is_empty_dataset() {
        let path = write_csv("body,verdict\n[deleted],NTA\n");
        assert!(matches!(
            load_dataset(&path),
            Err(CoreError::Data(DataError::EmptyDataset { .. }))
        ));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_dataset_from_examples() {
        let dataset: Dataset = vec![TrainingExample {
            body: "b".to_string(),
            verdict: "v".to_string(),
        }]
        .into_iter()
        .collect();
        assert_eq!(dataset.examples().count(), 1);
    }
}

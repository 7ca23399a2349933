use std::path::PathBuf;
use verdict_core::{TrainerConfig, POST_COLUMNS};
use verdict_model::train;

const NTA_WORDS: [&str; 6] = ["neighbour", "borrowed", "ladder", "refused", "return", "fence"];
const YTA_WORDS: [&str; 6] = ["yelled", "waiter", "restaurant", "insulted", "sister", "wedding"];

fn body(words: &[&str], i: usize) -> String {
    let a = words[i % words.len()];
    let b = words[(i / 2 + 1) % words.len()];
    let c = words[(i / 3 + 2) % words.len()];
    format!("So {} and then {} happened, also {}. Post number {}", a, b, c, i)
}

fn write_posts(path: &PathBuf) {
    let mut writer = csv::Writer::from_path(path).unwrap();
    writer.write_record(POST_COLUMNS).unwrap();

    for i in 0..100 {
        let (text, verdict) = if i % 2 == 0 {
            (body(&NTA_WORDS, i), "Not the A-hole")
        } else {
            (body(&YTA_WORDS, i), "Asshole")
        };
        let id = format!("p{}", i);
        let score = i.to_string();
        writer
            .write_record([
                "AITA?",
                id.as_str(),
                score.as_str(),
                "0.9",
                "https://example.com",
                "3",
                text.as_str(),
                "2021-05-01 10:00:00",
                "False",
                verdict,
                "False",
            ])
            .unwrap();
    }
    // rows the loader must drop
    writer
        .write_record(["x", "d1", "1", "0.5", "u", "0", "[deleted]", "2021-05-01 10:00:00", "False", "Asshole", "False"])
        .unwrap();
    writer
        .write_record(["x", "m1", "1", "0.5", "u", "0", "a real body", "2021-05-01 10:00:00", "False", "META", "False"])
        .unwrap();
    writer.flush().unwrap();
}

#[test]
fn test_train_end_to_end() {
    let dir = std::env::temp_dir().join(format!("verdict-e2e-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let dataset_path = dir.join("reddit_posts.csv");
    write_posts(&dataset_path);

    let config = TrainerConfig {
        dataset_path,
        model_path: dir.join("model.bin"),
        ..TrainerConfig::default()
    };

    let summary = train(&config).unwrap();

    assert_eq!(summary.train_size, 80);
    assert_eq!(summary.test_size, 20);

    let report = &summary.report;
    assert_eq!(report.classes.len(), 2);
    assert!(report.accuracy >= 0.0 && report.accuracy <= 1.0);
    assert_eq!(report.total_support(), 20);
    assert_eq!(report.macro_avg.support, 20);
    assert!(report
        .classes
        .iter()
        .all(|c| c.label == "Asshole" || c.label == "Not the A-hole"));

    assert!(summary.model_path.exists());
    assert!(std::fs::metadata(&summary.model_path).unwrap().len() > 0);

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn test_train_rejects_tiny_dataset() {
    let dir = std::env::temp_dir().join(format!("verdict-tiny-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let dataset_path = dir.join("posts.csv");
    std::fs::write(&dataset_path, "body,verdict\none,NTA\ntwo,YTA\nthree,NTA\nfour,YTA\n").unwrap();

    let config = TrainerConfig {
        dataset_path,
        model_path: dir.join("model.bin"),
        ..TrainerConfig::default()
    };

    // 4 rows -> 3 train rows, fewer than 5 folds
    let err = train(&config).unwrap_err();
    assert!(matches!(
        err,
        verdict_core::CoreError::Config(verdict_core::ConfigError::InsufficientSamples { .. })
    ));
    assert!(!config.model_path.exists());

    std::fs::remove_dir_all(dir).unwrap();
}

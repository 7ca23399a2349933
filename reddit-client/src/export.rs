use std::path::Path;
use tracing::info;
use verdict_core::{CoreError, PostRecord};

/// Writes `posts` to `path` as CSV, header first, replacing any existing file.
pub fn write_posts(path: &Path, posts: &[PostRecord]) -> Result<(), CoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for post in posts {
        writer.serialize(post)?;
    }
    writer.flush()?;

    info!("Wrote {} posts to {}", posts.len(), path.display());
    Ok(())
}

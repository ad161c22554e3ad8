//! Patient evidence archive download

use crate::api::Backend;
use crate::StationResult;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Where downloaded archives go: the user's download directory, else temp
pub fn download_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
        .unwrap_or_else(std::env::temp_dir)
}

/// Archive file name for a patient, safe for any filesystem
pub fn archive_name(cedula: &str) -> String {
    let safe: String = cedula
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("{}_evidence.zip", safe)
}

pub async fn download_report(
    backend: Arc<dyn Backend>,
    cedula: String,
    dir: PathBuf,
) -> StationResult<PathBuf> {
    let bytes = backend.download_report(&cedula).await?;
    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join(archive_name(&cedula));
    tokio::fs::write(&path, &bytes).await?;
    info!("Saved {} bytes of evidence to {:?}", bytes.len(), path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_name() {
        assert_eq!(archive_name("0912345678"), "0912345678_evidence.zip");
        assert_eq!(archive_name("../x y"), "___x_y_evidence.zip");
    }
}

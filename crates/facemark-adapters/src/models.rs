//! Model downloading and caching adapter.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Placeholder checksum indicating verification should be skipped.
///
/// Models carrying it point at release URLs where no weights are published
/// yet; fetching them fails until the release exists, and the file has to be
/// copied into the models directory by hand.
const PLACEHOLDER_CHECKSUM: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

const CHUNK_SIZE: usize = 64 * 1024;

/// Model metadata.
#[derive(Debug, Clone)]
pub struct ModelInfo {
    /// Model name/identifier.
    pub name: &'static str,
    /// Download URL.
    pub url: &'static str,
    /// Expected SHA256 hash. All zeros skips verification.
    pub sha256: &'static str,
    /// Filename in the models directory.
    pub filename: &'static str,
}

/// Known models.
///
/// The blazeface release URL is a placeholder until converted weights are
/// published, which is why its checksum is [`PLACEHOLDER_CHECKSUM`].
pub const MODELS: &[ModelInfo] = &[ModelInfo {
    name: "blazeface",
    url: "https://github.com/facemark/facemark/releases/download/models-v1/blazeface.safetensors",
    sha256: PLACEHOLDER_CHECKSUM,
    filename: "blazeface.safetensors",
}];

/// Download progress: `(model name, bytes so far, total bytes if known)`.
pub type ProgressCallback = Box<dyn Fn(&str, u64, Option<u64>) + Send + Sync>;

/// Returns the default models directory.
///
/// Uses `XDG_DATA_HOME/facemark/models` or `~/.local/share/facemark/models`.
#[must_use]
pub fn models_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("facemark")
        .join("models")
}

/// Returns the path of model `name` inside `dir`, if the model is known.
#[must_use]
pub fn model_path(name: &str, dir: &Path) -> Option<PathBuf> {
    MODELS
        .iter()
        .find(|m| m.name == name)
        .map(|m| dir.join(m.filename))
}

/// Lists known models with whether each is present in `dir`.
#[must_use]
pub fn list_models(dir: &Path) -> Vec<(&'static ModelInfo, bool)> {
    MODELS
        .iter()
        .map(|m| (m, dir.join(m.filename).exists()))
        .collect()
}

/// Downloads every missing model into `dir`.
///
/// # Errors
///
/// Returns an error if:
/// - The models directory cannot be created
/// - A model download fails
/// - A model's checksum doesn't match
pub fn ensure_models_with_progress(dir: &Path, progress: Option<&ProgressCallback>) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create models directory {}", dir.display()))?;

    for model in MODELS {
        let path = dir.join(model.filename);
        if path.exists() {
            debug!("Model {} already exists", model.name);
        } else {
            download_model(model, &path, progress)?;
        }
    }

    Ok(())
}

/// Streams a model to `<path>.part`, verifies it, then moves it into place.
fn download_model(
    model: &ModelInfo,
    path: &Path,
    progress: Option<&ProgressCallback>,
) -> Result<()> {
    info!("Downloading model: {}", model.name);

    let mut response = reqwest::blocking::get(model.url)
        .with_context(|| format!("Failed to download {}", model.name))?;
    if !response.status().is_success() {
        anyhow::bail!(download_failure(model, path, response.status()));
    }
    let total = response.content_length();

    let partial = path.with_extension("part");
    let mut file = File::create(&partial)
        .with_context(|| format!("Failed to create {}", partial.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0_u8; CHUNK_SIZE];
    let mut downloaded: u64 = 0;

    loop {
        let n = response
            .read(&mut buf)
            .with_context(|| format!("Failed to read response for {}", model.name))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        file.write_all(&buf[..n])
            .with_context(|| format!("Failed to write {}", partial.display()))?;
        downloaded += n as u64;
        if let Some(cb) = progress {
            cb(model.name, downloaded, total);
        }
    }
    file.flush()?;
    drop(file);

    if let Err(e) = verify_checksum(model, &format!("{:x}", hasher.finalize())) {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }

    fs::rename(&partial, path).with_context(|| format!("Failed to install {}", path.display()))?;
    info!("Downloaded {} ({downloaded} bytes)", model.name);
    Ok(())
}

fn download_failure(model: &ModelInfo, path: &Path, status: impl std::fmt::Display) -> String {
    let mut message = format!(
        "Download of {} from {} failed with status: {status}",
        model.name, model.url
    );
    if model.sha256 == PLACEHOLDER_CHECKSUM {
        message.push_str(&format!(
            "; no weights are published for {} yet, copy them to {}",
            model.name,
            path.display()
        ));
    }
    message
}

fn verify_checksum(model: &ModelInfo, actual: &str) -> Result<()> {
    if model.sha256 == PLACEHOLDER_CHECKSUM {
        debug!(
            "Skipping checksum verification for {} (placeholder checksum)",
            model.name
        );
        return Ok(());
    }
    if actual != model.sha256 {
        anyhow::bail!(
            "Checksum mismatch for {}: expected {}, got {actual}",
            model.name,
            model.sha256
        );
    }
    Ok(())
}

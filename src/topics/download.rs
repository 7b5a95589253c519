// Fetches the sentence embedding model from HuggingFace.
//
// Files go under the platform data directory (~/.local/share/trendscope/models
// on Linux) so one download serves every run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

const MODEL_NAME: &str = "all-MiniLM-L6-v2";
const MODEL_REPO_URL: &str =
    "https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main";

/// A file to fetch: path inside the HuggingFace repo, local file name, and
/// rough size for the progress message.
struct ModelFile {
    remote: &'static str,
    local: &'static str,
    approx_size: &'static str,
}

const MODEL_FILES: &[ModelFile] = &[
    ModelFile {
        remote: "tokenizer.json",
        local: "tokenizer.json",
        approx_size: "~700 KB",
    },
    ModelFile {
        remote: "onnx/model.onnx",
        local: "model.onnx",
        approx_size: "~90 MB",
    },
];

/// Default base directory for model files.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("trendscope")
        .join("models")
}

/// Where the embedding model lives under a base model directory.
pub fn embedding_model_dir(base: &Path) -> PathBuf {
    base.join(MODEL_NAME)
}

/// True when every model file is on disk.
pub fn embedding_files_present(base: &Path) -> bool {
    let dir = embedding_model_dir(base);
    MODEL_FILES.iter().all(|f| dir.join(f.local).exists())
}

/// Download any model files that are missing.
pub async fn download_model(base: &Path) -> Result<()> {
    let dir = embedding_model_dir(base);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create model directory: {}", dir.display()))?;

    println!("\nSentence embedding model ({MODEL_NAME}):");

    let client = reqwest::Client::new();
    for file in MODEL_FILES {
        let dest = dir.join(file.local);
        if dest.exists() {
            info!(file = file.local, "Model file present, skipping");
            println!("  {} (already exists)", file.local);
            continue;
        }
        println!("  Downloading {} ({})...", file.local, file.approx_size);
        let url = format!("{MODEL_REPO_URL}/{}", file.remote);
        fetch_to(&client, &url, &dest).await?;
    }

    Ok(())
}

/// Stream `url` into `dest` with a progress bar. Writes to a temporary name
/// first so an interrupted download never looks complete.
async fn fetch_to(client: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download {url}"))?;
    if !response.status().is_success() {
        anyhow::bail!("Download of {url} failed with status {}", response.status());
    }

    let pb = progress_bar(response.content_length());
    let mut body = Vec::with_capacity(response.content_length().unwrap_or(0) as usize);
    while let Some(chunk) = response
        .chunk()
        .await
        .with_context(|| format!("Failed reading body of {url}"))?
    {
        pb.inc(chunk.len() as u64);
        body.extend_from_slice(&chunk);
    }
    pb.finish_and_clear();

    let partial = dest.with_extension("part");
    std::fs::write(&partial, &body)
        .with_context(|| format!("Failed to write {}", partial.display()))?;
    std::fs::rename(&partial, dest)
        .with_context(|| format!("Failed to move download into {}", dest.display()))?;

    info!(url, bytes = body.len(), dest = %dest.display(), "Downloaded model file");
    Ok(())
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(len) => {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .expect("valid template")
                    .progress_chars("=> "),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("    {spinner} {bytes}")
                    .expect("valid template"),
            );
            pb
        }
    }
}

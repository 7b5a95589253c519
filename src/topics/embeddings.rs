// Sentence embeddings with all-MiniLM-L6-v2, run locally through ONNX.
//
// Posts about "fusion reactor" and "plasma confinement" should land in the
// same cluster even with no shared words, which keyword overlap can't do.
// Output vectors are mean-pooled over real tokens and scaled to unit length,
// the same post-processing sentence-transformers applies to this model.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::{Encoding, Tokenizer};
use tracing::debug;

use super::traits::TextEmbedder;

/// Output width of all-MiniLM-L6-v2.
pub const EMBEDDING_DIM: usize = 384;

/// Texts per forward pass. Padding is per pass, so one long post only
/// inflates its own chunk.
const CHUNK_SIZE: usize = 32;

/// Local ONNX sentence embedder.
pub struct SentenceEmbedder {
    // ort needs &mut Session to run
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

impl SentenceEmbedder {
    /// Load `model.onnx` and `tokenizer.json` from `model_dir`.
    pub fn load(model_dir: &Path) -> Result<Self> {
        for file in ["model.onnx", "tokenizer.json"] {
            let path = model_dir.join(file);
            if !path.exists() {
                anyhow::bail!(
                    "Embedding model file missing: {}\nRun `trendscope download-model` first.",
                    path.display()
                );
            }
        }

        let model_path = model_dir.join("model.onnx");
        let session = Session::builder()
            .context("Failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| format!("Failed to load {}", model_path.display()))?;

        let tokenizer = Tokenizer::from_file(model_dir.join("tokenizer.json"))
            .map_err(|e| anyhow::anyhow!("Failed to load tokenizer: {e}"))?;

        debug!(dir = %model_dir.display(), "Sentence embedder ready");

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        let encodings = texts
            .iter()
            .map(|t| {
                self.tokenizer
                    .encode(t.as_str(), true)
                    .map_err(|e| anyhow::anyhow!("Tokenization failed: {e}"))
            })
            .collect::<Result<Vec<_>>>()?;

        let batch = PaddedBatch::from_encodings(&encodings);
        if batch.seq_len == 0 {
            return Ok(vec![vec![0.0; EMBEDDING_DIM]; batch.rows]);
        }

        let shape = [batch.rows as i64, batch.seq_len as i64];
        let input_ids = Tensor::from_array((shape, batch.input_ids))
            .context("Failed to build input_ids tensor")?;
        let attention_mask = Tensor::from_array((shape, batch.attention_mask.clone()))
            .context("Failed to build attention_mask tensor")?;
        let token_type_ids = Tensor::from_array((shape, vec![0i64; batch.rows * batch.seq_len]))
            .context("Failed to build token_type_ids tensor")?;

        // last_hidden_state is [rows, seq_len, EMBEDDING_DIM]
        let hidden: Vec<f32> = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| anyhow::anyhow!("Embedding session lock poisoned"))?;
            let outputs = session
                .run(ort::inputs! {
                    "input_ids" => input_ids,
                    "attention_mask" => attention_mask,
                    "token_type_ids" => token_type_ids
                })
                .context("Embedding inference failed")?;
            let (_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .context("Unexpected embedding output tensor")?;
            data.to_vec()
        };

        Ok(
            mean_pool(&hidden, &batch.attention_mask, batch.rows, batch.seq_len)
                .into_iter()
                .map(normalize)
                .collect(),
        )
    }
}

impl TextEmbedder for SentenceEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(CHUNK_SIZE) {
            out.extend(self.embed_chunk(chunk)?);
        }
        debug!(texts = texts.len(), "Embedded texts");
        Ok(out)
    }
}

/// Row-major model inputs, right-padded to the longest encoding.
struct PaddedBatch {
    rows: usize,
    seq_len: usize,
    input_ids: Vec<i64>,
    attention_mask: Vec<i64>,
}

impl PaddedBatch {
    fn from_encodings(encodings: &[Encoding]) -> Self {
        let rows = encodings.len();
        let seq_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);
        let mut input_ids = vec![0i64; rows * seq_len];
        let mut attention_mask = vec![0i64; rows * seq_len];

        for (row, enc) in encodings.iter().enumerate() {
            let start = row * seq_len;
            for (col, (&id, &mask)) in enc
                .get_ids()
                .iter()
                .zip(enc.get_attention_mask())
                .enumerate()
            {
                input_ids[start + col] = i64::from(id);
                attention_mask[start + col] = i64::from(mask);
            }
        }

        Self {
            rows,
            seq_len,
            input_ids,
            attention_mask,
        }
    }
}

/// Per-row average of the token vectors whose mask is set.
fn mean_pool(hidden: &[f32], mask: &[i64], rows: usize, seq_len: usize) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|row| {
            let mut acc = vec![0.0_f64; EMBEDDING_DIM];
            let mut tokens = 0usize;
            for pos in 0..seq_len {
                let idx = row * seq_len + pos;
                if mask[idx] == 0 {
                    continue;
                }
                tokens += 1;
                let token = &hidden[idx * EMBEDDING_DIM..(idx + 1) * EMBEDDING_DIM];
                for (a, &v) in acc.iter_mut().zip(token) {
                    *a += f64::from(v);
                }
            }
            if tokens > 0 {
                acc.iter_mut().for_each(|a| *a /= tokens as f64);
            }
            acc
        })
        .collect()
}

/// Scale to unit length. Zero vectors are returned unchanged.
fn normalize(mut v: Vec<f64>) -> Vec<f64> {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > f64::EPSILON {
        v.iter_mut().for_each(|x| *x /= norm);
    }
    v
}

/// Cosine similarity, with negative values clamped to 0.0. Mismatched or
/// empty vectors score 0.0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norms = a.iter().map(|x| x * x).sum::<f64>().sqrt() * b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norms < f64::EPSILON {
        return 0.0;
    }
    (dot / norms).clamp(0.0, 1.0)
}

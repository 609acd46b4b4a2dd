//! Sentence embedding extractor
//!
//! [`TransformerEmbedder`] runs a sentence encoder on the CPU with candle:
//! attention-masked mean pooling over the last hidden state, optionally
//! L2-normalized. Loaded once at startup and shared read-only.
//!
//! Model directory layout (Hugging Face):
//! - `config.json`: `model_type` picks the architecture (`mpnet` or `bert`)
//! - `tokenizer.json`
//! - `model.safetensors`

use super::mpnet::{MpnetConfig, MpnetModel};
use crate::error::FatalConfigError;
use crate::fusion::EMBEDDING_DIM;
use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

/// Text → dense semantic vector
pub trait SemanticEmbedder: Send + Sync {
    /// Model identifier for logging
    fn model_id(&self) -> &str;

    /// Embed normalized text. Must return [`EMBEDDING_DIM`] values.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

#[derive(Debug, Deserialize)]
struct EncoderShape {
    hidden_size: usize,
    model_type: Option<String>,
}

/// Supported encoder architectures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderArchitecture {
    Mpnet,
    Bert,
}

impl EncoderArchitecture {
    pub fn from_model_type(model_type: Option<&str>) -> Result<Self, FatalConfigError> {
        match model_type {
            Some("mpnet") => Ok(EncoderArchitecture::Mpnet),
            Some("bert") => Ok(EncoderArchitecture::Bert),
            Some(other) => Err(FatalConfigError::EmbeddingInit(format!(
                "unsupported encoder model_type '{}'",
                other
            ))),
            None => Err(FatalConfigError::EmbeddingInit(
                "config.json has no model_type".to_string(),
            )),
        }
    }

    fn name(self) -> &'static str {
        match self {
            EncoderArchitecture::Mpnet => "mpnet",
            EncoderArchitecture::Bert => "bert",
        }
    }
}

enum Encoder {
    Mpnet(MpnetModel),
    Bert(BertModel),
}

impl Encoder {
    fn load(
        architecture: EncoderArchitecture,
        config_text: &str,
        config_path: &Path,
        vb: VarBuilder,
    ) -> Result<Self, FatalConfigError> {
        let invalid = |e: serde_json::Error| FatalConfigError::invalid(config_path, e.to_string());
        let init = |e: candle_core::Error| {
            FatalConfigError::EmbeddingInit(format!("{} weights: {}", architecture.name(), e))
        };
        match architecture {
            EncoderArchitecture::Mpnet => {
                let config: MpnetConfig = serde_json::from_str(config_text).map_err(invalid)?;
                MpnetModel::load(vb, &config).map(Encoder::Mpnet).map_err(init)
            }
            EncoderArchitecture::Bert => {
                let config: BertConfig = serde_json::from_str(config_text).map_err(invalid)?;
                BertModel::load(vb, &config).map(Encoder::Bert).map_err(init)
            }
        }
    }

    fn forward(&self, ids: &Tensor, type_ids: &Tensor, mask: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Encoder::Mpnet(model) => model.forward(ids, mask),
            Encoder::Bert(model) => model.forward(ids, type_ids, Some(mask)),
        }
    }
}

/// Candle transformer sentence encoder
pub struct TransformerEmbedder {
    model: Encoder,
    architecture: EncoderArchitecture,
    tokenizer: Tokenizer,
    device: Device,
    normalize: bool,
    model_id: String,
}

fn required_file(dir: &Path, name: &str) -> Result<PathBuf, FatalConfigError> {
    let path = dir.join(name);
    if path.exists() {
        Ok(path)
    } else {
        Err(FatalConfigError::MissingArtifact(path))
    }
}

impl TransformerEmbedder {
    /// Load config, tokenizer and weights from `model_dir`
    pub fn load(
        model_dir: &Path,
        max_sequence_length: usize,
        normalize: bool,
    ) -> Result<Self, FatalConfigError> {
        let config_path = required_file(model_dir, "config.json")?;
        let tokenizer_path = required_file(model_dir, "tokenizer.json")?;
        let weights_path = required_file(model_dir, "model.safetensors")?;

        let config_text = std::fs::read_to_string(&config_path)?;
        let shape: EncoderShape = serde_json::from_str(&config_text)
            .map_err(|e| FatalConfigError::invalid(&config_path, e.to_string()))?;
        let architecture = EncoderArchitecture::from_model_type(shape.model_type.as_deref())?;
        if shape.hidden_size != EMBEDDING_DIM {
            return Err(FatalConfigError::EmbeddingInit(format!(
                "hidden_size {} does not match embedding width {}",
                shape.hidden_size, EMBEDDING_DIM
            )));
        }

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            FatalConfigError::EmbeddingInit(format!(
                "Tokenizer load failed at {}: {}",
                tokenizer_path.display(),
                e
            ))
        })?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_sequence_length,
                ..Default::default()
            }))
            .map_err(|e| FatalConfigError::EmbeddingInit(format!("Tokenizer truncation: {}", e)))?;
        tokenizer.with_padding(None);

        let device = Device::Cpu;
        // SAFETY: the weights file is opened read-only and not modified while mapped
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[&weights_path], DTYPE, &device).map_err(|e| {
                FatalConfigError::EmbeddingInit(format!(
                    "Failed to map {}: {}",
                    weights_path.display(),
                    e
                ))
            })?
        };
        let model = Encoder::load(architecture, &config_text, &config_path, vb)?;

        let model_id = model_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sentence-encoder".to_string());

        info!(
            model = %model_id,
            architecture = architecture.name(),
            hidden_size = shape.hidden_size,
            max_sequence_length,
            normalize,
            "Sentence embedding model loaded"
        );

        Ok(Self {
            model,
            architecture,
            tokenizer,
            device,
            normalize,
            model_id,
        })
    }

    pub fn architecture(&self) -> EncoderArchitecture {
        self.architecture
    }

    fn pooled(&self, text: &str) -> Result<Tensor> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("tokenization failed: {}", e))?;

        let ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let type_ids = Tensor::new(encoding.get_type_ids(), &self.device)?.unsqueeze(0)?;
        let mask = Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let hidden = self.model.forward(&ids, &type_ids, &mask)?;

        // (1, n, h) masked mean over n
        let mask = mask.to_dtype(DType::F32)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let count = mask.sum(1)?.clamp(1e-9f32, f32::MAX)?;
        let pooled = summed.broadcast_div(&count)?;

        if self.normalize {
            let norm = pooled.sqr()?.sum_keepdim(1)?.sqrt()?.clamp(1e-12f32, f32::MAX)?;
            Ok(pooled.broadcast_div(&norm)?)
        } else {
            Ok(pooled)
        }
    }
}

impl SemanticEmbedder for TransformerEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self.pooled(text)?.squeeze(0)?.to_vec1::<f32>()?;
        debug!(dims = vector.len(), "Embedded text");
        Ok(vector)
    }
}

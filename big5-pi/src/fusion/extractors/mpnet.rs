//! MPNet encoder
//!
//! Forward pass of the MPNet transformer (the `all-mpnet-base-v2` sentence
//! encoder) on candle primitives. It departs from BERT in three places:
//!
//! - no token-type embeddings
//! - position ids count non-padding tokens and start after the padding id
//! - a bucketed relative-position bias, shared by every layer, is added to
//!   the attention scores
//!
//! Weight names follow the Hugging Face checkpoint (`encoder.layer.N.
//! attention.attn.{q,k,v,o}`, `encoder.relative_attention_bias`), with or
//! without the `mpnet.` prefix of masked-LM exports.

use candle_core::{bail, DType, Device, Module, Result, Tensor};
use candle_nn::{embedding, layer_norm, linear, Embedding, LayerNorm, Linear, VarBuilder};
use serde::Deserialize;

const MAX_DISTANCE: usize = 128;

fn default_num_buckets() -> usize {
    32
}

fn default_layer_norm_eps() -> f64 {
    1e-5
}

fn default_pad_token_id() -> u32 {
    1
}

fn default_hidden_act() -> String {
    "gelu".to_string()
}

/// `config.json` fields used by the encoder
#[derive(Debug, Clone, Deserialize)]
pub struct MpnetConfig {
    pub vocab_size: usize,
    pub hidden_size: usize,
    pub num_hidden_layers: usize,
    pub num_attention_heads: usize,
    pub intermediate_size: usize,
    pub max_position_embeddings: usize,
    #[serde(default = "default_num_buckets")]
    pub relative_attention_num_buckets: usize,
    #[serde(default = "default_layer_norm_eps")]
    pub layer_norm_eps: f64,
    #[serde(default = "default_pad_token_id")]
    pub pad_token_id: u32,
    #[serde(default = "default_hidden_act")]
    pub hidden_act: String,
}

/// Relative position (key minus query) → bias bucket
///
/// Half the buckets hold keys after the query. Within each half, distances
/// below a quarter of the buckets get their own bucket and longer ones share
/// log-spaced buckets up to `max_distance`.
pub fn relative_position_bucket(relative: i64, num_buckets: usize, max_distance: usize) -> u32 {
    let half = (num_buckets / 2) as i64;
    let n = -relative;
    let mut bucket = if n < 0 { half } else { 0 };
    let n = n.abs();
    let max_exact = half / 2;
    bucket += if n < max_exact {
        n
    } else {
        let ratio = (n as f32 / max_exact as f32).ln()
            / (max_distance as f64 / max_exact as f64).ln() as f32;
        let large = max_exact + (ratio * (half - max_exact) as f32) as i64;
        large.min(half - 1)
    };
    bucket as u32
}

/// Position ids: padding keeps the padding id, real tokens count up from it
pub fn position_ids(ids: &[u32], pad: u32) -> Vec<u32> {
    let mut seen = 0;
    ids.iter()
        .map(|&id| {
            if id == pad {
                pad
            } else {
                seen += 1;
                seen + pad
            }
        })
        .collect()
}

struct MpnetEmbeddings {
    word: Embedding,
    position: Embedding,
    layer_norm: LayerNorm,
    pad: u32,
}

impl MpnetEmbeddings {
    fn load(vb: VarBuilder, cfg: &MpnetConfig) -> Result<Self> {
        Ok(Self {
            word: embedding(cfg.vocab_size, cfg.hidden_size, vb.pp("word_embeddings"))?,
            position: embedding(
                cfg.max_position_embeddings,
                cfg.hidden_size,
                vb.pp("position_embeddings"),
            )?,
            layer_norm: layer_norm(cfg.hidden_size, cfg.layer_norm_eps, vb.pp("LayerNorm"))?,
            pad: cfg.pad_token_id,
        })
    }

    fn forward(&self, input_ids: &Tensor) -> Result<Tensor> {
        let (batch, len) = input_ids.dims2()?;
        let positions: Vec<u32> = input_ids
            .to_vec2::<u32>()?
            .iter()
            .flat_map(|row| position_ids(row, self.pad))
            .collect();
        let positions = Tensor::from_vec(positions, (batch, len), input_ids.device())?;
        let x = (self.word.forward(input_ids)? + self.position.forward(&positions)?)?;
        self.layer_norm.forward(&x)
    }
}

struct MpnetAttention {
    q: Linear,
    k: Linear,
    v: Linear,
    o: Linear,
    layer_norm: LayerNorm,
    heads: usize,
    head_dim: usize,
}

impl MpnetAttention {
    fn load(vb: VarBuilder, cfg: &MpnetConfig) -> Result<Self> {
        let h = cfg.hidden_size;
        let attn = vb.pp("attn");
        Ok(Self {
            q: linear(h, h, attn.pp("q"))?,
            k: linear(h, h, attn.pp("k"))?,
            v: linear(h, h, attn.pp("v"))?,
            o: linear(h, h, attn.pp("o"))?,
            layer_norm: layer_norm(h, cfg.layer_norm_eps, vb.pp("LayerNorm"))?,
            heads: cfg.num_attention_heads,
            head_dim: h / cfg.num_attention_heads,
        })
    }

    /// (b, n, h) → (b, heads, n, d)
    fn split_heads(&self, x: &Tensor) -> Result<Tensor> {
        let (b, n, _) = x.dims3()?;
        x.reshape((b, n, self.heads, self.head_dim))?
            .transpose(1, 2)?
            .contiguous()
    }

    fn forward(&self, hidden: &Tensor, position_bias: &Tensor, mask: &Tensor) -> Result<Tensor> {
        let q = self.split_heads(&self.q.forward(hidden)?)?;
        let k = self.split_heads(&self.k.forward(hidden)?)?;
        let v = self.split_heads(&self.v.forward(hidden)?)?;

        let scores = (q.matmul(&k.t()?.contiguous()?)? / (self.head_dim as f64).sqrt())?;
        let scores = scores.broadcast_add(position_bias)?.broadcast_add(mask)?;
        let probs = candle_nn::ops::softmax_last_dim(&scores)?;

        let context = probs.matmul(&v)?.transpose(1, 2)?.contiguous()?;
        let (b, n, _, _) = context.dims4()?;
        let context = context.reshape((b, n, self.heads * self.head_dim))?;
        let out = self.o.forward(&context)?;
        self.layer_norm.forward(&(out + hidden)?)
    }
}

struct MpnetLayer {
    attention: MpnetAttention,
    intermediate: Linear,
    output: Linear,
    output_norm: LayerNorm,
}

impl MpnetLayer {
    fn load(vb: VarBuilder, cfg: &MpnetConfig) -> Result<Self> {
        Ok(Self {
            attention: MpnetAttention::load(vb.pp("attention"), cfg)?,
            intermediate: linear(
                cfg.hidden_size,
                cfg.intermediate_size,
                vb.pp("intermediate").pp("dense"),
            )?,
            output: linear(
                cfg.intermediate_size,
                cfg.hidden_size,
                vb.pp("output").pp("dense"),
            )?,
            output_norm: layer_norm(
                cfg.hidden_size,
                cfg.layer_norm_eps,
                vb.pp("output").pp("LayerNorm"),
            )?,
        })
    }

    fn forward(&self, hidden: &Tensor, position_bias: &Tensor, mask: &Tensor) -> Result<Tensor> {
        let attended = self.attention.forward(hidden, position_bias, mask)?;
        let x = self.intermediate.forward(&attended)?.gelu_erf()?;
        let x = self.output.forward(&x)?;
        self.output_norm.forward(&(x + &attended)?)
    }
}

/// MPNet encoder returning the last hidden state
pub struct MpnetModel {
    embeddings: MpnetEmbeddings,
    layers: Vec<MpnetLayer>,
    relative_attention_bias: Embedding,
    num_buckets: usize,
}

impl MpnetModel {
    pub fn load(vb: VarBuilder, cfg: &MpnetConfig) -> Result<Self> {
        if cfg.num_attention_heads == 0 || cfg.hidden_size % cfg.num_attention_heads != 0 {
            bail!(
                "hidden_size {} is not divisible by {} attention heads",
                cfg.hidden_size,
                cfg.num_attention_heads
            );
        }
        if cfg.hidden_act != "gelu" {
            bail!("unsupported activation '{}'", cfg.hidden_act);
        }
        let vb = if vb.contains_tensor("mpnet.embeddings.word_embeddings.weight") {
            vb.pp("mpnet")
        } else {
            vb
        };

        let encoder = vb.pp("encoder");
        let layers = (0..cfg.num_hidden_layers)
            .map(|i| MpnetLayer::load(encoder.pp("layer").pp(i), cfg))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            embeddings: MpnetEmbeddings::load(vb.pp("embeddings"), cfg)?,
            layers,
            relative_attention_bias: embedding(
                cfg.relative_attention_num_buckets,
                cfg.num_attention_heads,
                encoder.pp("relative_attention_bias"),
            )?,
            num_buckets: cfg.relative_attention_num_buckets,
        })
    }

    /// (1, heads, n, n) bias shared by every layer
    fn position_bias(&self, len: usize, device: &Device) -> Result<Tensor> {
        let buckets: Vec<u32> = (0..len as i64)
            .flat_map(|query| {
                (0..len as i64).map(move |key| {
                    relative_position_bucket(key - query, self.num_buckets, MAX_DISTANCE)
                })
            })
            .collect();
        let buckets = Tensor::from_vec(buckets, (len, len), device)?;
        self.relative_attention_bias
            .forward(&buckets)?
            .permute((2, 0, 1))?
            .unsqueeze(0)
    }

    /// `input_ids` and `attention_mask` are (b, n) u32; returns (b, n, h)
    pub fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let (_, len) = input_ids.dims2()?;
        let position_bias = self.position_bias(len, input_ids.device())?;
        // 0 for real tokens, f32::MIN for padding, as (b, 1, 1, n)
        let mask = attention_mask
            .to_dtype(DType::F32)?
            .affine(-1.0, 1.0)?
            .affine(f32::MIN as f64, 0.0)?
            .unsqueeze(1)?
            .unsqueeze(1)?;

        let mut hidden = self.embeddings.forward(input_ids)?;
        for layer in &self.layers {
            hidden = layer.forward(&hidden, &position_bias, &mask)?;
        }
        Ok(hidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_nn::VarMap;

    fn tiny_config() -> MpnetConfig {
        serde_json::from_value(serde_json::json!({
            "model_type": "mpnet",
            "vocab_size": 12,
            "hidden_size": 8,
            "num_hidden_layers": 2,
            "num_attention_heads": 2,
            "intermediate_size": 16,
            "max_position_embeddings": 16
        }))
        .unwrap()
    }

    fn tiny_model(varmap: &VarMap) -> MpnetModel {
        let vb = VarBuilder::from_varmap(varmap, DType::F32, &Device::Cpu);
        MpnetModel::load(vb, &tiny_config()).unwrap()
    }

    fn ids(values: &[u32]) -> Tensor {
        Tensor::new(values, &Device::Cpu).unwrap().unsqueeze(0).unwrap()
    }

    #[test]
    fn test_relative_position_buckets() {
        let bucket = |rel| relative_position_bucket(rel, 32, 128);
        assert_eq!(bucket(0), 0);
        assert_eq!(bucket(1), 17);
        assert_eq!(bucket(-1), 1);
        assert_eq!(bucket(-7), 7);
        assert_eq!(bucket(-8), 8);
        assert_eq!(bucket(-16), 10);
        assert_eq!(bucket(-20), 10);
        assert_eq!(bucket(-32), 12);
        assert_eq!(bucket(-200), 15);
        assert_eq!(bucket(200), 31);
    }

    #[test]
    fn test_position_ids_skip_padding() {
        assert_eq!(position_ids(&[0, 7, 9, 2], 1), vec![2, 3, 4, 5]);
        assert_eq!(position_ids(&[0, 7, 2, 1, 1], 1), vec![2, 3, 4, 1, 1]);
    }

    #[test]
    fn test_config_defaults() {
        let cfg = tiny_config();
        assert_eq!(cfg.relative_attention_num_buckets, 32);
        assert_eq!(cfg.pad_token_id, 1);
        assert_eq!(cfg.layer_norm_eps, 1e-5);
    }

    #[test]
    fn test_forward_shape() {
        let varmap = VarMap::new();
        let model = tiny_model(&varmap);
        let hidden = model
            .forward(&ids(&[0, 4, 5, 6, 2]), &ids(&[1, 1, 1, 1, 1]))
            .unwrap();
        assert_eq!(hidden.dims(), &[1, 5, 8]);
        let values = hidden.flatten_all().unwrap().to_vec1::<f32>().unwrap();
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_padding_does_not_change_real_tokens() {
        let varmap = VarMap::new();
        let model = tiny_model(&varmap);
        let plain = model.forward(&ids(&[0, 4, 2]), &ids(&[1, 1, 1])).unwrap();
        let padded = model
            .forward(&ids(&[0, 4, 2, 1, 1]), &ids(&[1, 1, 1, 0, 0]))
            .unwrap()
            .narrow(1, 0, 3)
            .unwrap();
        let diff = (plain - padded)
            .unwrap()
            .abs()
            .unwrap()
            .max_keepdim(2)
            .unwrap()
            .flatten_all()
            .unwrap()
            .to_vec1::<f32>()
            .unwrap();
        assert!(diff.iter().all(|d| *d < 1e-5), "max diff {:?}", diff);
    }

    #[test]
    fn test_rejects_indivisible_heads() {
        let mut cfg = tiny_config();
        cfg.num_attention_heads = 3;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        assert!(MpnetModel::load(vb, &cfg).is_err());
    }

    #[test]
    fn test_loads_prefixed_weights() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        MpnetModel::load(vb.pp("mpnet"), &tiny_config()).unwrap();
        // the root builder now sees the `mpnet.` prefix and descends into it
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        MpnetModel::load(vb, &tiny_config()).unwrap();
        let names: Vec<String> = varmap.data().lock().unwrap().keys().cloned().collect();
        assert!(names.iter().all(|n| n.starts_with("mpnet.")), "{:?}", names);
        assert!(names.contains(&"mpnet.encoder.relative_attention_bias.weight".to_string()));
        assert!(names.contains(&"mpnet.encoder.layer.1.attention.attn.q.weight".to_string()));
    }
}

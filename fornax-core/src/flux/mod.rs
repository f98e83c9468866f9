use std::time::Instant;

use anyhow::{Context, Error, Result};
use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::{Module, VarBuilder};
use candle_transformers::models::clip::text_model::{self, ClipTextTransformer};
use candle_transformers::models::flux::{self, autoencoder::AutoEncoder, model::Flux};
use candle_transformers::models::t5::{self, T5EncoderModel};
use hf_hub::api::tokio::Api;
use hf_hub::{Repo, RepoType};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::{
    tensor_to_image, Accelerator, GenerationParams, Loader, PipelineOutput, TextToImage,
};

/// Model registry id of the pretrained pipeline. Fixed; the demo is not a
/// model browser.
pub const MODEL_ID: &str = "black-forest-labs/FLUX.1-schnell";

const T5_REPO: &str = "google/t5-v1_1-xxl";
const T5_REVISION: &str = "refs/pr/2";
const T5_TOKENIZER_REPO: &str = "lmz/mt5-tokenizers";
const T5_TOKENIZER_FILE: &str = "t5-v1_1-xxl.tokenizer.json";
const CLIP_REPO: &str = "openai/clip-vit-large-patch14";
/// The schnell variant conditions on 256 text tokens.
const T5_SEQUENCE_LEN: usize = 256;

/// The preloaded pipeline: both text encoders with their tokenizers, the
/// flow transformer, and the image decoder, all on one device at one dtype.
pub struct FluxPipeline {
    device: Device,
    dtype: DType,
    t5: T5EncoderModel,
    t5_tokenizer: Tokenizer,
    clip: ClipTextTransformer,
    clip_tokenizer: Tokenizer,
    autoencoder: AutoEncoder,
    flux: Flux,
}

impl TextToImage for FluxPipeline {
    fn generate(&mut self, params: &GenerationParams) -> Result<PipelineOutput> {
        // Seed the device generator for reproducibility. The CPU backend has
        // no device-bound generator to seed.
        if !self.device.is_cpu() {
            self.device.set_seed(params.seed)?;
        }

        let noise =
            flux::sampling::get_noise(1, params.height, params.width, &self.device)?
                .to_dtype(self.dtype)?;

        let mut t5_tokens = self
            .t5_tokenizer
            .encode(params.prompt.as_str(), true)
            .map_err(Error::msg)?
            .get_ids()
            .to_vec();
        t5_tokens.resize(T5_SEQUENCE_LEN, 0);
        let t5_ids = Tensor::new(&*t5_tokens, &self.device)?.unsqueeze(0)?;
        let t5_emb = self.t5.forward(&t5_ids)?;

        let clip_tokens = self
            .clip_tokenizer
            .encode(params.prompt.as_str(), true)
            .map_err(Error::msg)?
            .get_ids()
            .to_vec();
        let clip_ids = Tensor::new(&*clip_tokens, &self.device)?.unsqueeze(0)?;
        let clip_emb = self.clip.forward(&clip_ids)?;

        let state = flux::sampling::State::new(&t5_emb, &clip_emb, &noise)?;
        let timesteps = flux::sampling::get_schedule(params.steps, None);

        debug!(steps = params.steps, "denoising");
        let latent = flux::sampling::denoise(
            &self.flux,
            &state.img,
            &state.img_ids,
            &state.txt,
            &state.txt_ids,
            &state.vec,
            &timesteps,
            params.guidance,
        )?;
        let latent = flux::sampling::unpack(&latent, params.height, params.width)?;

        debug!("decoding latent image");
        let decoded = self.autoencoder.decode(&latent)?;

        let image = ((decoded.clamp(-1f32, 1f32)? + 1.0)? * 127.5)?.to_dtype(DType::U8)?;
        let image = tensor_to_image(&image.i(0)?)?;
        Ok(PipelineOutput::Batch {
            images: vec![image],
        })
    }
}

pub struct FluxLoader;

impl Loader for FluxLoader {
    type Pipeline = FluxPipeline;

    async fn load(api: Api, accel: Accelerator, device: Device) -> Result<FluxPipeline> {
        let dtype = accel.dtype();
        let started = Instant::now();
        info!(model = MODEL_ID, %accel, ?dtype, "loading pipeline");

        // --- T5 text encoder and tokenizer ---
        let t5_repo = api.repo(Repo::with_revision(
            T5_REPO.to_string(),
            RepoType::Model,
            T5_REVISION.to_string(),
        ));
        let t5_weights = t5_repo
            .get("model.safetensors")
            .await
            .context("failed to fetch T5 weights")?;
        let t5_vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[t5_weights], dtype, &device)
                .context("failed to map T5 weights")?
        };
        let t5_config = t5_repo
            .get("config.json")
            .await
            .context("failed to fetch T5 config")?;
        let t5_config = std::fs::read_to_string(&t5_config).context("failed to read T5 config")?;
        let t5_config: t5::Config =
            serde_json::from_str(&t5_config).context("failed to parse T5 config")?;
        let t5_model = T5EncoderModel::load(t5_vb, &t5_config).context("failed to load T5")?;
        let t5_tokenizer_file = api
            .model(T5_TOKENIZER_REPO.to_string())
            .get(T5_TOKENIZER_FILE)
            .await
            .context("failed to fetch T5 tokenizer")?;
        let t5_tokenizer = Tokenizer::from_file(t5_tokenizer_file)
            .map_err(Error::msg)
            .context("failed to load T5 tokenizer")?;

        // --- CLIP text encoder and tokenizer ---
        let clip_repo = api.repo(Repo::model(CLIP_REPO.to_string()));
        let clip_weights = clip_repo
            .get("model.safetensors")
            .await
            .context("failed to fetch CLIP weights")?;
        let clip_vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[clip_weights], dtype, &device)
                .context("failed to map CLIP weights")?
        };
        let clip_config = text_model::ClipTextConfig {
            vocab_size: 49408,
            projection_dim: 768,
            activation: text_model::Activation::QuickGelu,
            intermediate_size: 3072,
            embed_dim: 768,
            max_position_embeddings: 77,
            pad_with: None,
            num_hidden_layers: 12,
            num_attention_heads: 12,
        };
        let clip_model = ClipTextTransformer::new(clip_vb.pp("text_model"), &clip_config)
            .context("failed to load CLIP")?;
        let clip_tokenizer_file = clip_repo
            .get("tokenizer.json")
            .await
            .context("failed to fetch CLIP tokenizer")?;
        let clip_tokenizer = Tokenizer::from_file(clip_tokenizer_file)
            .map_err(Error::msg)
            .context("failed to load CLIP tokenizer")?;

        // --- Image decoder and flow transformer ---
        let repo = api.repo(Repo::model(MODEL_ID.to_string()));
        let ae_weights = repo
            .get("ae.safetensors")
            .await
            .context("failed to fetch autoencoder weights")?;
        let ae_vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[ae_weights], dtype, &device)
                .context("failed to map autoencoder weights")?
        };
        let autoencoder = AutoEncoder::new(&flux::autoencoder::Config::schnell(), ae_vb)
            .context("failed to load autoencoder")?;

        let flux_weights = repo
            .get("flux1-schnell.safetensors")
            .await
            .context("failed to fetch flux weights")?;
        let flux_vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[flux_weights], dtype, &device)
                .context("failed to map flux weights")?
        };
        let flux_model = Flux::new(&flux::model::Config::schnell(), flux_vb)
            .context("failed to load flux transformer")?;

        info!(elapsed = ?started.elapsed(), "pipeline loaded");
        Ok(FluxPipeline {
            device,
            dtype,
            t5: t5_model,
            t5_tokenizer,
            clip: clip_model,
            clip_tokenizer,
            autoencoder,
            flux: flux_model,
        })
    }
}

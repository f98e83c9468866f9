use std::sync::Mutex;
use std::time::Instant;

use anyhow::{anyhow, Result};
use hf_hub::api::tokio::Api;
use image::DynamicImage;
use tracing::{error, info};

use crate::{select_device, Accelerator, FluxLoader, GenerationRequest, Loader, TextToImage};

/// Edge length past which CPU generation gets slow enough to warn about.
const CPU_COMFORTABLE_EDGE: usize = 768;

/// Outcome of one generation call. Failures are data, not panics; the
/// presentation layer renders [`GenerationOutcome::Failed`] as an error
/// banner instead of an image.
#[derive(Debug)]
pub enum GenerationOutcome {
    Image(DynamicImage),
    Failed(String),
}

/// Drives one inference call per request against the loaded pipeline.
pub struct GenerationService {
    accel: Accelerator,
    pipeline: Mutex<Box<dyn TextToImage>>,
}

impl GenerationService {
    pub fn new(accel: Accelerator, pipeline: Box<dyn TextToImage>) -> Self {
        Self {
            accel,
            pipeline: Mutex::new(pipeline),
        }
    }

    /// Detects the best device and loads the pretrained pipeline onto it.
    /// Load failures propagate: they happen at startup and there is no
    /// recovery strategy.
    pub async fn load(api: Api) -> Result<Self> {
        let (accel, device) = select_device()?;
        info!(%accel, dtype = ?accel.dtype(), "selected device");
        let pipeline = FluxLoader::load(api, accel, device).await?;
        Ok(Self::new(accel, Box::new(pipeline)))
    }

    pub fn accelerator(&self) -> Accelerator {
        self.accel
    }

    /// Runs one generation. Every failure in coercion, inference, or result
    /// extraction is absorbed into [`GenerationOutcome::Failed`].
    pub fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        match self.try_generate(request) {
            Ok(image) => GenerationOutcome::Image(image),
            Err(err) => {
                error!("image generation failed: {err:?}");
                GenerationOutcome::Failed(format!("Error generating image: {err:#}"))
            }
        }
    }

    fn try_generate(&self, request: &GenerationRequest) -> Result<DynamicImage> {
        let params = request.resolve()?;
        if self.accel.is_cpu()
            && (params.width > CPU_COMFORTABLE_EDGE || params.height > CPU_COMFORTABLE_EDGE)
        {
            info!(
                width = params.width,
                height = params.height,
                "high resolution on CPU will be slow, 512x512 or 768x768 is faster"
            );
        }

        let started = Instant::now();
        let output = self
            .pipeline
            .lock()
            .map_err(|_| anyhow!("pipeline lock poisoned"))?
            .generate(&params)?;
        let image = output.into_first_image()?;
        info!(
            width = params.width,
            height = params.height,
            steps = params.steps,
            elapsed = ?started.elapsed(),
            "generated image"
        );
        Ok(image)
    }
}

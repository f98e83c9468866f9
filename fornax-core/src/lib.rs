//! Core crate of fornax: device capability detection, pretrained pipeline
//! loading, and the generation service the web front-end talks to.

#[cfg(feature = "accelerate")]
extern crate accelerate_src;
#[cfg(feature = "mkl")]
extern crate intel_mkl_src;

pub mod accel;
mod flux;
pub mod handle;
mod loader;
mod output;
mod request;
mod service;
mod util;

pub use accel::{select_device, Accelerator};
pub use flux::{FluxLoader, FluxPipeline, MODEL_ID};
pub use handle::ModelCell;
pub use loader::Loader;
pub use output::{EmptyOutput, PipelineOutput};
pub use request::{
    GenerationParams, GenerationRequest, ParamError, DEFAULT_GUIDANCE, DEFAULT_HEIGHT,
    DEFAULT_SEED, DEFAULT_STEPS, DEFAULT_WIDTH,
};
pub use service::{GenerationOutcome, GenerationService};
pub(crate) use util::tensor_to_image;

/// A loaded text-to-image pipeline, ready to run inference.
///
/// Implementations take `&mut self` because the underlying text encoders
/// cache state across a forward pass.
pub trait TextToImage: Send {
    fn generate(&mut self, params: &GenerationParams) -> anyhow::Result<PipelineOutput>;
}

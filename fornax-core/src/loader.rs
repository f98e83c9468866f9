use std::future::Future;

use anyhow::Result;
use candle_core::Device;
use hf_hub::api::tokio::Api;

use crate::{Accelerator, TextToImage};

pub trait Loader {
    type Pipeline: TextToImage;

    /// Fetches the pretrained weights through `api` and assembles a pipeline
    /// on `device`, at the precision matching `accel`.
    fn load(
        api: Api,
        accel: Accelerator,
        device: Device,
    ) -> impl Future<Output = Result<Self::Pipeline>>
    where
        Self: Sized;
}

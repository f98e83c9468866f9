use image::DynamicImage;
use thiserror::Error;

/// Result shapes a pipeline call may produce.
///
/// Different pipeline backends hand their images back either as a batch of
/// batches, a flat batch, or a result object carrying an `images` collection.
/// The adapter constructing this value sits at the library boundary;
/// [`PipelineOutput::into_first_image`] is the one canonical accessor.
#[derive(Debug, Clone)]
pub enum PipelineOutput {
    /// The first element is itself a sequence of images.
    Nested(Vec<Vec<DynamicImage>>),
    /// The first element is the image.
    Flat(Vec<DynamicImage>),
    /// A result object exposing its `images` field.
    Batch { images: Vec<DynamicImage> },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("pipeline returned no images")]
pub struct EmptyOutput;

impl PipelineOutput {
    /// Extracts exactly one image: the first, whatever shape it came in.
    pub fn into_first_image(self) -> Result<DynamicImage, EmptyOutput> {
        let first = match self {
            PipelineOutput::Nested(batches) => batches
                .into_iter()
                .next()
                .and_then(|batch| batch.into_iter().next()),
            PipelineOutput::Flat(images) => images.into_iter().next(),
            PipelineOutput::Batch { images } => images.into_iter().next(),
        };
        first.ok_or(EmptyOutput)
    }
}

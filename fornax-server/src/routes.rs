use std::io::Cursor;

use anyhow::Result;
use axum::{
    extract::Json,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};
use base64::{prelude::BASE64_STANDARD, Engine};
use fornax_core::{GenerationOutcome, GenerationRequest};
use image::DynamicImage;
use serde::Serialize;

use crate::{service, ui};

pub fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/v1/images/generations", post(generate))
}

async fn index() -> impl IntoResponse {
    match service().await {
        Ok(service) => Html(ui::render_page(service.accelerator())).into_response(),
        Err(err) => {
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {err:#}")).into_response()
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum GenerateReply {
    Image { image: String },
    Failed { error: String },
}

async fn generate(Json(request): Json<GenerationRequest>) -> impl IntoResponse {
    let service = match service().await {
        Ok(service) => service,
        Err(err) => {
            let reply = GenerateReply::Failed {
                error: format!("Error generating image: {err:#}"),
            };
            return Json(reply);
        }
    };
    let reply = match service.generate(&request) {
        GenerationOutcome::Image(image) => match image_to_base64_png(&image) {
            Ok(image) => GenerateReply::Image { image },
            Err(err) => GenerateReply::Failed {
                error: format!("Error generating image: {err:#}"),
            },
        },
        GenerationOutcome::Failed(error) => GenerateReply::Failed { error },
    };
    Json(reply)
}

/// PNG-encodes the image for embedding in a `data:` URL.
fn image_to_base64_png(image: &DynamicImage) -> Result<String> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(BASE64_STANDARD.encode(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn base64_png_round_trips() {
        let mut source = RgbImage::new(2, 2);
        source.put_pixel(1, 0, Rgb([250, 0, 5]));
        let encoded = image_to_base64_png(&DynamicImage::ImageRgb8(source)).unwrap();

        let bytes = BASE64_STANDARD.decode(encoded).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.get_pixel(1, 0).0, [250, 0, 5]);
    }

    #[test]
    fn replies_serialize_to_a_single_tagged_field() {
        let image = serde_json::to_value(GenerateReply::Image {
            image: "abc".into(),
        })
        .unwrap();
        assert_eq!(image, serde_json::json!({ "image": "abc" }));

        let failed = serde_json::to_value(GenerateReply::Failed {
            error: "Error generating image: boom".into(),
        })
        .unwrap();
        assert_eq!(
            failed,
            serde_json::json!({ "error": "Error generating image: boom" })
        );
    }
}

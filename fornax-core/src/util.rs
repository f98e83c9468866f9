use anyhow::Result;
use candle_core::Tensor;
use image::DynamicImage;

/// Converts a `(3, height, width)` u8 tensor into an RGB image.
pub fn tensor_to_image(img: &Tensor) -> Result<DynamicImage> {
    let (channels, height, width) = img.dims3()?;
    if channels != 3 {
        anyhow::bail!("expected an image tensor with 3 channels, got {channels}");
    }
    let img = img.permute((1, 2, 0))?.flatten_all()?;
    let pixels = img.to_vec1::<u8>()?;
    let buffer = image::ImageBuffer::from_raw(width as u32, height as u32, pixels)
        .ok_or_else(|| anyhow::anyhow!("pixel buffer does not match {width}x{height}"))?;
    Ok(DynamicImage::ImageRgb8(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn converts_channel_first_tensor() {
        // 3 channels, 1x2: red-ish and blue-ish pixels.
        let data: Vec<u8> = vec![
            200, 10, // R plane
            20, 30, // G plane
            40, 250, // B plane
        ];
        let tensor = Tensor::from_vec(data, (3, 1, 2), &Device::Cpu).unwrap();
        let image = tensor_to_image(&tensor).unwrap().to_rgb8();
        assert_eq!(image.dimensions(), (2, 1));
        assert_eq!(image.get_pixel(0, 0).0, [200, 20, 40]);
        assert_eq!(image.get_pixel(1, 0).0, [10, 30, 250]);
    }

    #[test]
    fn rejects_wrong_channel_count() {
        let tensor = Tensor::zeros((4, 2, 2), candle_core::DType::U8, &Device::Cpu).unwrap();
        assert!(tensor_to_image(&tensor).is_err());
    }
}

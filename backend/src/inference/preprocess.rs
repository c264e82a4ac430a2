use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{ImageReader, Limits};
use ndarray::Array4;

use super::InferenceError;
use crate::config::{IMG_HEIGHT, IMG_WIDTH, MAX_DECODE_ALLOC, MAX_IMAGE_DIMENSION};

pub fn validate_content_type(content_type: &str) -> Result<(), InferenceError> {
    if content_type.starts_with("image/") {
        Ok(())
    } else {
        Err(InferenceError::UnsupportedContentType(content_type.to_string()))
    }
}

/// Decodes `image` into a `(1, IMG_HEIGHT, IMG_WIDTH, 3)` tensor scaled to [0, 1].
pub fn preprocess(image: &[u8]) -> Result<Array4<f32>, InferenceError> {
    let mut reader = ImageReader::new(Cursor::new(image))
        .with_guessed_format()
        .map_err(|e| InferenceError::ImageDecode(e.into()))?;
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_IMAGE_DIMENSION);
    limits.max_image_height = Some(MAX_IMAGE_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    reader.limits(limits);

    let rgb = reader.decode()?.to_rgb8();
    let rgb = imageops::resize(&rgb, IMG_WIDTH, IMG_HEIGHT, FilterType::CatmullRom);

    let mut tensor = Array4::<f32>::zeros((1, IMG_HEIGHT as usize, IMG_WIDTH as usize, 3));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for (channel, value) in pixel.0.iter().enumerate() {
            tensor[[0, y as usize, x as usize, channel]] = f32::from(*value) / 255.0;
        }
    }

    Ok(tensor)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Luma, Rgba};

    pub(crate) fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());
        image.write_to(&mut bytes, format).unwrap();
        bytes.into_inner()
    }

    pub(crate) fn solid_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb(color));
        encode(DynamicImage::ImageRgb8(img), ImageFormat::Png)
    }

    #[test]
    fn content_type_must_be_image() {
        assert!(validate_content_type("image/png").is_ok());
        assert!(validate_content_type("image/jpeg").is_ok());
        assert!(matches!(
            validate_content_type("text/plain"),
            Err(InferenceError::UnsupportedContentType(_))
        ));
        assert!(validate_content_type("application/octet-stream").is_err());
    }

    #[test]
    fn output_has_batch_and_channel_dims() {
        let tensor = preprocess(&solid_png(40, 90, [255, 0, 51])).unwrap();
        assert_eq!(tensor.shape(), &[1, 150, 150, 3]);
        assert!((tensor[[0, 10, 20, 0]] - 1.0).abs() < 0.01);
        assert!(tensor[[0, 10, 20, 1]].abs() < 0.01);
        assert!((tensor[[0, 149, 149, 2]] - 0.2).abs() < 0.01);
    }

    #[test]
    fn alpha_channel_is_dropped() {
        let img = image::RgbaImage::from_pixel(20, 20, Rgba([10, 20, 30, 255]));
        let tensor = preprocess(&encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)).unwrap();
        assert_eq!(tensor.shape(), &[1, 150, 150, 3]);
        assert!((tensor[[0, 0, 0, 2]] - 30.0 / 255.0).abs() < 0.01);
    }

    #[test]
    fn grayscale_expands_to_rgb() {
        let img = image::GrayImage::from_pixel(300, 200, Luma([128]));
        let tensor = preprocess(&encode(DynamicImage::ImageLuma8(img), ImageFormat::Png)).unwrap();
        assert_eq!(tensor.shape(), &[1, 150, 150, 3]);
        assert!(tensor.iter().all(|v| (0.0..=1.0).contains(v)));
        assert_eq!(tensor[[0, 75, 75, 0]], tensor[[0, 75, 75, 2]]);
    }

    #[test]
    fn sixteen_bit_input_is_reduced_to_8bit_rgb() {
        let img = image::ImageBuffer::from_pixel(16, 16, Rgba([u16::MAX, 0, 0, u16::MAX]));
        let png = encode(DynamicImage::ImageRgba16(img), ImageFormat::Png);
        let tensor = preprocess(&png).unwrap();
        assert_eq!(tensor.shape(), &[1, 150, 150, 3]);
        assert!((tensor[[0, 5, 5, 0]] - 1.0).abs() < 0.01);
        assert!(tensor[[0, 5, 5, 1]].abs() < 0.01);
    }

    #[test]
    fn oversized_dimensions_are_refused() {
        let img = image::GrayImage::new(MAX_IMAGE_DIMENSION + 1, 1);
        let png = encode(DynamicImage::ImageLuma8(img), ImageFormat::Png);
        let err = preprocess(&png).unwrap_err();
        match err {
            InferenceError::ImageDecode(image::ImageError::Limits(_)) => {}
            other => panic!("expected a limits error, got {other}"),
        }
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = preprocess(b"definitely not an image").unwrap_err();
        assert!(matches!(err, InferenceError::ImageDecode(_)));
    }
}

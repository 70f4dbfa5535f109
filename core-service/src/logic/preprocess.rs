//! Image Preprocessing
//!
//! Decode → RGB → resize to the network input → scale to [0, 1] → normalize
//! with the dataset channel statistics. Output is an NCHW tensor with a batch
//! of one.

use image::{imageops::FilterType, DynamicImage, RgbImage};
use ndarray::Array4;

use crate::constants::{INPUT_MEAN, INPUT_RESIZE, INPUT_STD};
use super::error::ModelResult;

/// Decode an uploaded JPEG/PNG into RGB
pub fn decode_rgb(bytes: &[u8]) -> ModelResult<RgbImage> {
    let image = image::load_from_memory(bytes)?;
    Ok(image.to_rgb8())
}

/// Open an image from disk as RGB
pub fn open_rgb(path: &std::path::Path) -> ModelResult<RgbImage> {
    let image: DynamicImage = image::open(path)?;
    Ok(image.to_rgb8())
}

/// Normalized `(1, 3, INPUT_RESIZE, INPUT_RESIZE)` input tensor
pub fn to_input_tensor(image: &RgbImage) -> Array4<f32> {
    let side = INPUT_RESIZE;
    let resized = image::imageops::resize(image, side, side, FilterType::Triangle);

    let side = side as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, side, side));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            let scaled = pixel[c] as f32 / 255.0;
            tensor[[0, c, y as usize, x as usize]] = (scaled - INPUT_MEAN[c]) / INPUT_STD[c];
        }
    }
    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_tensor_shape_and_normalization() {
        let image = RgbImage::from_pixel(40, 30, Rgb([255, 0, 128]));
        let tensor = to_input_tensor(&image);

        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);

        let red = (1.0 - INPUT_MEAN[0]) / INPUT_STD[0];
        let green = (0.0 - INPUT_MEAN[1]) / INPUT_STD[1];
        assert!((tensor[[0, 0, 100, 100]] - red).abs() < 1e-4);
        assert!((tensor[[0, 1, 0, 223]] - green).abs() < 1e-4);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_rgb(b"definitely not an image").is_err());
    }

    #[test]
    fn test_decode_png_roundtrip() {
        let image = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_rgb(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (8, 8));
        assert_eq!(decoded.get_pixel(3, 3), &Rgb([10, 20, 30]));
    }
}

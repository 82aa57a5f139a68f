//! 图像解码、像素统计与模型输入归一化

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::imageops::FilterType;
use image::RgbImage;

use crate::core::PredictError;

/// 模型输入边长
pub const INPUT_SIZE: u32 = 224;

/// ImageNet 通道均值 / 标准差
const CHANNEL_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const CHANNEL_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// base64 → RGB 图像。接受 `data:<mime>;base64,` 前缀与首尾空白
pub fn decode_base64_image(encoded: &str) -> Result<RgbImage, PredictError> {
    let encoded = encoded.trim();
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };

    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| PredictError::ImageDecode(format!("base64: {e}")))?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| PredictError::ImageDecode(format!("container: {e}")))?
        .to_rgb8();

    if image.width() == 0 || image.height() == 0 {
        return Err(PredictError::ImageDecode("image has no pixels".to_string()));
    }
    Ok(image)
}

/// 启发式分类用的像素统计（0-255 标度）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelStats {
    /// 所有通道值的均值
    pub brightness: f64,
    /// 所有通道值的总体方差
    pub variance: f64,
    /// R 通道均值
    pub red_mean: f64,
}

impl PixelStats {
    /// 空图像或数值异常时返回 None
    pub fn compute(image: &RgbImage) -> Option<PixelStats> {
        let raw = image.as_raw();
        if raw.is_empty() || raw.len() % 3 != 0 {
            return None;
        }

        let n = raw.len() as f64;
        let brightness = raw.iter().map(|&v| v as f64).sum::<f64>() / n;
        let variance = raw
            .iter()
            .map(|&v| {
                let d = v as f64 - brightness;
                d * d
            })
            .sum::<f64>()
            / n;
        let red_mean = raw.iter().step_by(3).map(|&v| v as f64).sum::<f64>() / (n / 3.0);

        let stats = PixelStats {
            brightness,
            variance,
            red_mean,
        };
        stats.is_finite().then_some(stats)
    }

    fn is_finite(&self) -> bool {
        self.brightness.is_finite() && self.variance.is_finite() && self.red_mean.is_finite()
    }
}

/// 模型输入张量：CHW 布局，shape = [1, 3, 224, 224]
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub shape: [usize; 4],
    pub data: Vec<f32>,
}

impl NormalizedImage {
    /// 双线性缩放到 224×224，再按通道做均值/标准差归一化
    pub fn from_rgb(image: &RgbImage) -> NormalizedImage {
        let resized = image::imageops::resize(image, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
        let plane = (INPUT_SIZE * INPUT_SIZE) as usize;
        let mut data = vec![0.0f32; 3 * plane];

        for (i, pixel) in resized.pixels().enumerate() {
            for c in 0..3 {
                let v = pixel.0[c] as f32 / 255.0;
                data[c * plane + i] = (v - CHANNEL_MEAN[c]) / CHANNEL_STD[c];
            }
        }

        NormalizedImage {
            shape: [1, 3, INPUT_SIZE as usize, INPUT_SIZE as usize],
            data,
        }
    }
}

#[cfg(test)]
pub(crate) fn encode_png_base64(image: &RgbImage) -> String {
    let mut buf = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut buf, image::ImageFormat::Png)
        .expect("png encoding");
    STANDARD.encode(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_decode_png_roundtrip_dimensions() {
        let img = RgbImage::from_pixel(8, 4, Rgb([10, 20, 30]));
        let decoded = decode_base64_image(&encode_png_base64(&img)).unwrap();
        assert_eq!(decoded.dimensions(), (8, 4));
        assert_eq!(decoded.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_decode_accepts_data_url_prefix() {
        let img = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
        let data_url = format!("data:image/png;base64,{}\n", encode_png_base64(&img));
        assert!(decode_base64_image(&data_url).is_ok());
    }

    #[test]
    fn test_decode_rejects_bad_base64() {
        let err = decode_base64_image("not base64 at all!!").unwrap_err();
        assert!(matches!(err, PredictError::ImageDecode(_)));
    }

    #[test]
    fn test_decode_rejects_non_image_bytes() {
        let err = decode_base64_image(&STANDARD.encode(b"hello world")).unwrap_err();
        assert!(matches!(err, PredictError::ImageDecode(_)));
    }

    #[test]
    fn test_pixel_stats_uniform_image() {
        let img = RgbImage::from_pixel(4, 4, Rgb([200, 100, 0]));
        let stats = PixelStats::compute(&img).unwrap();
        assert!((stats.brightness - 100.0).abs() < 1e-9);
        assert!((stats.red_mean - 200.0).abs() < 1e-9);
        // 值为 {200, 100, 0}，总体方差 = 20000/3
        assert!((stats.variance - 20000.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_pixel_stats_empty_image() {
        let img = RgbImage::new(0, 0);
        assert_eq!(PixelStats::compute(&img), None);
    }

    #[test]
    fn test_normalized_shape_and_values() {
        let img = RgbImage::from_pixel(10, 30, Rgb([255, 0, 128]));
        let t = NormalizedImage::from_rgb(&img);
        assert_eq!(t.shape, [1, 3, 224, 224]);
        assert_eq!(t.data.len(), 3 * 224 * 224);
        let plane = 224 * 224;
        assert!((t.data[0] - (1.0 - 0.485) / 0.229).abs() < 0.02);
        assert!((t.data[plane] - (0.0 - 0.456) / 0.224).abs() < 0.02);
    }
}

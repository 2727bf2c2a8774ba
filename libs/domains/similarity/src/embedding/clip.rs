//! Resident CLIP vision encoder.
//!
//! The ONNX session is built once at startup and shared read-only by every
//! request; inference itself is compute-bound and runs on the blocking pool,
//! serialized behind the session mutex. The startup path runs a dummy
//! inference so a model whose output shape differs from the configured
//! dimensionality aborts the process instead of failing per request.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;

use super::extractor::ImageEmbedder;
use crate::error::{SimilarityError, SimilarityResult};
use crate::models::Embedding;

/// Channel statistics the CLIP image encoder was trained with.
const CLIP_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];
const CLIP_STD: [f32; 3] = [0.268_629_54, 0.261_302_58, 0.275_777_11];

/// Vision encoder configuration
#[derive(Debug, Clone)]
pub struct ClipConfig {
    /// Path to the vision encoder ONNX file
    pub model_path: PathBuf,
    /// Input resolution the encoder expects (square)
    pub input_size: u32,
    /// Embedding dimensionality the deployment is configured for
    pub dimension: usize,
    /// Intra-op threads for the ONNX session
    pub intra_threads: usize,
}

impl ClipConfig {
    pub fn new(model_path: PathBuf, dimension: usize) -> Self {
        Self {
            model_path,
            input_size: 224,
            dimension,
            intra_threads: 4,
        }
    }

    pub fn with_input_size(mut self, input_size: u32) -> Self {
        self.input_size = input_size;
        self
    }

    pub fn from_env() -> SimilarityResult<Self> {
        let model_path = PathBuf::from(core_config::env_required("CLIP_MODEL_PATH")?);
        let input_size = core_config::env_parse_or_default("CLIP_INPUT_SIZE", 224u32)?;
        let dimension = core_config::env_parse_or_default("EMBEDDING_DIMENSION", 512usize)?;
        let intra_threads = core_config::env_parse_or_default("CLIP_INTRA_THREADS", 4usize)?;

        Ok(Self {
            model_path,
            input_size,
            dimension,
            intra_threads,
        })
    }
}

struct SessionState {
    session: Session,
    input_name: String,
    output_name: String,
}

struct Inner {
    state: Mutex<SessionState>,
    dimension: usize,
    input_size: u32,
}

/// `ImageEmbedder` backed by a CLIP vision encoder loaded through ONNX Runtime.
pub struct ClipImageEmbedder {
    inner: Arc<Inner>,
}

impl ClipImageEmbedder {
    /// Load the vision encoder and verify its output dimensionality.
    ///
    /// Loading failure and a dimensionality mismatch are both fatal
    /// configuration errors: the service must not come up with a model it
    /// cannot trust.
    pub fn load(config: &ClipConfig) -> SimilarityResult<Self> {
        let session = Session::builder()
            .map_err(|e| SimilarityError::Config(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| SimilarityError::Config(e.to_string()))?
            .with_intra_threads(config.intra_threads)
            .map_err(|e| SimilarityError::Config(e.to_string()))?
            .commit_from_file(&config.model_path)
            .map_err(|e| {
                SimilarityError::Config(format!(
                    "failed to load vision model from {}: {}",
                    config.model_path.display(),
                    e
                ))
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "pixel_values".into());
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "image_embeds".into());

        let inner = Arc::new(Inner {
            state: Mutex::new(SessionState {
                session,
                input_name,
                output_name,
            }),
            dimension: config.dimension,
            input_size: config.input_size,
        });

        // Startup probe: a blank RGB frame through the real session. If the
        // model's output shape disagrees with the configured dimensionality,
        // no request must ever be served.
        let probe = DynamicImage::new_rgb8(config.input_size, config.input_size);
        let probe_out = inner
            .run_inference(&probe)
            .map_err(|e| SimilarityError::Config(format!("startup inference probe failed: {e}")))?;

        if probe_out.len() != config.dimension {
            return Err(SimilarityError::Config(format!(
                "vision model outputs {}-dimensional embeddings, deployment is configured for {}",
                probe_out.len(),
                config.dimension
            )));
        }

        tracing::info!(
            model = %config.model_path.display(),
            dimension = config.dimension,
            input_size = config.input_size,
            "vision encoder loaded and verified"
        );

        Ok(Self { inner })
    }
}

#[async_trait]
impl ImageEmbedder for ClipImageEmbedder {
    fn dimension(&self) -> usize {
        self.inner.dimension
    }

    async fn embed_image(&self, bytes: &[u8]) -> SimilarityResult<Embedding> {
        let inner = Arc::clone(&self.inner);
        let bytes = bytes.to_vec();

        tokio::task::spawn_blocking(move || inner.embed_bytes(&bytes))
            .await
            .map_err(|e| SimilarityError::Inference(format!("inference task failed: {e}")))?
    }
}

impl Inner {
    fn embed_bytes(&self, bytes: &[u8]) -> SimilarityResult<Embedding> {
        let image = decode_image(bytes)?;
        let raw = self.run_inference(&image)?;

        if raw.iter().any(|v| !v.is_finite()) {
            return Err(SimilarityError::Inference(
                "embedding contains non-finite values".to_string(),
            ));
        }

        let normalized = l2_normalize(&raw).ok_or_else(|| {
            SimilarityError::Inference("embedding has zero magnitude".to_string())
        })?;

        Ok(Embedding::new(normalized))
    }

    fn run_inference(&self, image: &DynamicImage) -> SimilarityResult<Vec<f32>> {
        let pixels = preprocess(image, self.input_size);

        let mut state = self
            .state
            .lock()
            .map_err(|_| SimilarityError::Inference("vision session lock poisoned".to_string()))?;
        let input_name = state.input_name.clone();
        let output_name = state.output_name.clone();

        let tensor = Tensor::from_array(pixels).map_err(|e| {
            SimilarityError::Inference(format!("failed to create input tensor: {e}"))
        })?;

        let outputs = state
            .session
            .run(ort::inputs![input_name => tensor])
            .map_err(|e| SimilarityError::Inference(format!("vision inference failed: {e}")))?;

        let output = outputs.get(&output_name).ok_or_else(|| {
            SimilarityError::Inference(format!("no output '{output_name}' from vision model"))
        })?;

        let (_shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| SimilarityError::Inference(format!("failed to extract embedding: {e}")))?;

        Ok(data.to_vec())
    }
}

/// Decode raw bytes into a raster image.
///
/// Any undecodable payload is a caller-input fault; the pipeline never
/// substitutes a zero vector for it.
fn decode_image(bytes: &[u8]) -> SimilarityResult<DynamicImage> {
    if bytes.is_empty() {
        return Err(SimilarityError::ImageDecode(
            "empty image payload".to_string(),
        ));
    }

    image::load_from_memory(bytes).map_err(|e| SimilarityError::ImageDecode(e.to_string()))
}

/// Resize shortest edge to `size`, center-crop to `size`×`size`, scale to
/// [0, 1] and normalize with the CLIP channel statistics, NCHW layout.
///
/// The conversion to RGB8 is mandatory: the encoder assumes a 3-channel
/// layout, whatever the source (grayscale, alpha-bearing, palette).
fn preprocess(image: &DynamicImage, size: u32) -> Array4<f32> {
    let rgb = image.to_rgb8();
    let (w, h) = rgb.dimensions();

    let scale = size as f32 / w.min(h).max(1) as f32;
    let new_w = ((w as f32) * scale).round().max(size as f32) as u32;
    let new_h = ((h as f32) * scale).round().max(size as f32) as u32;
    let resized = DynamicImage::ImageRgb8(rgb)
        .resize_exact(new_w, new_h, FilterType::Triangle)
        .to_rgb8();

    let start_x = (resized.width().saturating_sub(size)) / 2;
    let start_y = (resized.height().saturating_sub(size)) / 2;

    let mut array = Array4::<f32>::zeros((1, 3, size as usize, size as usize));

    for y in 0..size as usize {
        for x in 0..size as usize {
            let pixel = resized.get_pixel(start_x + x as u32, start_y + y as u32);
            for c in 0..3 {
                let value = pixel[c] as f32 / 255.0;
                array[[0, c, y, x]] = (value - CLIP_MEAN[c]) / CLIP_STD[c];
            }
        }
    }

    array
}

/// L2 normalize a vector (unit length). `None` for degenerate magnitudes.
fn l2_normalize(v: &[f32]) -> Option<Vec<f32>> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm.is_finite() && norm > 1e-10 {
        Some(v.iter().map(|x| x / norm).collect())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Luma, Rgb};
    use std::io::Cursor;

    fn png_bytes(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_decode_rejects_empty_payload() {
        let err = decode_image(&[]).unwrap_err();
        assert!(matches!(err, SimilarityError::ImageDecode(_)));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, SimilarityError::ImageDecode(_)));
    }

    #[test]
    fn test_decode_accepts_png() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(8, 8, Rgb([10, 20, 30])));
        let decoded = decode_image(&png_bytes(image)).unwrap();
        assert_eq!(decoded.width(), 8);
    }

    #[test]
    fn test_preprocess_produces_nchw_tensor() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(640, 480, Rgb([255, 0, 0])));
        let tensor = preprocess(&image, 224);
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
    }

    #[test]
    fn test_preprocess_normalizes_grayscale_to_three_channels() {
        // A single-channel source must still produce a full 3-channel tensor.
        let image = DynamicImage::ImageLuma8(ImageBuffer::from_pixel(100, 300, Luma([128])));
        let tensor = preprocess(&image, 224);
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);

        let expected = (128.0 / 255.0 - CLIP_MEAN[0]) / CLIP_STD[0];
        assert!((tensor[[0, 0, 0, 0]] - expected).abs() < 1e-5);
    }

    #[test]
    fn test_preprocess_applies_channel_statistics() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(224, 224, Rgb([0, 0, 0])));
        let tensor = preprocess(&image, 224);

        for c in 0..3 {
            let expected = (0.0 - CLIP_MEAN[c]) / CLIP_STD[c];
            assert!((tensor[[0, c, 10, 10]] - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_preprocess_handles_tiny_images() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(3, 7, Rgb([50, 60, 70])));
        let tensor = preprocess(&image, 224);
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
    }

    #[test]
    fn test_l2_normalize_unit_length() {
        let normalized = l2_normalize(&[3.0, 4.0]).unwrap();
        assert!((normalized[0] - 0.6).abs() < 1e-6);
        assert!((normalized[1] - 0.8).abs() < 1e-6);

        let norm: f32 = normalized.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_l2_normalize_rejects_zero_vector() {
        assert!(l2_normalize(&[0.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn test_config_from_env_requires_model_path() {
        temp_env::with_var_unset("CLIP_MODEL_PATH", || {
            let err = ClipConfig::from_env().unwrap_err();
            assert!(matches!(err, SimilarityError::Config(_)));
        });
    }

    #[test]
    fn test_config_from_env_defaults() {
        temp_env::with_vars(
            [
                ("CLIP_MODEL_PATH", Some("/models/vision.onnx")),
                ("CLIP_INPUT_SIZE", None),
                ("EMBEDDING_DIMENSION", None),
                ("CLIP_INTRA_THREADS", None),
            ],
            || {
                let config = ClipConfig::from_env().unwrap();
                assert_eq!(config.model_path, PathBuf::from("/models/vision.onnx"));
                assert_eq!(config.input_size, 224);
                assert_eq!(config.dimension, 512);
                assert_eq!(config.intra_threads, 4);
            },
        );
    }

    #[test]
    fn test_config_from_env_overrides() {
        temp_env::with_vars(
            [
                ("CLIP_MODEL_PATH", Some("/models/vision.onnx")),
                ("CLIP_INPUT_SIZE", Some("256")),
                ("EMBEDDING_DIMENSION", Some("768")),
            ],
            || {
                let config = ClipConfig::from_env().unwrap();
                assert_eq!(config.input_size, 256);
                assert_eq!(config.dimension, 768);
            },
        );
    }
}

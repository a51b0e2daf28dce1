//! ContentVec feature extraction

use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use ndarray::Array3;
use ort::session::Session;
use ort::value::Value;
use tracing::info;

use super::ExecutionBackend;

/// Channel count of the ContentVec feature space
pub const FEATURE_CHANNELS: usize = 768;

/// Acoustic feature extraction from a 16 kHz waveform.
///
/// Stateless per call; the returned tensor is channel-major `[1, 768, T]`.
pub trait FeatureExtractor {
    /// Extract features for one segment of 16 kHz audio
    fn extract(&self, wav16k: &[f32]) -> Result<Array3<f32>>;
}

/// ONNX-backed ContentVec (vec-768-layer-12) session
pub struct OnnxFeatureExtractor {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxFeatureExtractor {
    /// Load a ContentVec export and build a session on the chosen backend
    pub fn load<P: AsRef<Path>>(path: P, backend: ExecutionBackend) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading feature extractor from {:?}", path);

        let session = Session::builder()?
            .with_execution_providers([backend.provider()])?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load feature extractor: {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .ok_or_else(|| anyhow!("Feature extractor has no inputs"))?
            .name
            .clone();
        let output_name = session
            .outputs
            .first()
            .ok_or_else(|| anyhow!("Feature extractor has no outputs"))?
            .name
            .clone();

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
        })
    }
}

impl FeatureExtractor for OnnxFeatureExtractor {
    fn extract(&self, wav16k: &[f32]) -> Result<Array3<f32>> {
        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Feature extractor session poisoned: {}", e))?;

        let input: Value = Value::from_array((vec![1_usize, 1, wav16k.len()], wav16k.to_vec()))?.into();
        let outputs = session.run(vec![(self.input_name.as_str(), input)])?;

        let value = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| anyhow!("Output '{}' missing from extractor", self.output_name))?;
        let (shape, data) = value.try_extract_tensor::<f32>()?;

        // ContentVec emits [1, T, 768]; callers expect channel-major [1, 768, T].
        anyhow::ensure!(
            shape.len() == 3 && shape[0] == 1 && shape[2] == FEATURE_CHANNELS as i64,
            "Unexpected feature tensor shape: {:?}",
            shape
        );
        let frames = shape[1] as usize;

        Ok(Array3::from_shape_fn((1, FEATURE_CHANNELS, frames), |(_, c, t)| {
            data[t * FEATURE_CHANNELS + c]
        }))
    }
}

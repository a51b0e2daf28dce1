//! RVC voice-conversion model

use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use ort::session::Session;
use ort::value::Value;
use tracing::info;

use super::ExecutionBackend;
use crate::inference::Conditioning;

/// One segment of voice conversion: conditioning bundle in, raw PCM out.
///
/// Implementations are read-only after construction and safe to share across
/// segment calls.
pub trait VoiceConverter {
    /// Run the model on one conditioning bundle and return 16-bit PCM
    fn convert(&self, conditioning: &Conditioning) -> Result<Vec<i16>>;
}

/// ONNX-backed RVC synthesizer session.
///
/// The pretrained export declares six inputs (features, feature length, pitch
/// classes, pitch Hz, speaker id, latent noise) whose names vary between
/// exports; values are bound positionally by declared name.
pub struct OnnxVoiceConverter {
    session: Mutex<Session>,
    input_names: Vec<String>,
    output_name: String,
}

impl OnnxVoiceConverter {
    /// Load an RVC export and build a session on the chosen backend
    pub fn load<P: AsRef<Path>>(path: P, backend: ExecutionBackend) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading voice-conversion model from {:?}", path);

        let session = Session::builder()?
            .with_execution_providers([backend.provider()])?
            .commit_from_file(path)
            .with_context(|| format!("Failed to load model: {:?}", path))?;

        let input_names: Vec<String> =
            session.inputs.iter().map(|i| i.name.clone()).collect();
        anyhow::ensure!(
            input_names.len() == 6,
            "RVC export must declare 6 inputs, found {}",
            input_names.len()
        );
        let output_name = session
            .outputs
            .first()
            .ok_or_else(|| anyhow!("Model has no outputs"))?
            .name
            .clone();

        Ok(Self {
            session: Mutex::new(session),
            input_names,
            output_name,
        })
    }
}

impl VoiceConverter for OnnxVoiceConverter {
    fn convert(&self, conditioning: &Conditioning) -> Result<Vec<i16>> {
        let frames = conditioning.frames();
        let (_, channels, _) = conditioning.latent.dim();

        let features: Value = Value::from_array((
            vec![1_usize, frames, conditioning.features.dim().2],
            conditioning.features.iter().copied().collect::<Vec<f32>>(),
        ))?
        .into();
        let feature_len: Value =
            Value::from_array((vec![1_usize], vec![conditioning.feature_len]))?.into();
        let pitch: Value = Value::from_array((
            vec![1_usize, frames],
            conditioning.pitch_classes.clone(),
        ))?
        .into();
        let pitchf: Value =
            Value::from_array((vec![1_usize, frames], conditioning.pitch_hz.clone()))?.into();
        let speaker: Value =
            Value::from_array((vec![1_usize], vec![conditioning.speaker]))?.into();
        let latent: Value = Value::from_array((
            vec![1_usize, channels, frames],
            conditioning.latent.iter().copied().collect::<Vec<f32>>(),
        ))?
        .into();

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Model session poisoned: {}", e))?;
        let outputs = session.run(vec![
            (self.input_names[0].as_str(), features),
            (self.input_names[1].as_str(), feature_len),
            (self.input_names[2].as_str(), pitch),
            (self.input_names[3].as_str(), pitchf),
            (self.input_names[4].as_str(), speaker),
            (self.input_names[5].as_str(), latent),
        ])?;

        let value = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| anyhow!("Output '{}' missing from model", self.output_name))?;
        let (_shape, data) = value.try_extract_tensor::<f32>()?;

        Ok(data.iter().map(|&x| (x * 32767.0) as i16).collect())
    }
}

//! Inference capabilities behind narrow traits
//!
//! The orchestrator depends only on [`FeatureExtractor`] and
//! [`VoiceConverter`]; the ONNX Runtime implementations here wrap pretrained
//! ContentVec and RVC exports. Backend selection happens once at session
//! construction, never per call.

mod backend;
mod converter;
mod features;

pub use backend::ExecutionBackend;
pub use converter::{OnnxVoiceConverter, VoiceConverter};
pub use features::{FeatureExtractor, OnnxFeatureExtractor, FEATURE_CHANNELS};

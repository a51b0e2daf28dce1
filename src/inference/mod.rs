//! Inference orchestration
//!
//! - RvcPipeline: whole-file and single-segment voice conversion
//! - ConditioningBuilder: tensor bundle construction for the model
//! - SegmentTiming: per-segment wall-clock report

mod conditioning;
mod pipeline;

pub use conditioning::{Conditioning, ConditioningBuilder};
pub use pipeline::{RvcPipeline, SegmentTiming};

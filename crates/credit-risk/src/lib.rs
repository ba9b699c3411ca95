//! Credit risk scoring: applicant intake, feature assembly, and a thresholded
//! classifier verdict backed by an externally trained artifact bundle.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;

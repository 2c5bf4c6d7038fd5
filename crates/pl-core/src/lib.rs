/// Configuration, types, and shared structures for pachylog.
///
/// This crate contains all shared types, traits, and configuration logic
/// used across the pachylog workspace.

pub mod config;
pub mod error;
pub mod feature;
pub mod source;

pub use config::DetectorConfig;
pub use error::{CoreError, SourceError};
pub use feature::{Classification, FeatureVector, Label, LabeledSample};
pub use source::SampleSource;

/// Taille d'une frame d'analyse, en échantillons.
pub const FRAME_SIZE: usize = 256;

/// Nombre de scalaires par vecteur de features.
pub const FEATURE_DIM: usize = 8;

/// Pleine échelle d'un échantillon i16, diviseur de normalisation.
pub const FULL_SCALE: f32 = 32768.0;

/// Chaîne de traitement du signal pour pachylog.
///
/// Per-sample chain (bias removal, single-pole low-pass, frame assembly)
/// plus the per-frame spectral feature extraction. Everything here is
/// allocation-free after construction: the hot path runs once per sample
/// at the acquisition rate.

pub mod assembler;
pub mod bias;
pub mod features;
pub mod fft;
pub mod filter;
pub mod pipeline;

pub use assembler::FrameAssembler;
pub use bias::BiasTracker;
pub use features::FeatureExtractor;
pub use fft::FftPipeline;
pub use filter::SinglePoleLowPass;
pub use pipeline::AudioPipeline;

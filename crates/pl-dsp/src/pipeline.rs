use pl_core::{DetectorConfig, FeatureVector};

use crate::assembler::FrameAssembler;
use crate::bias::BiasTracker;
use crate::features::FeatureExtractor;
use crate::filter::SinglePoleLowPass;

/// Chaîne complète par échantillon : biais DC → passe-bas → assembleur →
/// extraction sur frame complète.
///
/// L'extraction se fait immédiatement sur le front de wrap, dans le même
/// appel : la frame k est entièrement extraite avant que la frame k+1 ne
/// commence à s'accumuler (garantie d'ordre de la boucle mono-thread).
///
/// # Example
/// ```
/// use pl_core::{DetectorConfig, FRAME_SIZE};
/// use pl_dsp::pipeline::AudioPipeline;
///
/// let mut pipeline = AudioPipeline::new(&DetectorConfig::default());
/// let mut frames = 0;
/// for _ in 0..FRAME_SIZE * 2 {
///     if pipeline.push_sample(0).is_some() {
///         frames += 1;
///     }
/// }
/// assert_eq!(frames, 2);
/// ```
pub struct AudioPipeline {
    bias: BiasTracker,
    filter: SinglePoleLowPass,
    assembler: FrameAssembler,
    extractor: FeatureExtractor,
    samples_seen: u64,
}

impl AudioPipeline {
    /// Build the full per-sample chain from configuration.
    #[must_use]
    pub fn new(config: &DetectorConfig) -> Self {
        log::debug!(
            "Pipeline audio : {} Hz, coupure {} Hz, bandes {:?}",
            config.sample_rate_hz,
            config.filter_cutoff_hz,
            config.band_edges_hz
        );
        Self {
            bias: BiasTracker::new(config.bias_alpha),
            filter: SinglePoleLowPass::new(config.filter_cutoff_hz, config.sample_rate_hz),
            assembler: FrameAssembler::new(),
            extractor: FeatureExtractor::new(config.sample_rate_hz, config.band_edges_hz),
            samples_seen: 0,
        }
    }

    /// Pousse un échantillon brut dans la chaîne.
    ///
    /// Retourne `Some(vecteur)` exactement une fois toutes les N frames —
    /// sur le front de complétion de frame — sinon `None`.
    pub fn push_sample(&mut self, raw: i16) -> Option<FeatureVector> {
        self.samples_seen += 1;
        let centered = self.bias.process(raw);
        let filtered = self.filter.process(centered);
        if self.assembler.push(filtered) {
            let frame = self.assembler.take_frame()?;
            return Some(self.extractor.extract(frame));
        }
        None
    }

    /// Nombre total d'échantillons ingérés depuis le démarrage.
    #[must_use]
    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }
}

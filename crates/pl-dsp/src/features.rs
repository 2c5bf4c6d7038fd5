use pl_core::{FRAME_SIZE, FULL_SCALE, FeatureVector};

use crate::fft::FftPipeline;

/// Extracteur de features spectrales, avec état pour le flux.
///
/// Garde le spectre de puissance de la frame précédente pour le flux
/// spectral (0.0 sur la toute première frame — transitoire accepté, il
/// biaise la première classification une seule fois par process).
///
/// Hot path sans allocation : FFT, buffers de normalisation et de spectre
/// précédent sont pré-alloués dans le constructeur.
///
/// # Example
/// ```
/// use pl_dsp::features::FeatureExtractor;
/// let mut extractor = FeatureExtractor::new(1000, [10.0, 40.0, 100.0, 200.0]);
/// let frame = [0.0f32; 256];
/// let v = extractor.extract(&frame);
/// assert!(v.rms.abs() < f32::EPSILON);
/// ```
pub struct FeatureExtractor {
    fft: FftPipeline,
    normalized: [f32; FRAME_SIZE],
    prev_power: Vec<f32>,
    has_prev: bool,
    bin_hz: f32,
    band_edges_hz: [f32; 4],
}

impl FeatureExtractor {
    /// Create an extractor for the given sample rate and band edges.
    #[must_use]
    pub fn new(sample_rate_hz: u32, band_edges_hz: [f32; 4]) -> Self {
        Self {
            fft: FftPipeline::new(FRAME_SIZE),
            normalized: [0.0; FRAME_SIZE],
            prev_power: vec![0.0; FRAME_SIZE / 2],
            has_prev: false,
            bin_hz: sample_rate_hz as f32 / FRAME_SIZE as f32,
            band_edges_hz,
        }
    }

    /// Extrait le vecteur de 8 features d'une frame complète.
    ///
    /// Déterministe et total : une même frame donne toujours le même
    /// vecteur (modulo l'état de flux).
    pub fn extract(&mut self, frame: &[f32; FRAME_SIZE]) -> FeatureVector {
        // 1. Normalisation pleine échelle.
        for (slot, &x) in self.normalized.iter_mut().zip(frame.iter()) {
            *slot = x / FULL_SCALE;
        }

        // 2. RMS et enveloppe sur les échantillons PRÉ-fenêtrage.
        let sum_sq: f32 = self.normalized.iter().map(|s| s * s).sum();
        let rms = (sum_sq / FRAME_SIZE as f32).sqrt();
        let envelope = self.normalized.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // 3. Fenêtre de Hamming + FFT → N/2 bins de puissance.
        let power = self.fft.process(&self.normalized);

        // 4a. Centroïde spectral (pondéré par la puissance).
        let total: f32 = power.iter().sum();
        let centroid_hz = if total > 1e-12 {
            let weighted: f32 = power
                .iter()
                .enumerate()
                .map(|(i, &p)| i as f32 * self.bin_hz * p)
                .sum();
            weighted / total
        } else {
            0.0
        };

        // 4b. Énergies des trois bandes contiguës.
        let edges = self.band_edges_hz;
        let infrasound = band_power(power, edges[0], edges[1], self.bin_hz);
        let band_low = band_power(power, edges[1], edges[2], self.bin_hz);
        let band_mid = band_power(power, edges[2], edges[3], self.bin_hz);

        // 4c. Fréquence dominante, DC exclu.
        let mut dominant_hz = 0.0;
        let mut max_power = 0.0;
        for (i, &p) in power.iter().enumerate().skip(1) {
            if p > max_power {
                max_power = p;
                dominant_hz = i as f32 * self.bin_hz;
            }
        }

        // 4d. Flux spectral contre la frame précédente.
        let flux = if self.has_prev {
            power
                .iter()
                .zip(self.prev_power.iter())
                .map(|(&p, &q)| (p - q).abs())
                .sum()
        } else {
            0.0
        };
        self.prev_power.copy_from_slice(power);
        self.has_prev = true;

        FeatureVector {
            rms,
            centroid_hz,
            infrasound,
            band_low,
            band_mid,
            dominant_hz,
            envelope,
            flux,
        }
    }

    /// Largeur d'un bin de fréquence, en Hz.
    #[must_use]
    pub fn bin_hz(&self) -> f32 {
        self.bin_hz
    }
}

/// Somme de la puissance dans une bande [low_hz, high_hz).
fn band_power(power: &[f32], low_hz: f32, high_hz: f32, bin_hz: f32) -> f32 {
    let lo = (low_hz / bin_hz) as usize;
    let hi = ((high_hz / bin_hz) as usize).min(power.len());
    if lo >= hi {
        return 0.0;
    }
    power[lo..hi].iter().sum()
}

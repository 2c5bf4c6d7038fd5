use realfft::RealFftPlanner;

/// FFT pipeline: windowed real FFT using realfft.
///
/// Pre-allocates the FFT plan and scratch buffers for zero-allocation hot
/// path. Applique une fenêtre de Hamming (`0.54 − 0.46·cos(2πn/(N−1))`)
/// et produit N/2 bins de puissance, bin i couvrant `i × fs / N` Hz.
///
/// # Example
/// ```
/// use pl_dsp::fft::FftPipeline;
/// let mut fft = FftPipeline::new(256);
/// let frame = [0.0f32; 256];
/// assert_eq!(fft.process(&frame).len(), 128); // N/2
/// ```
pub struct FftPipeline {
    fft_size: usize,
    input_buf: Vec<f32>,
    spectrum_buf: Vec<realfft::num_complex::Complex<f32>>,
    scratch: Vec<realfft::num_complex::Complex<f32>>,
    power_buf: Vec<f32>,
    plan: std::sync::Arc<dyn realfft::RealToComplex<f32>>,
    /// Hamming window coefficients.
    window: Vec<f32>,
}

impl FftPipeline {
    /// Create a new FFT pipeline with the given window size.
    ///
    /// # Panics
    /// Panics if `size` is 0.
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "FFT size must be > 0");

        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(size);

        let input_buf = plan.make_input_vec();
        let spectrum_buf = plan.make_output_vec();
        let scratch = plan.make_scratch_vec();

        // Hamming window
        let window: Vec<f32> = (0..size)
            .map(|i| {
                0.54 - 0.46
                    * (2.0 * std::f32::consts::PI * i as f32 / (size as f32 - 1.0)).cos()
            })
            .collect();

        Self {
            fft_size: size,
            input_buf,
            spectrum_buf,
            scratch,
            power_buf: vec![0.0; size / 2],
            plan,
            window,
        }
    }

    /// Process `samples` through windowed FFT.
    ///
    /// Retourne les N/2 bins de puissance `(re² + im²) / N²` (le bin de
    /// Nyquist est ignoré). Sur échec interne du plan FFT, retourne un
    /// spectre nul plutôt que de propager — la frame est perdue, pas la
    /// boucle.
    pub fn process(&mut self, samples: &[f32]) -> &[f32] {
        let n = self.fft_size.min(samples.len());

        // Copy and window
        for (i, slot) in self.input_buf.iter_mut().enumerate() {
            *slot = if i < n {
                samples[i] * self.window[i]
            } else {
                0.0
            };
        }

        // Forward FFT
        if self
            .plan
            .process_with_scratch(&mut self.input_buf, &mut self.spectrum_buf, &mut self.scratch)
            .is_err()
        {
            self.power_buf.fill(0.0);
            return &self.power_buf;
        }

        // Power, normalisée par N²
        let scale = 1.0 / (self.fft_size as f32 * self.fft_size as f32);
        for (slot, c) in self.power_buf.iter_mut().zip(self.spectrum_buf.iter()) {
            *slot = (c.re * c.re + c.im * c.im) * scale;
        }
        &self.power_buf
    }

    /// FFT window size.
    #[must_use]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_frame_gives_zero_spectrum() {
        let mut fft = FftPipeline::new(256);
        let frame = [0.0f32; 256];
        assert!(fft.process(&frame).iter().all(|&p| p == 0.0));
    }

    #[test]
    fn hamming_endpoints() {
        let fft = FftPipeline::new(256);
        // w[0] = 0.54 − 0.46 = 0.08, w[N−1] idem
        assert!((fft.window[0] - 0.08).abs() < 1e-5);
        assert!((fft.window[255] - 0.08).abs() < 1e-4);
        // w au centre proche de 1.0
        assert!(fft.window[127] > 0.99);
    }

    #[test]
    fn sinusoid_concentrates_in_its_bin() {
        let mut fft = FftPipeline::new(256);
        // 62,5 Hz à fs = 1 kHz : bin 16 exactement (62,5 / (1000/256))
        let frame: Vec<f32> = (0..256)
            .map(|i| (2.0 * std::f32::consts::PI * 62.5 * i as f32 / 1000.0).sin())
            .collect();
        let power = fft.process(&frame);
        let peak = power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0);
        assert_eq!(peak, 16, "peak should land on the sinusoid's bin");
    }

    #[test]
    fn dc_frame_concentrates_in_bin_zero() {
        let mut fft = FftPipeline::new(256);
        let frame = [1.0f32; 256];
        let power = fft.process(&frame);
        let dc = power[0];
        assert!(dc > 0.0);
        // Tout sauf la fuite de fenêtre est dans le bin 0.
        let rest: f32 = power[4..].iter().sum();
        assert!(rest < dc * 0.01, "energy should concentrate at DC");
    }
}

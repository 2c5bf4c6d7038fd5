use std::f32::consts::PI;

/// Passe-bas à un pôle : `y[n] = α·x[n] + (1−α)·y[n−1]`.
///
/// `α = dt / (RC + dt)` avec `RC = 1 / (2π·f_c)`. La coupure par défaut
/// (200 Hz) laisse passer toute la bande cible du rumble en rejetant le
/// bruit proche du taux d'échantillonnage.
///
/// L'état persiste entre les frames et ne se réinitialise jamais : le
/// transitoire du filtre n'arrive qu'une fois, au démarrage à froid.
///
/// # Example
/// ```
/// use pl_dsp::filter::SinglePoleLowPass;
/// let mut filter = SinglePoleLowPass::new(200.0, 1000);
/// let y = filter.process(100.0);
/// assert!(y > 0.0 && y < 100.0);
/// ```
pub struct SinglePoleLowPass {
    alpha: f32,
    prev: f32,
}

impl SinglePoleLowPass {
    /// Create a low-pass filter for the given cutoff and sample rate.
    #[must_use]
    pub fn new(cutoff_hz: f32, sample_rate_hz: u32) -> Self {
        let dt = 1.0 / sample_rate_hz.max(1) as f32;
        let rc = 1.0 / (2.0 * PI * cutoff_hz.max(0.01));
        Self {
            alpha: dt / (rc + dt),
            prev: 0.0,
        }
    }

    /// Filtre un échantillon, met à jour l'état.
    #[inline(always)]
    pub fn process(&mut self, x: f32) -> f32 {
        self.prev = self.alpha * x + (1.0 - self.alpha) * self.prev;
        self.prev
    }

    /// Coefficient α du filtre.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_formula() {
        // fc = 200 Hz, fs = 1 kHz : RC ≈ 0.000796 s, dt = 0.001 s
        let filter = SinglePoleLowPass::new(200.0, 1000);
        let rc = 1.0 / (2.0 * PI * 200.0);
        let expected = 0.001 / (rc + 0.001);
        assert!((filter.alpha() - expected).abs() < 1e-6);
    }

    #[test]
    fn bounded_input_gives_bounded_output() {
        let mut filter = SinglePoleLowPass::new(200.0, 1000);
        let mut max_abs: f32 = 0.0;
        for i in 0..10_000 {
            let x = if i % 2 == 0 { 1000.0 } else { -1000.0 };
            max_abs = max_abs.max(filter.process(x).abs());
        }
        assert!(max_abs <= 1000.0, "output must stay within input bounds");
    }

    #[test]
    fn converges_to_constant_input() {
        let mut filter = SinglePoleLowPass::new(200.0, 1000);
        let mut y = 0.0;
        for _ in 0..1_000 {
            y = filter.process(500.0);
        }
        assert!(
            (y - 500.0).abs() < 0.5,
            "constant input should converge to its value, got {y}"
        );
    }

    #[test]
    fn state_persists_across_calls() {
        let mut filter = SinglePoleLowPass::new(200.0, 1000);
        let y1 = filter.process(100.0);
        let y2 = filter.process(100.0);
        assert!(y2 > y1, "second step continues the transient");
    }
}

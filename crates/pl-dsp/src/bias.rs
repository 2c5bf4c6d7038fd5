/// Tracker de biais DC : moyenne mobile exponentielle soustraite du signal brut.
///
/// `mean += alpha * (x - mean)` à chaque échantillon brut, sortie = `x - mean`.
/// L'état ne se réinitialise JAMAIS après construction : le tracker suit
/// lentement les dérives (biais thermique de l'ADC) sans déformer la bande
/// utile.
///
/// # Example
/// ```
/// use pl_dsp::bias::BiasTracker;
/// let mut tracker = BiasTracker::new(0.01);
/// for _ in 0..10_000 {
///     tracker.process(512);
/// }
/// assert!(tracker.mean() > 500.0);
/// ```
pub struct BiasTracker {
    alpha: f32,
    mean: f32,
}

impl BiasTracker {
    /// Create a tracker with the given update rate.
    #[must_use]
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0001, 1.0),
            mean: 0.0,
        }
    }

    /// Met à jour la moyenne et retourne l'échantillon recentré.
    #[inline(always)]
    pub fn process(&mut self, raw: i16) -> f32 {
        let x = f32::from(raw);
        self.mean += self.alpha * (x - self.mean);
        x - self.mean
    }

    /// Biais DC courant estimé.
    #[must_use]
    pub fn mean(&self) -> f32 {
        self.mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_to_constant_input() {
        let mut tracker = BiasTracker::new(0.01);
        let mut out = 0.0;
        for _ in 0..5_000 {
            out = tracker.process(1000);
        }
        assert!(
            (tracker.mean() - 1000.0).abs() < 1.0,
            "mean should converge to the constant input, got {}",
            tracker.mean()
        );
        assert!(out.abs() < 1.0, "centered output should approach zero");
    }

    #[test]
    fn zero_input_stays_zero() {
        let mut tracker = BiasTracker::new(0.001);
        for _ in 0..1_000 {
            let out = tracker.process(0);
            assert!(out.abs() < f32::EPSILON);
        }
    }

    #[test]
    fn slow_drift_is_followed() {
        let mut tracker = BiasTracker::new(0.01);
        for _ in 0..5_000 {
            tracker.process(100);
        }
        for _ in 0..5_000 {
            tracker.process(200);
        }
        assert!(
            (tracker.mean() - 200.0).abs() < 2.0,
            "tracker should follow a step in bias"
        );
    }
}

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration complète du détecteur.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine,
/// calée sur le matériel d'origine (micro analogique échantillonné à 1 kHz).
///
/// # Example
/// ```
/// use pl_core::config::DetectorConfig;
/// let config = DetectorConfig::default();
/// assert_eq!(config.sample_rate_hz, 1000);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DetectorConfig {
    // === Acquisition & filtrage ===
    /// Taux d'échantillonnage en Hz.
    pub sample_rate_hz: u32,
    /// Fréquence de coupure du passe-bas à un pôle, en Hz.
    pub filter_cutoff_hz: f32,
    /// Taux de mise à jour du tracker de biais DC [0.0001, 0.1].
    pub bias_alpha: f32,
    /// Bords des trois bandes d'analyse, en Hz, croissants.
    /// Défaut : infrasons 10–40, basse 40–100, médiane 100–200.
    pub band_edges_hz: [f32; 4],

    // === Classifieur ===
    /// Nombre de voisins k (impair, ≥ 1).
    pub knn_k: usize,
    /// Diviseur de normalisation des dimensions fréquentielles, en Hz.
    pub freq_norm_hz: f32,
    /// Capacité du training set (éviction FIFO au-delà).
    pub dataset_capacity: usize,

    // === Protocole ===
    /// Intervalle minimal entre deux émissions FEATURES/CLASSIFICATION, en ms.
    pub feature_interval_ms: u64,
    /// Intervalle du heartbeat STATUS, en ms.
    pub status_interval_ms: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 1000,
            filter_cutoff_hz: 200.0,
            bias_alpha: 0.001,
            band_edges_hz: [10.0, 40.0, 100.0, 200.0],
            knn_k: 5,
            freq_norm_hz: 100.0,
            dataset_capacity: 1000,
            feature_interval_ms: 800,
            status_interval_ms: 5000,
        }
    }
}

impl DetectorConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.sample_rate_hz = self.sample_rate_hz.clamp(125, 8000);
        let nyquist = self.sample_rate_hz as f32 / 2.0;
        self.filter_cutoff_hz = self.filter_cutoff_hz.clamp(1.0, nyquist);
        self.bias_alpha = self.bias_alpha.clamp(0.0001, 0.1);
        self.knn_k = self.knn_k.clamp(1, 99);
        if self.knn_k.is_multiple_of(2) {
            self.knn_k += 1; // k doit rester impair pour le vote majoritaire
        }
        self.freq_norm_hz = self.freq_norm_hz.clamp(1.0, nyquist);
        self.dataset_capacity = self.dataset_capacity.clamp(1, 10_000);
        self.feature_interval_ms = self.feature_interval_ms.clamp(50, 60_000);
        self.status_interval_ms = self.status_interval_ms.clamp(500, 600_000);

        // Bords de bande : croissants et sous Nyquist, sinon retour au défaut.
        let edges = &mut self.band_edges_hz;
        let monotonic = edges.windows(2).all(|w| w[0] < w[1]);
        if !monotonic || edges[0] < 0.0 || edges[3] > nyquist {
            log::warn!(
                "band_edges_hz invalides ({edges:?}), retour aux valeurs par défaut"
            );
            *edges = Self::default().band_edges_hz;
        }
    }

    /// Période d'un tick d'échantillonnage.
    #[must_use]
    pub fn sample_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / f64::from(self.sample_rate_hz.max(1)))
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    audio: Option<AudioSection>,
    classifier: Option<ClassifierSection>,
    protocol: Option<ProtocolSection>,
}

/// Audio section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct AudioSection {
    sample_rate_hz: Option<u32>,
    filter_cutoff_hz: Option<f32>,
    bias_alpha: Option<f32>,
    band_edges_hz: Option<[f32; 4]>,
}

/// Classifier section of the TOML config, all fields optional.
#[derive(Deserialize)]
struct ClassifierSection {
    knn_k: Option<usize>,
    freq_norm_hz: Option<f32>,
    dataset_capacity: Option<usize>,
}

/// Protocol section of the TOML config, all fields optional.
#[derive(Deserialize)]
struct ProtocolSection {
    feature_interval_ms: Option<u64>,
    status_interval_ms: Option<u64>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use pl_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<DetectorConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;

    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))?;

    let mut config = DetectorConfig::default();

    if let Some(a) = file.audio {
        if let Some(v) = a.sample_rate_hz {
            config.sample_rate_hz = v;
        }
        if let Some(v) = a.filter_cutoff_hz {
            config.filter_cutoff_hz = v;
        }
        if let Some(v) = a.bias_alpha {
            config.bias_alpha = v;
        }
        if let Some(v) = a.band_edges_hz {
            config.band_edges_hz = v;
        }
    }

    if let Some(c) = file.classifier {
        if let Some(v) = c.knn_k {
            config.knn_k = v;
        }
        if let Some(v) = c.freq_norm_hz {
            config.freq_norm_hz = v;
        }
        if let Some(v) = c.dataset_capacity {
            config.dataset_capacity = v;
        }
    }

    if let Some(p) = file.protocol {
        if let Some(v) = p.feature_interval_ms {
            config.feature_interval_ms = v;
        }
        if let Some(v) = p.status_interval_ms {
            config.status_interval_ms = v;
        }
    }

    config.clamp_all();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_clamp() {
        let mut config = DetectorConfig::default();
        let before = config.clone();
        config.clamp_all();
        assert_eq!(config.sample_rate_hz, before.sample_rate_hz);
        assert_eq!(config.knn_k, before.knn_k);
        assert_eq!(config.band_edges_hz, before.band_edges_hz);
    }

    #[test]
    fn even_k_is_bumped_to_odd() {
        let mut config = DetectorConfig {
            knn_k: 4,
            ..DetectorConfig::default()
        };
        config.clamp_all();
        assert_eq!(config.knn_k, 5);
    }

    #[test]
    fn bad_band_edges_fall_back_to_defaults() {
        let mut config = DetectorConfig {
            band_edges_hz: [100.0, 40.0, 10.0, 200.0],
            ..DetectorConfig::default()
        };
        config.clamp_all();
        assert_eq!(config.band_edges_hz, DetectorConfig::default().band_edges_hz);
    }

    #[test]
    fn partial_toml_merges_over_defaults() {
        let toml_str = "[classifier]\nknn_k = 7\n";
        let file: ConfigFile = toml::from_str(toml_str).expect("parse");
        let mut config = DetectorConfig::default();
        if let Some(c) = file.classifier
            && let Some(v) = c.knn_k
        {
            config.knn_k = v;
        }
        config.clamp_all();
        assert_eq!(config.knn_k, 7);
        assert_eq!(config.sample_rate_hz, 1000, "untouched field keeps default");
    }

    #[test]
    fn cutoff_clamped_to_nyquist() {
        let mut config = DetectorConfig {
            filter_cutoff_hz: 5000.0,
            ..DetectorConfig::default()
        };
        config.clamp_all();
        assert!((config.filter_cutoff_hz - 500.0).abs() < f32::EPSILON);
    }
}

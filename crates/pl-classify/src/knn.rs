use pl_core::{Classification, FEATURE_DIM, FeatureVector, Label, LabeledSample};

use crate::training::TrainingSet;

/// Classifieur k plus proches voisins sur distance euclidienne pondérée.
///
/// Les deux dimensions fréquentielles (centroïde, fréquence dominante)
/// sont divisées par `freq_norm_hz` avant mise au carré pour qu'aucune
/// dimension de grande magnitude brute ne domine la distance. Les six
/// autres dimensions gardent un poids de 1.
///
/// Déterministe : mêmes données + même requête ⇒ même résultat, les
/// égalités de distance se départagent par ordre d'insertion (le plus
/// ancien gagne).
///
/// # Example
/// ```
/// use pl_classify::knn::KnnClassifier;
/// use pl_core::{FeatureVector, Label};
///
/// let classifier = KnnClassifier::new(5, 100.0, 1000);
/// let result = classifier.classify(&FeatureVector::default());
/// assert_eq!(result.label, Label::NoRumble);
/// assert!(result.confidence.abs() < f32::EPSILON);
/// ```
pub struct KnnClassifier {
    training: TrainingSet,
    k: usize,
    dim_weights: [f32; FEATURE_DIM],
}

impl KnnClassifier {
    /// Create a classifier with an empty training set.
    ///
    /// `k` should be odd; an even value only matters when the set holds
    /// fewer than k entries anyway (ties then resolve to the nearest).
    #[must_use]
    pub fn new(k: usize, freq_norm_hz: f32, capacity: usize) -> Self {
        let mut dim_weights = [1.0; FEATURE_DIM];
        // Champs 1 et 5 du vecteur : centroid_hz et dominant_hz.
        let inv = 1.0 / freq_norm_hz.max(1.0);
        dim_weights[1] = inv;
        dim_weights[5] = inv;
        Self {
            training: TrainingSet::new(capacity),
            k: k.max(1),
            dim_weights,
        }
    }

    /// Classe un vecteur par vote majoritaire des k voisins les plus proches.
    ///
    /// Set vide ⇒ `(NoRumble, 0.0)`, jamais d'erreur. Moins de k exemples
    /// ⇒ vote parmi tous, diviseur de confiance ajusté.
    #[must_use]
    pub fn classify(&self, v: &FeatureVector) -> Classification {
        if self.training.is_empty() {
            return Classification::default();
        }

        // Distances vers tout le set, dans l'ordre d'insertion.
        let mut distances: Vec<(f32, Label)> = self
            .training
            .iter()
            .map(|s| (self.distance(v, &s.features), s.label))
            .collect();

        // Tri stable : à distance égale, le plus ancien reste devant.
        distances.sort_by(|a, b| a.0.total_cmp(&b.0));

        let k_used = self.k.min(distances.len());
        let neighbors = &distances[..k_used];

        let rumble_votes = neighbors
            .iter()
            .filter(|(_, label)| *label == Label::Rumble)
            .count();
        let no_rumble_votes = k_used - rumble_votes;

        let (label, votes) = match rumble_votes.cmp(&no_rumble_votes) {
            std::cmp::Ordering::Greater => (Label::Rumble, rumble_votes),
            std::cmp::Ordering::Less => (Label::NoRumble, no_rumble_votes),
            // Égalité (k_used pair) : le voisin le plus proche tranche.
            std::cmp::Ordering::Equal => (neighbors[0].1, rumble_votes),
        };

        Classification {
            label,
            confidence: votes as f32 / k_used as f32,
        }
    }

    /// Ajoute un exemple étiqueté (éviction FIFO à capacité pleine).
    ///
    /// La persistance est déclenchée par l'appelant (flag dirty dans la
    /// boucle de contrôle), jamais ici.
    pub fn add_labeled(&mut self, features: FeatureVector, label: Label, timestamp_ms: u32) {
        self.training.push(LabeledSample {
            features,
            label,
            timestamp_ms,
        });
    }

    /// Accès lecture au training set (stats, dump, persistance).
    #[must_use]
    pub fn training(&self) -> &TrainingSet {
        &self.training
    }

    /// Accès mutable au training set (chargement, clear).
    pub fn training_mut(&mut self) -> &mut TrainingSet {
        &mut self.training
    }

    /// Distance euclidienne pondérée entre deux vecteurs.
    fn distance(&self, a: &FeatureVector, b: &FeatureVector) -> f32 {
        let av = a.as_array();
        let bv = b.as_array();
        let mut sum = 0.0;
        for i in 0..FEATURE_DIM {
            let d = (av[i] - bv[i]) * self.dim_weights[i];
            sum += d * d;
        }
        sum.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(rms: f32, dominant_hz: f32) -> FeatureVector {
        FeatureVector {
            rms,
            dominant_hz,
            ..FeatureVector::default()
        }
    }

    #[test]
    fn empty_set_returns_default_negative() {
        let classifier = KnnClassifier::new(5, 100.0, 10);
        let result = classifier.classify(&vector(0.5, 30.0));
        assert_eq!(result.label, Label::NoRumble);
        assert!(result.confidence.abs() < f32::EPSILON);
    }

    #[test]
    fn well_separated_clusters_classify_with_majority() {
        let mut classifier = KnnClassifier::new(5, 100.0, 100);
        for i in 0..5 {
            classifier.add_labeled(vector(0.8 + i as f32 * 0.01, 25.0), Label::Rumble, i);
        }
        for i in 0..5 {
            classifier.add_labeled(vector(0.05 + i as f32 * 0.01, 150.0), Label::NoRumble, i);
        }

        let result = classifier.classify(&vector(0.82, 27.0));
        assert_eq!(result.label, Label::Rumble);
        assert!(
            result.confidence >= 0.6,
            "majority of 5 neighbors expected, confidence = {}",
            result.confidence
        );
    }

    #[test]
    fn classification_is_deterministic() {
        let mut classifier = KnnClassifier::new(5, 100.0, 100);
        for i in 0..20 {
            let label = if i % 2 == 0 { Label::Rumble } else { Label::NoRumble };
            classifier.add_labeled(vector(i as f32 * 0.05, i as f32 * 10.0), label, i);
        }
        let query = vector(0.42, 87.0);
        let first = classifier.classify(&query);
        for _ in 0..10 {
            assert_eq!(classifier.classify(&query), first);
        }
    }

    #[test]
    fn fewer_than_k_votes_among_all() {
        let mut classifier = KnnClassifier::new(5, 100.0, 10);
        classifier.add_labeled(vector(0.5, 30.0), Label::Rumble, 0);
        classifier.add_labeled(vector(0.5, 31.0), Label::Rumble, 1);
        classifier.add_labeled(vector(0.1, 150.0), Label::NoRumble, 2);

        let result = classifier.classify(&vector(0.5, 30.0));
        assert_eq!(result.label, Label::Rumble);
        assert!((result.confidence - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn even_neighborhood_tie_goes_to_nearest() {
        let mut classifier = KnnClassifier::new(5, 100.0, 10);
        classifier.add_labeled(vector(0.50, 30.0), Label::Rumble, 0);
        classifier.add_labeled(vector(0.90, 30.0), Label::NoRumble, 1);

        // Requête plus proche du Rumble : 1 vote partout, le plus proche tranche.
        let result = classifier.classify(&vector(0.55, 30.0));
        assert_eq!(result.label, Label::Rumble);
        assert!((result.confidence - 0.5).abs() < 1e-6);
    }

    #[test]
    fn distance_tie_breaks_by_insertion_order() {
        let mut classifier = KnnClassifier::new(1, 100.0, 10);
        // Deux voisins parfaitement équidistants de la requête.
        classifier.add_labeled(vector(0.4, 30.0), Label::Rumble, 0);
        classifier.add_labeled(vector(0.6, 30.0), Label::NoRumble, 1);

        let result = classifier.classify(&vector(0.5, 30.0));
        assert_eq!(result.label, Label::Rumble, "earlier insertion wins ties");
    }

    #[test]
    fn frequency_dimensions_are_normalized() {
        // Sans normalisation, un écart de 100 Hz écraserait un écart de
        // RMS de 0.5. Avec freq_norm = 100, les deux pèsent pareil.
        let mut classifier = KnnClassifier::new(1, 100.0, 10);
        classifier.add_labeled(vector(0.5, 100.0), Label::Rumble, 0);
        classifier.add_labeled(vector(0.0, 0.0), Label::NoRumble, 1);

        // Requête : RMS proche du Rumble, fréquence proche du NoRumble
        // mais l'écart fréquentiel normalisé (0.4) < écart RMS (0.45).
        let result = classifier.classify(&vector(0.45, 60.0));
        assert_eq!(result.label, Label::Rumble);
    }
}

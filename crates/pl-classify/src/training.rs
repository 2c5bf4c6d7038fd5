use std::collections::VecDeque;

use pl_core::{Label, LabeledSample};

/// Training set ordonné, borné en capacité, à éviction FIFO.
///
/// L'ordre d'insertion détermine l'ordre d'éviction. L'éviction ignore
/// volontairement l'équilibre des classes — politique simple et auditable
/// héritée du firmware d'origine. Limitation connue : un labeling très
/// déséquilibré peut affamer une classe.
///
/// # Example
/// ```
/// use pl_classify::training::TrainingSet;
/// let set = TrainingSet::new(1000);
/// assert!(set.is_empty());
/// ```
pub struct TrainingSet {
    entries: VecDeque<LabeledSample>,
    capacity: usize,
}

impl TrainingSet {
    /// Create an empty set with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    /// Ajoute un exemple ; à capacité pleine, évince d'abord le plus ancien.
    pub fn push(&mut self, sample: LabeledSample) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(sample);
    }

    /// Remplace tout le contenu (chargement depuis le stockage).
    ///
    /// Les enregistrements au-delà de la capacité sont évincés FIFO,
    /// comme s'ils avaient été poussés un à un.
    pub fn replace_all(&mut self, samples: Vec<LabeledSample>) {
        self.entries.clear();
        for s in samples {
            self.push(s);
        }
    }

    /// Vide le set (commande CLEAR_DATA).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Nombre d'exemples stockés.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` si aucun exemple n'est stocké.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacité maximale.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Itère dans l'ordre d'insertion (du plus ancien au plus récent).
    pub fn iter(&self) -> impl Iterator<Item = &LabeledSample> {
        self.entries.iter()
    }

    /// Nombre d'exemples portant ce label.
    #[must_use]
    pub fn count_label(&self, label: Label) -> usize {
        self.entries.iter().filter(|s| s.label == label).count()
    }
}

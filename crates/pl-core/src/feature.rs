use crate::FEATURE_DIM;

/// Vecteur de 8 features spectrales/temporelles, calculé une fois par frame.
///
/// Immutable une fois produit. L'ordre des champs est l'ordre du protocole
/// filaire (`FEATURES:` ligne) et l'ordre des floats dans le format de
/// stockage — il ne doit jamais changer sans bump de version du format.
///
/// # Example
/// ```
/// use pl_core::FeatureVector;
/// let v = FeatureVector::default();
/// assert_eq!(v.as_array(), [0.0; 8]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FeatureVector {
    /// Énergie RMS des échantillons normalisés (pré-fenêtrage).
    pub rms: f32,
    /// Centroïde spectral en Hz (moyenne des fréquences pondérée par la puissance).
    pub centroid_hz: f32,
    /// Puissance de la bande infrasonore (10–40 Hz par défaut).
    pub infrasound: f32,
    /// Puissance de la bande basse (40–100 Hz par défaut).
    pub band_low: f32,
    /// Puissance de la bande médiane (100–200 Hz par défaut).
    pub band_mid: f32,
    /// Fréquence du bin de puissance maximale, DC exclu, en Hz.
    pub dominant_hz: f32,
    /// Enveloppe temporelle : max |échantillon normalisé| (pré-fenêtrage).
    pub envelope: f32,
    /// Flux spectral : somme des |Δpuissance| frame-à-frame. 0.0 sur la
    /// toute première frame (pas de spectre précédent).
    pub flux: f32,
}

impl FeatureVector {
    /// The 8 scalars in wire/storage order.
    #[must_use]
    pub fn as_array(&self) -> [f32; FEATURE_DIM] {
        [
            self.rms,
            self.centroid_hz,
            self.infrasound,
            self.band_low,
            self.band_mid,
            self.dominant_hz,
            self.envelope,
            self.flux,
        ]
    }

    /// Rebuild a vector from wire/storage order.
    #[must_use]
    pub fn from_array(a: [f32; FEATURE_DIM]) -> Self {
        Self {
            rms: a[0],
            centroid_hz: a[1],
            infrasound: a[2],
            band_low: a[3],
            band_mid: a[4],
            dominant_hz: a[5],
            envelope: a[6],
            flux: a[7],
        }
    }
}

/// Les deux classes du détecteur.
///
/// `NoRumble` est aussi le label par défaut "inconnu/négatif" retourné
/// quand le training set est vide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Label {
    /// Vocalisation basse fréquence détectée (token filaire `elephant`).
    Rumble,
    /// Pas de vocalisation (token filaire `not_elephant`).
    #[default]
    NoRumble,
}

impl Label {
    /// Storage code (1 byte in the dataset file). Stable across versions.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::NoRumble => 0,
            Self::Rumble => 1,
        }
    }

    /// Inverse of [`Label::code`]. Any other byte invalidates the record.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::NoRumble),
            1 => Some(Self::Rumble),
            _ => None,
        }
    }

    /// Token ASCII du protocole filaire.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Rumble => "elephant",
            Self::NoRumble => "not_elephant",
        }
    }

    /// Parse a wire token back into a label.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "elephant" => Some(Self::Rumble),
            "not_elephant" => Some(Self::NoRumble),
            _ => None,
        }
    }
}

/// Un exemple étiqueté du training set.
///
/// `timestamp_ms` est l'uptime en millisecondes au moment du labeling,
/// tronqué à u32 (wrap ≈ 49,7 jours — contrat hérité du firmware).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabeledSample {
    /// Feature vector at labeling time.
    pub features: FeatureVector,
    /// Class assigned by the host.
    pub label: Label,
    /// Uptime milliseconds at labeling, truncating.
    pub timestamp_ms: u32,
}

/// Résultat transitoire d'une classification, jamais persisté.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Classification {
    /// Winning label.
    pub label: Label,
    /// Votes pour le label gagnant / voisins consultés, dans [0, 1].
    pub confidence: f32,
}

impl Default for Classification {
    /// Default classifier output for an empty training set.
    fn default() -> Self {
        Self {
            label: Label::NoRumble,
            confidence: 0.0,
        }
    }
}

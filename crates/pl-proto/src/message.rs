use pl_core::{Classification, FeatureVector, Label, LabeledSample};

/// Bannière émise une seule fois au démarrage (handshake avec l'hôte).
pub const READY_BANNER: &str = "PACHYLOG_READY";

/// Terminateur du dump de dataset.
pub const END_DATASET: &str = "END_DATASET";

/// Message sortant (device → hôte), une ligne ASCII chacun.
///
/// Précision décimale fixe : 4 décimales pour les énergies et le flux,
/// 1 pour les fréquences, 3 pour la confiance.
///
/// # Example
/// ```
/// use pl_proto::Message;
/// use pl_core::Classification;
/// let line = Message::Classification(Classification::default()).encode();
/// assert_eq!(line, "CLASSIFICATION:not_elephant,0.000");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    /// Bannière de démarrage, émise exactement une fois.
    Ready,
    /// Vecteur de features de la dernière frame.
    Features(FeatureVector),
    /// Résultat de classification de la dernière frame.
    Classification(Classification),
    /// Heartbeat périodique.
    Status {
        /// Échantillons ingérés depuis le démarrage.
        sample_count: u64,
        /// Uptime en millisecondes.
        uptime_ms: u64,
        /// Marge restante du training set, en octets d'enregistrements.
        free_memory_bytes: usize,
    },
    /// Statistiques du dataset, réponse à GET_DATASET.
    Dataset {
        /// Nombre total d'exemples.
        total: usize,
        /// Exemples étiquetés `elephant`.
        elephant: usize,
        /// Exemples étiquetés `not_elephant`.
        not_elephant: usize,
    },
    /// Accusé de labeling, avec le compte post-insertion pour cette classe.
    Labeled {
        /// Classe assignée.
        label: Label,
        /// Exemples de cette classe après insertion.
        count: usize,
    },
    /// Une ligne du dump de dataset (8 features + label).
    DatasetRecord(LabeledSample),
    /// Fin du dump de dataset.
    EndDataset,
    /// Acquittement positif d'une commande.
    Ok(String),
    /// Erreur non fatale, la boucle continue.
    Error(String),
}

impl Message {
    /// Encode le message en une ligne ASCII, sans le `\n` final.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Ready => READY_BANNER.to_string(),
            Self::Features(v) => format!(
                "FEATURES:{:.4},{:.1},{:.4},{:.4},{:.4},{:.1},{:.4},{:.4}",
                v.rms,
                v.centroid_hz,
                v.infrasound,
                v.band_low,
                v.band_mid,
                v.dominant_hz,
                v.envelope,
                v.flux
            ),
            Self::Classification(c) => {
                format!("CLASSIFICATION:{},{:.3}", c.label.token(), c.confidence)
            }
            Self::Status {
                sample_count,
                uptime_ms,
                free_memory_bytes,
            } => format!("STATUS:{sample_count},{uptime_ms},{free_memory_bytes}"),
            Self::Dataset {
                total,
                elephant,
                not_elephant,
            } => format!("DATASET:{total},{elephant},{not_elephant}"),
            Self::Labeled { label, count } => {
                format!("LABELED:{},{count}", label.token())
            }
            Self::DatasetRecord(s) => {
                let v = &s.features;
                format!(
                    "{:.4},{:.1},{:.4},{:.4},{:.4},{:.1},{:.4},{:.4},{}",
                    v.rms,
                    v.centroid_hz,
                    v.infrasound,
                    v.band_low,
                    v.band_mid,
                    v.dominant_hz,
                    v.envelope,
                    v.flux,
                    s.label.token()
                )
            }
            Self::EndDataset => END_DATASET.to_string(),
            Self::Ok(msg) => format!("OK:{msg}"),
            Self::Error(msg) => format!("ERROR:{msg}"),
        }
    }
}

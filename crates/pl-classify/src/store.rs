use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pl_core::{FEATURE_DIM, FeatureVector, Label, LabeledSample};

use crate::training::TrainingSet;

/// Version du format de stockage, premier octet du fichier.
pub const FORMAT_VERSION: u8 = 1;

/// Taille d'un enregistrement : 8 × f32 + code label + timestamp u32.
pub const RECORD_SIZE: usize = FEATURE_DIM * 4 + 1 + 4;

/// Errors originating from the dataset store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying filesystem error.
    #[error("Erreur d'E/S sur le dataset : {0}")]
    Io(#[from] std::io::Error),

    /// The file carries a version byte this firmware does not read.
    #[error("Version de format non supportée : {0} (attendu {FORMAT_VERSION})")]
    UnsupportedVersion(u8),

    /// Record (de)serialization failure.
    #[error("Erreur d'encodage d'enregistrement : {0}")]
    Codec(#[from] bincode::Error),
}

/// Un enregistrement de largeur fixe du fichier de dataset.
///
/// bincode (encodage legacy little-endian à largeur fixe) produit
/// exactement la disposition du contrat : 8 × f32 LE, 1 octet de code
/// label, u32 LE de timestamp = 37 octets. L'ordre des floats est l'ordre
/// filaire de `FeatureVector::as_array`. Stable entre versions du
/// firmware lisant le même stockage.
#[derive(Serialize, Deserialize)]
struct StoredRecord {
    features: [f32; FEATURE_DIM],
    label_code: u8,
    timestamp_ms: u32,
}

/// Persistance du training set : fichier binaire plat.
///
/// Disposition : 1 octet de version, u16 LE de compte, puis compte ×
/// enregistrements de 37 octets. Pas de journalisation — une écriture
/// interrompue laisse une queue corrompue, détectée au chargement suivant
/// et jetée (récupération partielle du préfixe valide).
///
/// # Example
/// ```no_run
/// use pl_classify::store::DatasetStore;
/// let store = DatasetStore::new("dataset.bin");
/// let loaded = store.load().unwrap();
/// assert!(loaded.is_none()); // cold start, fichier absent
/// ```
pub struct DatasetStore {
    path: PathBuf,
}

impl DatasetStore {
    /// Create a store bound to the given path. No I/O happens here.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Chemin du fichier de dataset.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sérialise tout le training set (réécriture complète du fichier).
    ///
    /// # Errors
    /// Returns an error if the file cannot be written or a record fails
    /// to encode.
    pub fn save(&self, training: &TrainingSet) -> Result<(), StoreError> {
        let count = u16::try_from(training.len()).unwrap_or(u16::MAX);
        let mut bytes = Vec::with_capacity(3 + usize::from(count) * RECORD_SIZE);
        bytes.push(FORMAT_VERSION);
        bytes.extend_from_slice(&count.to_le_bytes());

        for sample in training.iter().take(usize::from(count)) {
            let record = StoredRecord {
                features: sample.features.as_array(),
                label_code: sample.label.code(),
                timestamp_ms: sample.timestamp_ms,
            };
            bytes.extend_from_slice(&bincode::serialize(&record)?);
        }

        std::fs::write(&self.path, bytes)?;
        log::debug!("Dataset sauvegardé : {count} enregistrements");
        Ok(())
    }

    /// Relit les enregistrements depuis le stockage.
    ///
    /// - `Ok(None)` : fichier absent — démarrage à froid normal, pas une
    ///   erreur.
    /// - `Ok(Some(records))` : enregistrements valides, lus jusqu'au
    ///   premier enregistrement malformé (queue corrompue jetée avec un
    ///   warning plutôt qu'abandon complet).
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read, or if the
    /// version byte is unsupported.
    pub fn load(&self) -> Result<Option<Vec<LabeledSample>>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e)),
        };

        if bytes.is_empty() {
            log::warn!("Dataset vide (écriture interrompue ?), reprise sans données");
            return Ok(Some(Vec::new()));
        }
        if bytes[0] != FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion(bytes[0]));
        }
        if bytes.len() < 3 {
            log::warn!("En-tête de dataset tronqué, reprise sans données");
            return Ok(Some(Vec::new()));
        }

        let declared = usize::from(u16::from_le_bytes([bytes[1], bytes[2]]));
        let mut records = Vec::with_capacity(declared);

        for chunk in bytes[3..].chunks_exact(RECORD_SIZE).take(declared) {
            let Ok(record) = bincode::deserialize::<StoredRecord>(chunk) else {
                break;
            };
            let Some(label) = Label::from_code(record.label_code) else {
                break; // code inconnu : l'enregistrement et sa suite sont suspects
            };
            if !record.features.iter().all(|f| f.is_finite()) {
                break;
            }
            records.push(LabeledSample {
                features: FeatureVector::from_array(record.features),
                label,
                timestamp_ms: record.timestamp_ms,
            });
        }

        if records.len() < declared {
            log::warn!(
                "Dataset corrompu : {} enregistrements récupérés sur {declared}, queue jetée",
                records.len()
            );
        }
        Ok(Some(records))
    }
}

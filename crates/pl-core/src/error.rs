use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Referenced file does not exist.
    #[error("Fichier introuvable : {path}")]
    FileNotFound {
        /// Path that was not found.
        path: String,
    },
}

/// Errors originating from a sample source.
///
/// La seule erreur fatale au démarrage : si la source configurée refuse de
/// s'initialiser, le process s'arrête (rapporté une fois, voir `pl-app`).
#[derive(Error, Debug)]
pub enum SourceError {
    /// No input device available for capture.
    #[error("Aucun périphérique d'entrée audio trouvé")]
    NoInputDevice,

    /// The capture stream could not be built or started.
    #[error("Erreur de stream de capture : {0}")]
    StreamError(String),

    /// The source cannot deliver the requested sample rate.
    #[error("Sample rate non supporté : {requested} Hz (device : {native} Hz)")]
    UnsupportedRate {
        /// Rate the core asked for.
        requested: u32,
        /// Native rate of the device.
        native: u32,
    },
}

use crate::error::SourceError;

/// Fournit des échantillons audio au pipeline, un par tick.
///
/// Abstrait l'acquisition (microphone, générateur synthétique) : le cœur
/// ne touche jamais le matériel directement, ce qui permet de tester toute
/// la chaîne avec une source synthétique.
///
/// # Example
/// ```
/// use pl_core::source::SampleSource;
/// use pl_core::error::SourceError;
///
/// struct DummySource;
/// impl SampleSource for DummySource {
///     fn configure(&mut self) -> Result<(), SourceError> { Ok(()) }
///     fn read_sample(&mut self) -> Option<i16> { None }
///     fn name(&self) -> &'static str { "dummy" }
/// }
/// ```
pub trait SampleSource: Send + 'static {
    /// Initialise la source (ouverture du device, démarrage du stream).
    ///
    /// Appelé exactement une fois avant le premier `read_sample()`.
    /// C'est le seul échec fatal du démarrage.
    ///
    /// # Errors
    /// Returns an error if the source cannot be initialized.
    fn configure(&mut self) -> Result<(), SourceError>;

    /// Retourne le prochain échantillon disponible.
    ///
    /// `None` = rien de disponible à cet instant, jamais une erreur.
    /// Ne bloque JAMAIS.
    fn read_sample(&mut self) -> Option<i16>;

    /// Nom lisible pour le debug/logs.
    fn name(&self) -> &'static str;
}

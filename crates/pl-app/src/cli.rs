use std::path::PathBuf;

use clap::Parser;

/// pachylog — Real-time infrasound rumble detector.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source d'échantillons : "mic", "tone", ou "silence".
    #[arg(long, default_value = "mic")]
    pub input: String,

    /// Fréquence du générateur synthétique, en Hz (avec --input tone).
    #[arg(long, default_value_t = 30.0)]
    pub tone_hz: f32,

    /// Amplitude du générateur synthétique [0, 32767].
    #[arg(long, default_value_t = 8000)]
    pub tone_amplitude: i16,

    /// Fichier de dataset persisté.
    #[arg(long, default_value = "dataset.bin")]
    pub store: PathBuf,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Durée d'exécution en secondes. Absent = tourne indéfiniment.
    #[arg(long)]
    pub duration: Option<u64>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Validate the requested input source name.
    ///
    /// # Errors
    /// Returns an error if the source name is not recognized.
    pub fn validate_input(&self) -> anyhow::Result<()> {
        match self.input.as_str() {
            "mic" | "tone" | "silence" => Ok(()),
            other => anyhow::bail!(
                "Source inconnue : {other}. Utilisez --input mic, tone, ou silence."
            ),
        }
    }
}

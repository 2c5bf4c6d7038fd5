use std::io::BufRead;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pl_classify::{DatasetStore, KnnClassifier};
use pl_core::{DetectorConfig, SampleSource};

pub mod cli;
pub mod engine;
pub mod source;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging — stderr uniquement, le protocole a stdout.
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Valider la source
    cli.validate_input()?;

    // 4. Charger la config
    let config = resolve_config(&cli)?;

    // 5. Charger le dataset persisté (démarrage à froid si absent)
    let mut classifier =
        KnnClassifier::new(config.knn_k, config.freq_norm_hz, config.dataset_capacity);
    let store = DatasetStore::new(&cli.store);
    let startup_notice = load_dataset(&store, &mut classifier);

    // 6. Initialiser la source — le seul échec fatal du démarrage.
    let mut sample_source = build_source(&cli, &config);
    sample_source
        .configure()
        .with_context(|| format!("Échec d'initialisation de la source '{}'", cli.input))?;

    // 7. Thread lecteur stdin → canal de commandes (la mutation reste
    // dans la boucle de contrôle, le thread ne fait que transporter).
    let command_rx = spawn_stdin_reader()?;

    // 8. Boucle de contrôle
    let mut engine = engine::Engine::new(config, classifier, store);
    if let Some(notice) = startup_notice {
        engine.set_startup_notice(notice);
    }

    let duration = cli.duration.map(Duration::from_secs);
    let stdout = std::io::stdout();
    engine.run(
        sample_source.as_mut(),
        &command_rx,
        &mut stdout.lock(),
        duration,
    )
}

/// Resolve config: file if present, defaults with a warning otherwise.
fn resolve_config(cli: &cli::Cli) -> Result<DetectorConfig> {
    if cli.config.exists() {
        pl_core::config::load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(DetectorConfig::default())
    }
}

/// Charge le dataset persisté dans le classifieur.
///
/// Stockage indisponible/corrompu = dégradation gracieuse : on repart
/// avec un training set vide et on rapporte une fois (jamais fatal).
fn load_dataset(store: &DatasetStore, classifier: &mut KnnClassifier) -> Option<String> {
    match store.load() {
        Ok(None) => {
            log::info!("Pas de dataset persisté, démarrage à froid");
            None
        }
        Ok(Some(records)) => {
            log::info!("Dataset chargé : {} enregistrements", records.len());
            classifier.training_mut().replace_all(records);
            None
        }
        Err(e) => {
            log::warn!("Dataset illisible ({e}), reprise avec un training set vide");
            Some("storage_unavailable".to_string())
        }
    }
}

/// Construit la source d'échantillons demandée par la CLI.
fn build_source(cli: &cli::Cli, config: &DetectorConfig) -> Box<dyn SampleSource> {
    match cli.input.as_str() {
        "tone" => Box::new(source::SyntheticSource::new(
            config.sample_rate_hz,
            source::Waveform::Tone {
                freq_hz: cli.tone_hz,
                amplitude: cli.tone_amplitude,
            },
        )),
        "silence" => Box::new(source::SyntheticSource::new(
            config.sample_rate_hz,
            source::Waveform::Silence,
        )),
        _ => Box::new(source::MicSource::new(config.sample_rate_hz)),
    }
}

/// Spawn the stdin line reader feeding the command channel.
fn spawn_stdin_reader() -> Result<flume::Receiver<String>> {
    let (tx, rx) = flume::unbounded();
    std::thread::Builder::new()
        .name("pl-stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break; // boucle de contrôle terminée
                        }
                    }
                    Err(e) => {
                        log::debug!("Lecture stdin terminée : {e}");
                        break;
                    }
                }
            }
        })
        .context("Impossible de démarrer le lecteur stdin")?;
    Ok(rx)
}

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use pl_classify::store::RECORD_SIZE;
use pl_classify::{DatasetStore, KnnClassifier};
use pl_core::{Classification, DetectorConfig, FeatureVector, Label, SampleSource};
use pl_dsp::AudioPipeline;
use pl_proto::{Command, Message};

/// Boucle de contrôle coopérative mono-thread.
///
/// Alterne : (a) drainage des commandes entrantes, (b) drainage de la
/// source d'échantillons avec extraction+classification synchrones sur
/// complétion de frame, (c) émissions rate-limitées et heartbeat, (d)
/// flush différé du dataset. Tout l'état mutable partagé (training set,
/// état de filtre, curseur) n'est touché que par cette boucle : aucune
/// discipline de lock n'est nécessaire.
///
/// Aucune opération ne bloque indéfiniment, rien ici n'a le droit
/// d'arrêter la boucle. Un tick d'acquisition manqué saute des
/// échantillons sans rattrapage — dégradation transitoire acceptée.
pub struct Engine {
    config: DetectorConfig,
    pipeline: AudioPipeline,
    classifier: KnnClassifier,
    store: DatasetStore,
    /// Labeling en attente de flush vers le stockage.
    dirty: bool,
    /// Erreur de stockage du démarrage, rapportée une fois après la bannière.
    startup_notice: Option<String>,
    start: Instant,
    last_emit: Option<Instant>,
    last_status: Instant,
    latest: Option<(FeatureVector, Classification)>,
    pending_emit: bool,
}

impl Engine {
    /// Assemble the loop from its collaborators.
    #[must_use]
    pub fn new(config: DetectorConfig, classifier: KnnClassifier, store: DatasetStore) -> Self {
        let pipeline = AudioPipeline::new(&config);
        Self {
            config,
            pipeline,
            classifier,
            store,
            dirty: false,
            startup_notice: None,
            start: Instant::now(),
            last_emit: None,
            last_status: Instant::now(),
            latest: None,
            pending_emit: false,
        }
    }

    /// Mémorise une erreur de stockage à rapporter une fois au démarrage.
    pub fn set_startup_notice(&mut self, notice: String) {
        self.startup_notice = Some(notice);
    }

    /// Fait tourner la boucle jusqu'à expiration de `duration` (ou
    /// indéfiniment si `None`).
    ///
    /// # Errors
    /// Returns an error only if the output writer fails — wire emission
    /// is the engine's one unrecoverable dependency.
    pub fn run(
        &mut self,
        source: &mut dyn SampleSource,
        commands: &flume::Receiver<String>,
        out: &mut dyn Write,
        duration: Option<Duration>,
    ) -> Result<()> {
        self.start = Instant::now();
        self.last_status = self.start;

        emit(out, &Message::Ready)?;
        if let Some(notice) = self.startup_notice.take() {
            emit(out, &Message::Error(notice))?;
        }

        let feature_interval = Duration::from_millis(self.config.feature_interval_ms);
        let status_interval = Duration::from_millis(self.config.status_interval_ms);

        loop {
            // (a) Commandes hôte, traitées de façon synchrone dans la boucle.
            while let Ok(line) = commands.try_recv() {
                let cmd = Command::parse(&line);
                for msg in self.handle_command(&cmd) {
                    emit(out, &msg)?;
                }
            }

            // (b) Échantillons disponibles : chaîne par échantillon, puis
            // classification immédiate sur le front de complétion de frame.
            while let Some(raw) = source.read_sample() {
                if let Some(features) = self.pipeline.push_sample(raw) {
                    let result = self.classifier.classify(&features);
                    self.latest = Some((features, result));
                    self.pending_emit = true;
                }
            }

            // (c) Émission FEATURES + CLASSIFICATION, rate-limitée.
            let emit_due = self
                .last_emit
                .is_none_or(|t| t.elapsed() >= feature_interval);
            if self.pending_emit
                && emit_due
                && let Some((features, result)) = self.latest
            {
                emit(out, &Message::Features(features))?;
                emit(out, &Message::Classification(result))?;
                self.last_emit = Some(Instant::now());
                self.pending_emit = false;
            }

            // (d) Heartbeat périodique.
            if self.last_status.elapsed() >= status_interval {
                let status = self.status_message();
                emit(out, &status)?;
                self.last_status = Instant::now();
            }

            // (e) Flush différé : le labeling marque dirty, l'écriture se
            // fait ici, jamais dans le traitement de commande.
            if self.dirty {
                match self.store.save(self.classifier.training()) {
                    Ok(()) => self.dirty = false,
                    Err(e) => {
                        log::error!("Flush du dataset échoué : {e}");
                        emit(out, &Message::Error("save_failed".into()))?;
                        // Pas de retry à chaque tick ; le prochain labeling re-marquera dirty.
                        self.dirty = false;
                    }
                }
            }

            out.flush().context("Sortie protocole fermée")?;

            if let Some(d) = duration
                && self.start.elapsed() >= d
            {
                return Ok(());
            }

            std::thread::sleep(self.config.sample_period());
        }
    }

    /// Traite une commande et produit les messages de réponse.
    ///
    /// Jamais d'échec : une commande malformée produit une ligne `ERROR:`
    /// et la boucle continue.
    pub fn handle_command(&mut self, cmd: &Command) -> Vec<Message> {
        match cmd {
            Command::Label(label) => self.handle_label(*label),
            Command::SaveData => match self.store.save(self.classifier.training()) {
                Ok(()) => {
                    self.dirty = false;
                    vec![Message::Ok(format!("saved:{}", self.classifier.training().len()))]
                }
                Err(e) => {
                    log::error!("SAVE_DATA échoué : {e}");
                    vec![Message::Error("save_failed".into())]
                }
            },
            Command::ClearData => {
                self.classifier.training_mut().clear();
                self.dirty = true;
                vec![Message::Ok("dataset_cleared".into())]
            }
            Command::GetDataset => {
                let training = self.classifier.training();
                vec![Message::Dataset {
                    total: training.len(),
                    elephant: training.count_label(Label::Rumble),
                    not_elephant: training.count_label(Label::NoRumble),
                }]
            }
            Command::GetStatus => vec![self.status_message()],
            Command::GetFeatures => match self.latest {
                Some((features, _)) => vec![Message::Features(features)],
                None => vec![Message::Error("no_features_yet".into())],
            },
            Command::DumpDataset => {
                let mut messages: Vec<Message> = self
                    .classifier
                    .training()
                    .iter()
                    .map(|s| Message::DatasetRecord(*s))
                    .collect();
                messages.push(Message::EndDataset);
                messages
            }
            Command::Ping => vec![Message::Ok("pong".into())],
            Command::Unknown(raw) => {
                log::debug!("Commande inconnue ignorée : {raw:?}");
                vec![Message::Error("unknown_command".into())]
            }
        }
    }

    fn handle_label(&mut self, label: Label) -> Vec<Message> {
        let Some((features, _)) = self.latest else {
            return vec![Message::Error("no_features_yet".into())];
        };
        let timestamp_ms = self.uptime_ms() as u32; // wrap ≈ 49,7 jours
        self.classifier.add_labeled(features, label, timestamp_ms);
        self.dirty = true;
        vec![Message::Labeled {
            label,
            count: self.classifier.training().count_label(label),
        }]
    }

    fn status_message(&self) -> Message {
        let training = self.classifier.training();
        Message::Status {
            sample_count: self.pipeline.samples_seen(),
            uptime_ms: self.uptime_ms(),
            free_memory_bytes: (training.capacity() - training.len()) * RECORD_SIZE,
        }
    }

    fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Écrit une ligne protocole. Les logs vont sur stderr, jamais ici.
fn emit(out: &mut dyn Write, msg: &Message) -> Result<()> {
    writeln!(out, "{}", msg.encode()).context("Écriture protocole échouée")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pl_core::{FRAME_SIZE, error::SourceError};
    use std::collections::VecDeque;
    use tempfile::TempDir;

    /// Source de test non cadencée : délivre une file finie d'échantillons.
    struct QueueSource(VecDeque<i16>);

    impl SampleSource for QueueSource {
        fn configure(&mut self) -> Result<(), SourceError> {
            Ok(())
        }
        fn read_sample(&mut self) -> Option<i16> {
            self.0.pop_front()
        }
        fn name(&self) -> &'static str {
            "queue"
        }
    }

    fn test_engine(dir: &TempDir) -> Engine {
        let mut config = DetectorConfig {
            feature_interval_ms: 50,
            ..DetectorConfig::default()
        };
        config.clamp_all();
        let classifier = KnnClassifier::new(config.knn_k, config.freq_norm_hz, 10);
        let store = DatasetStore::new(dir.path().join("dataset.bin"));
        Engine::new(config, classifier, store)
    }

    fn tone_samples(n: usize) -> VecDeque<i16> {
        (0..n)
            .map(|i| {
                (8000.0 * (2.0 * std::f32::consts::PI * 30.0 * i as f32 / 1000.0).sin()) as i16
            })
            .collect()
    }

    fn run_session(engine: &mut Engine, samples: VecDeque<i16>, lines: &[&str]) -> Vec<String> {
        let mut source = QueueSource(samples);
        let (tx, rx) = flume::unbounded();
        for line in lines {
            tx.send((*line).to_string()).expect("send");
        }
        drop(tx);
        let mut out = Vec::new();
        engine
            .run(&mut source, &rx, &mut out, Some(Duration::from_millis(40)))
            .expect("run");
        String::from_utf8(out)
            .expect("ascii output")
            .lines()
            .map(String::from)
            .collect()
    }

    #[test]
    fn ready_banner_comes_first() {
        let dir = TempDir::new().expect("tempdir");
        let mut engine = test_engine(&dir);
        let lines = run_session(&mut engine, VecDeque::new(), &[]);
        assert_eq!(lines[0], "PACHYLOG_READY");
    }

    #[test]
    fn startup_notice_follows_banner_once() {
        let dir = TempDir::new().expect("tempdir");
        let mut engine = test_engine(&dir);
        engine.set_startup_notice("storage_corrupt".into());
        let lines = run_session(&mut engine, VecDeque::new(), &[]);
        assert_eq!(lines[1], "ERROR:storage_corrupt");
        assert_eq!(
            lines.iter().filter(|l| l.contains("storage_corrupt")).count(),
            1
        );
    }

    #[test]
    fn frame_completion_emits_features_then_classification() {
        let dir = TempDir::new().expect("tempdir");
        let mut engine = test_engine(&dir);
        let lines = run_session(&mut engine, tone_samples(FRAME_SIZE), &[]);
        let features_idx = lines
            .iter()
            .position(|l| l.starts_with("FEATURES:"))
            .expect("FEATURES line");
        assert!(
            lines[features_idx + 1].starts_with("CLASSIFICATION:"),
            "classification follows features"
        );
        // Training set vide : label négatif par défaut, confiance nulle.
        assert_eq!(lines[features_idx + 1], "CLASSIFICATION:not_elephant,0.000");
    }

    #[test]
    fn unknown_command_is_reported_and_loop_continues() {
        let dir = TempDir::new().expect("tempdir");
        let mut engine = test_engine(&dir);
        let lines = run_session(&mut engine, VecDeque::new(), &["FROBNICATE", "PING"]);
        assert!(lines.contains(&"ERROR:unknown_command".to_string()));
        assert!(lines.contains(&"OK:pong".to_string()), "loop kept serving");
    }

    #[test]
    fn label_before_any_frame_is_refused() {
        let dir = TempDir::new().expect("tempdir");
        let mut engine = test_engine(&dir);
        let messages = engine.handle_command(&Command::Label(Label::Rumble));
        assert_eq!(messages, vec![Message::Error("no_features_yet".into())]);
    }

    #[test]
    fn label_flow_updates_stats_and_flushes() {
        let dir = TempDir::new().expect("tempdir");
        let mut engine = test_engine(&dir);
        // Première session : une frame complète, pour avoir des features.
        run_session(&mut engine, tone_samples(FRAME_SIZE), &[]);
        // Seconde session : l'hôte étiquette le dernier vecteur extrait.
        let lines = run_session(
            &mut engine,
            VecDeque::new(),
            &["LABEL:elephant", "GET_DATASET"],
        );
        assert!(lines.contains(&"LABELED:elephant,1".to_string()));
        assert!(lines.contains(&"DATASET:1,1,0".to_string()));
        // Le flush différé a écrit le fichier pendant la boucle.
        assert!(dir.path().join("dataset.bin").exists());
    }

    #[test]
    fn dump_ends_with_terminator() {
        let dir = TempDir::new().expect("tempdir");
        let mut engine = test_engine(&dir);
        engine.classifier.add_labeled(FeatureVector::default(), Label::Rumble, 0);
        let messages = engine.handle_command(&Command::DumpDataset);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages.last(), Some(&Message::EndDataset));
    }

    #[test]
    fn status_reports_store_headroom() {
        let dir = TempDir::new().expect("tempdir");
        let mut engine = test_engine(&dir);
        let messages = engine.handle_command(&Command::GetStatus);
        match &messages[0] {
            Message::Status {
                free_memory_bytes, ..
            } => assert_eq!(*free_memory_bytes, 10 * RECORD_SIZE),
            other => panic!("expected STATUS, got {other:?}"),
        }
    }

    #[test]
    fn clear_data_empties_and_persists() {
        let dir = TempDir::new().expect("tempdir");
        let mut engine = test_engine(&dir);
        engine.classifier.add_labeled(FeatureVector::default(), Label::Rumble, 0);
        let messages = engine.handle_command(&Command::ClearData);
        assert_eq!(messages, vec![Message::Ok("dataset_cleared".into())]);
        assert!(engine.classifier.training().is_empty());
        assert!(engine.dirty, "clear schedules a flush");
    }
}

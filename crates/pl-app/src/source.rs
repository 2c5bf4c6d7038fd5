use std::f32::consts::PI;
use std::time::Instant;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use pl_core::error::SourceError;
use pl_core::source::SampleSource;
use rtrb::{Consumer, RingBuffer};

/// Forme d'onde du générateur synthétique.
#[derive(Clone, Copy, Debug)]
pub enum Waveform {
    /// Sinusoïde pure à fréquence et amplitude fixes.
    Tone {
        /// Fréquence en Hz.
        freq_hz: f32,
        /// Amplitude crête en unités i16.
        amplitude: i16,
    },
    /// Échantillons tous nuls.
    Silence,
}

/// Source synthétique déterministe, cadencée en temps réel.
///
/// Délivre exactement `sample_rate_hz` échantillons par seconde écoulée :
/// `read_sample()` retourne `None` une fois le quota de l'instant couvert,
/// ce qui émule le tick d'acquisition du matériel. L'échantillon i ne
/// dépend que de son index — deux runs produisent le même signal.
pub struct SyntheticSource {
    sample_rate_hz: u32,
    waveform: Waveform,
    started: Option<Instant>,
    emitted: u64,
}

impl SyntheticSource {
    /// Create a paced synthetic source. Not started until `configure()`.
    #[must_use]
    pub fn new(sample_rate_hz: u32, waveform: Waveform) -> Self {
        Self {
            sample_rate_hz: sample_rate_hz.max(1),
            waveform,
            started: None,
            emitted: 0,
        }
    }

    fn sample_at(&self, index: u64) -> i16 {
        match self.waveform {
            Waveform::Silence => 0,
            Waveform::Tone { freq_hz, amplitude } => {
                let t = index as f32 / self.sample_rate_hz as f32;
                (f32::from(amplitude) * (2.0 * PI * freq_hz * t).sin()) as i16
            }
        }
    }
}

impl SampleSource for SyntheticSource {
    fn configure(&mut self) -> Result<(), SourceError> {
        self.started = Some(Instant::now());
        log::info!(
            "Source synthétique démarrée : {:?} @ {} Hz",
            self.waveform,
            self.sample_rate_hz
        );
        Ok(())
    }

    fn read_sample(&mut self) -> Option<i16> {
        let started = self.started?;
        let due = (started.elapsed().as_secs_f64() * f64::from(self.sample_rate_hz)) as u64;
        if self.emitted >= due {
            return None;
        }
        let sample = self.sample_at(self.emitted);
        self.emitted += 1;
        Some(sample)
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

/// Capture microphone via cpal, décimée au taux cible.
///
/// Le callback audio downmixe en mono puis moyenne par boîtes de
/// `native_rate / target_rate` échantillons avant de pousser des i16 dans
/// un ring SPSC lock-free (rtrb). Producteur = callback cpal, consommateur
/// = boucle de contrôle : la discipline single-producer/single-consumer
/// rend l'écriture du curseur atomique vis-à-vis de la lecture, sans lock.
pub struct MicSource {
    target_rate_hz: u32,
    stream: Option<cpal::Stream>,
    consumer: Option<Consumer<i16>>,
}

impl MicSource {
    /// Create an unopened microphone source.
    #[must_use]
    pub fn new(target_rate_hz: u32) -> Self {
        Self {
            target_rate_hz: target_rate_hz.max(1),
            stream: None,
            consumer: None,
        }
    }
}

impl SampleSource for MicSource {
    fn configure(&mut self) -> Result<(), SourceError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(SourceError::NoInputDevice)?;

        let config = device
            .default_input_config()
            .map_err(|e| SourceError::StreamError(e.to_string()))?;
        let native_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        let decim = (native_rate / self.target_rate_hz) as usize;
        if decim == 0 {
            return Err(SourceError::UnsupportedRate {
                requested: self.target_rate_hz,
                native: native_rate,
            });
        }

        // Ring : 2 secondes d'échantillons au taux cible.
        let (mut producer, consumer) = RingBuffer::new(self.target_rate_hz as usize * 2);

        let mut acc = 0.0f32;
        let mut count = 0usize;
        let stream = device
            .build_input_stream(
                &config.into(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Downmix mono puis moyenne par boîte de `decim` échantillons.
                    for chunk in data.chunks(channels) {
                        acc += chunk.iter().sum::<f32>() / channels as f32;
                        count += 1;
                        if count == decim {
                            let avg = acc / decim as f32;
                            let sample =
                                (avg * pl_core::FULL_SCALE).clamp(-32768.0, 32767.0) as i16;
                            // Ring plein : l'échantillon est perdu, dégradation
                            // transitoire acceptée (pas de backfill).
                            let _ = producer.push(sample);
                            acc = 0.0;
                            count = 0;
                        }
                    }
                },
                |err| {
                    log::error!("Erreur du stream de capture : {err}");
                },
                None,
            )
            .map_err(|e| SourceError::StreamError(e.to_string()))?;

        stream
            .play()
            .map_err(|e| SourceError::StreamError(e.to_string()))?;

        log::info!(
            "Capture micro démarrée : {native_rate} Hz natif → {} Hz (décimation ×{decim})",
            self.target_rate_hz
        );
        self.stream = Some(stream);
        self.consumer = Some(consumer);
        Ok(())
    }

    fn read_sample(&mut self) -> Option<i16> {
        self.consumer.as_mut()?.pop().ok()
    }

    fn name(&self) -> &'static str {
        "mic"
    }
}

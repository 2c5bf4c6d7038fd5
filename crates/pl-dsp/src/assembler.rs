use pl_core::FRAME_SIZE;

/// Buffer circulaire à taille fixe qui assemble les frames d'analyse.
///
/// Index explicite + tableau fixe (style arène). L'écriture réussit
/// toujours : l'écrasement au wrap est un choix de design documenté, pas
/// un bug — le buffer contient exactement les N échantillons les plus
/// récents. Les frames sont des fenêtres consécutives de N échantillons,
/// sans recouvrement.
///
/// La complétion de frame est suivie par un flag `ready` explicite (posé
/// au wrap du curseur, effacé par `take_frame()`), plus lisible que le
/// test `cursor == 0` après un reset.
///
/// # Example
/// ```
/// use pl_dsp::assembler::FrameAssembler;
/// use pl_core::FRAME_SIZE;
///
/// let mut assembler = FrameAssembler::new();
/// for i in 0..FRAME_SIZE {
///     let wrapped = assembler.push(i as f32);
///     assert_eq!(wrapped, i == FRAME_SIZE - 1);
/// }
/// assert!(assembler.take_frame().is_some());
/// ```
pub struct FrameAssembler {
    buf: [f32; FRAME_SIZE],
    cursor: usize,
    ready: bool,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    /// Create an empty assembler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: [0.0; FRAME_SIZE],
            cursor: 0,
            ready: false,
        }
    }

    /// Ajoute un échantillon filtré au curseur courant.
    ///
    /// Retourne `true` exactement quand le curseur wrappe à zéro (frontière
    /// de frame). Ne perd jamais d'échantillon, ne refuse jamais d'écrire.
    #[inline(always)]
    pub fn push(&mut self, x: f32) -> bool {
        self.buf[self.cursor] = x;
        self.cursor = (self.cursor + 1) % FRAME_SIZE;
        if self.cursor == 0 {
            self.ready = true;
            return true;
        }
        false
    }

    /// Prend la frame complète si disponible, efface le flag `ready`.
    ///
    /// `None` quand aucune frame complète n'est prête — un résultat de
    /// poll normal, pas une erreur.
    pub fn take_frame(&mut self) -> Option<&[f32; FRAME_SIZE]> {
        if !self.ready {
            return None;
        }
        self.ready = false;
        Some(&self.buf)
    }

    /// Position courante du curseur d'écriture (pour debug/tests).
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

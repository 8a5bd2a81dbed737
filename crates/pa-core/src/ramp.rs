use crate::error::PicaError;

/// Rampe par défaut, du glyphe le moins encré (espace) au plus encré.
///
/// 251 glyphes, mesurés une fois pour toutes sur une police mono système.
/// Remplacée par une rampe générée dynamiquement quand le charset builder
/// de pa-font est activé.
pub const DEFAULT_RAMP: &str = " `¨·¸.-',¹:_¯~¬¦;¡!÷**ı|+<>/=»«ìíïi^ºLª®īĩîĭl¿J×v?cį)ĹĿ(YTĻĽĺ7¤tľŀŁ}{FċļsĸÝ[xćzç1I]łjĴCyV£52f3ĉčnÌÍİ¢ĵUXĆZĊSuÏÞPĮÇKAoÿýae4ĬEÎČĈĪĨÚÙńņŉkÜÁÀùúü¥ėwHÈÉÄÅöĖòGóĶäÛáàĄëéèąęËåñňĘOĂ$ÂûĔĀĚÊÃÆRāDēķõ½ĒpãôăĠâĕ96êěq¼ĲmN%0ĢħÒÓ#øÖĤĞ§ĜWMBæÐĐQÔ©ŃĦ8ĥÕĎŅĳđßþŇð@ŊÑ¾ġØģďğ&ĝ";

/// Rampe de caractères ordonnée par couverture d'encre croissante.
///
/// Invariant : longueur ≥ 2 ; l'index 0 est le glyphe le plus clair,
/// l'index `len - 1` le plus dense. Immuable une fois construite — un
/// changement de police reconstruit une rampe entière, jamais en place.
/// Les doublons sont autorisés (le set de base de pa-font en contient).
///
/// # Example
/// ```
/// use pa_core::ramp::CharRamp;
/// let ramp: CharRamp = " .:#@".parse().unwrap();
/// assert_eq!(ramp.len(), 5);
/// assert_eq!(ramp.glyphs()[0], ' ');
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CharRamp {
    glyphs: Vec<char>,
}

impl CharRamp {
    /// Construit une rampe à partir d'une séquence déjà triée.
    ///
    /// # Errors
    /// `InvalidParameter` si moins de 2 glyphes.
    pub fn new(glyphs: Vec<char>) -> Result<Self, PicaError> {
        if glyphs.len() < 2 {
            return Err(PicaError::InvalidParameter(format!(
                "une rampe exige au moins 2 glyphes (reçu {})",
                glyphs.len()
            )));
        }
        Ok(Self { glyphs })
    }

    /// Rampe par défaut embarquée. Infaillible.
    #[must_use]
    pub fn default_ramp() -> Self {
        Self {
            glyphs: DEFAULT_RAMP.chars().collect(),
        }
    }

    /// Les glyphes, dans l'ordre de luminosité.
    #[must_use]
    pub fn glyphs(&self) -> &[char] {
        &self.glyphs
    }

    /// Nombre de glyphes.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }
}

/// Parse une chaîne ordonnée clair → dense, comme `CharRamp::new`.
impl std::str::FromStr for CharRamp {
    type Err = PicaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.chars().collect())
    }
}

/// Table de correspondance luminosité [0..255] → index de rampe.
///
/// Pré-calculée une fois par rampe : `lut[v] = v * len / 256`, clampé à
/// `len - 1`. Coût O(1) par pixel, zéro flottant.
///
/// # Example
/// ```
/// use pa_core::ramp::{CharRamp, RampLut};
/// let ramp: CharRamp = " @".parse().unwrap();
/// let lut = RampLut::new(&ramp);
/// assert_eq!(lut.index(0), 0);
/// assert_eq!(lut.index(255), 1);
/// assert_eq!(lut.glyph(&ramp, 255), '@');
/// ```
pub struct RampLut {
    lut: [u8; 256],
}

impl RampLut {
    /// Construit la LUT pour une rampe donnée.
    ///
    /// Une rampe porte au plus 256 glyphes utiles : au-delà, les index
    /// excédentaires ne seraient jamais atteints par un byte de luminosité.
    #[must_use]
    pub fn new(ramp: &CharRamp) -> Self {
        let len = ramp.len().min(256);
        let mut lut = [0u8; 256];
        for (v, slot) in lut.iter_mut().enumerate() {
            *slot = (v * len / 256).min(len - 1) as u8;
        }
        Self { lut }
    }

    /// Index de rampe pour une luminosité.
    #[inline(always)]
    #[must_use]
    pub fn index(&self, v: u8) -> usize {
        self.lut[v as usize] as usize
    }

    /// Glyphe pour une luminosité. `ramp` doit être la rampe d'origine.
    #[inline(always)]
    #[must_use]
    pub fn glyph(&self, ramp: &CharRamp, v: u8) -> char {
        ramp.glyphs[self.index(v)]
    }
}

//! Diffusion d'erreur sur la luminosité, en amont de la sélection de glyphe.
//!
//! La quantification se fait sur `len(rampe) - 1` niveaux répartis sur
//! [0..255] ; l'erreur résiduelle est diffusée en flottant sur les pixels
//! pas encore visités. Le balayage est strictement gauche → droite,
//! haut → bas — l'état est séquentiel par construction.

/// Niveaux de quantification, bornés par la taille de la rampe.
///
/// `levels - 1` pas entre 0 et 255 ; jamais zéro pas, même pour une rampe
/// dégénérée.
#[inline]
fn steps(levels: usize) -> f32 {
    (levels.saturating_sub(1)).max(1) as f32
}

/// Quantifie une luminosité flottante sur la grille de niveaux, arrondi
/// au plus proche dans les deux sens (index puis valeur).
#[inline(always)]
fn quantize(v: f32, m: f32) -> u8 {
    let idx = (v * m / 255.0 + 0.5).floor().clamp(0.0, m);
    (idx * 255.0 / m + 0.5) as u8
}

/// État Floyd–Steinberg : deux lignes d'erreur glissantes.
///
/// Les buffers portent `width + 2` entrées — une marge de chaque côté
/// absorbe la diffusion aux bords sans test d'indice.
pub struct FloydSteinberg {
    curr: Vec<f32>,
    next: Vec<f32>,
    m: f32,
}

impl FloydSteinberg {
    #[must_use]
    pub fn new(width: u32, levels: usize) -> Self {
        let n = width as usize + 2;
        Self {
            curr: vec![0.0; n],
            next: vec![0.0; n],
            m: steps(levels),
        }
    }

    /// À appeler au début de chaque scanline : l'erreur accumulée pour la
    /// ligne suivante devient courante.
    pub fn begin_row(&mut self) {
        std::mem::swap(&mut self.curr, &mut self.next);
        self.next.fill(0.0);
    }

    /// Traite un pixel : luminosité brute → luminosité quantifiée, avec
    /// diffusion 7/16 à droite, 3/16, 5/16, 1/16 sur la ligne suivante.
    #[inline(always)]
    pub fn process(&mut self, x: usize, base: u8) -> u8 {
        let v = (f32::from(base) + self.curr[x + 1]).clamp(0.0, 255.0);
        let qh = quantize(v, self.m);
        let err = v - f32::from(qh);
        self.curr[x + 2] += err * (7.0 / 16.0);
        self.next[x] += err * (3.0 / 16.0);
        self.next[x + 1] += err * (5.0 / 16.0);
        self.next[x + 2] += err * (1.0 / 16.0);
        qh
    }
}

/// État Atkinson : trois lignes d'erreur glissantes.
///
/// Six voisins reçoivent 1/8 de l'erreur chacun ; le quart restant est
/// perdu, ce qui éclaircit les aplats — c'est le rendu voulu.
pub struct Atkinson {
    curr: Vec<f32>,
    next: Vec<f32>,
    next2: Vec<f32>,
    m: f32,
}

impl Atkinson {
    #[must_use]
    pub fn new(width: u32, levels: usize) -> Self {
        // Marge de 2 de chaque côté : la diffusion atteint x + 2.
        let n = width as usize + 4;
        Self {
            curr: vec![0.0; n],
            next: vec![0.0; n],
            next2: vec![0.0; n],
            m: steps(levels),
        }
    }

    /// Rotation des trois lignes au début de chaque scanline.
    pub fn begin_row(&mut self) {
        std::mem::swap(&mut self.curr, &mut self.next);
        std::mem::swap(&mut self.next, &mut self.next2);
        self.next2.fill(0.0);
    }

    /// Traite un pixel ; voisins servis : (+1, 0), (+2, 0), (-1, +1),
    /// (0, +1), (+1, +1), (0, +2).
    #[inline(always)]
    pub fn process(&mut self, x: usize, base: u8) -> u8 {
        let i = x + 2;
        let v = (f32::from(base) + self.curr[i]).clamp(0.0, 255.0);
        let qh = quantize(v, self.m);
        let err = (v - f32::from(qh)) / 8.0;
        self.curr[i + 1] += err;
        self.curr[i + 2] += err;
        self.next[i - 1] += err;
        self.next[i] += err;
        self.next[i + 1] += err;
        self.next2[i] += err;
        qh
    }
}

/// Ditherer unifié pour la boucle de rendu : un seul dispatch par pixel.
pub enum Ditherer {
    None,
    FloydSteinberg(FloydSteinberg),
    Atkinson(Atkinson),
}

impl Ditherer {
    #[must_use]
    pub fn new(mode: pa_core::config::DitherMode, width: u32, levels: usize) -> Self {
        match mode {
            pa_core::config::DitherMode::None => Self::None,
            pa_core::config::DitherMode::FloydSteinberg => {
                Self::FloydSteinberg(FloydSteinberg::new(width, levels))
            }
            pa_core::config::DitherMode::Atkinson => Self::Atkinson(Atkinson::new(width, levels)),
        }
    }

    /// À appeler avant chaque scanline.
    pub fn begin_row(&mut self) {
        match self {
            Self::None => {}
            Self::FloydSteinberg(d) => d.begin_row(),
            Self::Atkinson(d) => d.begin_row(),
        }
    }

    /// Luminosité effective d'un pixel : brute sans tramage, quantifiée
    /// avec diffusion sinon.
    #[inline(always)]
    pub fn process(&mut self, x: usize, base: u8) -> u8 {
        match self {
            Self::None => base,
            Self::FloydSteinberg(d) => d.process(x, base),
            Self::Atkinson(d) => d.process(x, base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_dither_passes_brightness_through() {
        let mut d = Ditherer::new(pa_core::config::DitherMode::None, 4, 70);
        d.begin_row();
        assert_eq!(d.process(0, 0), 0);
        assert_eq!(d.process(1, 128), 128);
        assert_eq!(d.process(2, 255), 255);
    }

    #[test]
    fn floyd_steinberg_mid_gray_alternates_on_two_levels() {
        // Gris 128 quantifié sur {0, 255} : le premier pixel monte à 255,
        // l'erreur -127 pousse le suivant vers 0, et ainsi de suite.
        let mut d = FloydSteinberg::new(2, 2);
        let mut rows = Vec::new();
        for _ in 0..4 {
            d.begin_row();
            rows.push([d.process(0, 128), d.process(1, 128)]);
        }
        assert_eq!(rows[0], [255, 0]);
        assert_eq!(rows[1], [0, 255]);
        assert_eq!(rows[2], [255, 0]);
        assert_eq!(rows[3], [0, 255]);
    }

    #[test]
    fn floyd_steinberg_preserves_extremes() {
        let mut d = FloydSteinberg::new(3, 5);
        d.begin_row();
        assert_eq!(d.process(0, 0), 0);
        assert_eq!(d.process(1, 255), 255);
        // Aucune erreur générée : le pixel suivant reste exact.
        assert_eq!(d.process(2, 0), 0);
    }

    #[test]
    fn atkinson_loses_a_quarter_of_the_error() {
        // Un seul pixel à 128 sur 2 niveaux : erreur -127, 6/8 diffusés.
        let mut d = Atkinson::new(4, 2);
        d.begin_row();
        let q = d.process(0, 128);
        assert_eq!(q, 255);
        let spread: f32 = d.curr.iter().chain(&d.next).chain(&d.next2).sum();
        let expected = (128.0 - 255.0) * 6.0 / 8.0;
        assert!((spread - expected).abs() < 1e-3);
    }

    #[test]
    fn two_glyph_ramp_quantizes_without_division_by_zero() {
        let mut d = Ditherer::new(pa_core::config::DitherMode::FloydSteinberg, 8, 2);
        d.begin_row();
        for x in 0..8 {
            let q = d.process(x, 200);
            assert!(q == 0 || q == 255);
        }
    }

    #[test]
    fn quantized_values_sit_on_the_level_grid() {
        // 5 niveaux : multiples arrondis de 255/4.
        let mut d = FloydSteinberg::new(16, 5);
        d.begin_row();
        for x in 0..16 {
            let q = d.process(x, 97);
            assert!([0u8, 64, 128, 191, 255].contains(&q), "q = {q}");
        }
    }
}

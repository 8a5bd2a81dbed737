//! Atlas de masques de glyphes pour la sortie raster.
//!
//! Un glyphe identique à taille de cellule fixe n'est rasterisé qu'une
//! fois ; la couleur par cellule est composée sur le stencil au rendu,
//! jamais en re-dessinant le texte pixel par pixel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pa_core::ramp::CharRamp;

use crate::font::LoadedFont;

/// Stencils alpha de tous les glyphes d'une rampe, à une taille de cellule
/// et une police données. Lecture seule après construction.
pub struct GlyphAtlas {
    cell_w: u32,
    cell_h: u32,
    masks: HashMap<char, Vec<u8>>,
    /// Stencil vide partagé pour les glyphes hors police.
    empty: Vec<u8>,
}

impl GlyphAtlas {
    /// Rasterise chaque glyphe unique de la rampe en stencil `cell_w × cell_h`.
    ///
    /// La taille de rendu suit la hauteur de cellule, comme un terminal :
    /// la plume est posée en (0, 0) de la cellule.
    #[must_use]
    pub fn build(font: &LoadedFont, cell_w: u32, cell_h: u32, ramp: &CharRamp) -> Self {
        let mut masks = HashMap::new();
        for &ch in ramp.glyphs() {
            // Doublons de rampe : un seul stencil par contenu de glyphe.
            if masks.contains_key(&ch) {
                continue;
            }
            if let Some(buf) = font.rasterize(ch, cell_h as f32, cell_w, cell_h, 0.0, 0.0) {
                masks.insert(ch, buf);
            }
        }
        Self {
            cell_w,
            cell_h,
            masks,
            empty: vec![0u8; (cell_w * cell_h) as usize],
        }
    }

    /// Stencil alpha d'un glyphe ; vide si la police ne le couvre pas.
    #[inline]
    #[must_use]
    pub fn mask(&self, ch: char) -> &[u8] {
        self.masks.get(&ch).map_or(&self.empty, Vec::as_slice)
    }

    /// Largeur de cellule du stencil.
    #[must_use]
    pub fn cell_width(&self) -> u32 {
        self.cell_w
    }

    /// Hauteur de cellule du stencil.
    #[must_use]
    pub fn cell_height(&self) -> u32 {
        self.cell_h
    }
}

/// Clé d'identité d'un atlas : police + taille de cellule + contenu de rampe.
#[derive(Clone, PartialEq, Eq, Hash)]
struct MaskKey {
    font_identity: String,
    cell_w: u32,
    cell_h: u32,
    ramp: String,
}

/// Cache d'atlas partagé, possédé par l'appelant et injecté dans le
/// renderer — pas d'état global de module.
///
/// Read-mostly : un seul verrou suffit, les atlas sont des `Arc` immuables.
/// Pas d'éviction — le nombre de combinaisons (police, cellule, rampe)
/// d'un run est petit et borné par la configuration.
#[derive(Default)]
pub struct MaskCache {
    inner: Mutex<HashMap<MaskKey, Arc<GlyphAtlas>>>,
}

impl MaskCache {
    /// Cache vide.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Retourne l'atlas pour cette combinaison, en le construisant au
    /// premier accès. Un verrou empoisonné est récupéré tel quel — les
    /// atlas déjà insérés restent valides.
    #[must_use]
    pub fn get_or_build(
        &self,
        font: &LoadedFont,
        cell_w: u32,
        cell_h: u32,
        ramp: &CharRamp,
    ) -> Arc<GlyphAtlas> {
        let key = MaskKey {
            font_identity: font.identity().to_string(),
            cell_w,
            cell_h,
            ramp: ramp.glyphs().iter().collect(),
        };
        let mut map = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(
            map.entry(key)
                .or_insert_with(|| Arc::new(GlyphAtlas::build(font, cell_w, cell_h, ramp))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atlas_serves_empty_stencil_for_unknown_glyph() {
        let Ok(font) = LoadedFont::system_default() else {
            return;
        };
        let ramp = " @".parse::<CharRamp>().unwrap();
        let atlas = GlyphAtlas::build(&font, 10, 18, &ramp);
        assert_eq!(atlas.mask('\u{ffff}').len(), 180);
        assert!(atlas.mask('\u{ffff}').iter().all(|&a| a == 0));
    }

    #[test]
    fn dense_glyph_has_ink_blank_has_none() {
        let Ok(font) = LoadedFont::system_default() else {
            return;
        };
        let ramp = " @".parse::<CharRamp>().unwrap();
        let atlas = GlyphAtlas::build(&font, 10, 18, &ramp);
        assert!(atlas.mask('@').iter().any(|&a| a > 0));
        assert!(atlas.mask(' ').iter().all(|&a| a == 0));
    }

    #[test]
    fn cache_returns_same_atlas_for_same_identity() {
        let Ok(font) = LoadedFont::system_default() else {
            return;
        };
        let ramp = " .:#@".parse::<CharRamp>().unwrap();
        let cache = MaskCache::new();
        let a = cache.get_or_build(&font, 10, 18, &ramp);
        let b = cache.get_or_build(&font, 10, 18, &ramp);
        assert!(Arc::ptr_eq(&a, &b));

        let c = cache.get_or_build(&font, 8, 16, &ramp);
        assert!(!Arc::ptr_eq(&a, &c));
    }
}

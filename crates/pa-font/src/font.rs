use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, point};

use pa_core::error::PicaError;

/// Polices mono système essayées quand aucune police n'est fournie,
/// dans l'ordre. Mêmes candidates que l'outil d'origine, plus les
/// emplacements Linux alternatifs courants.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "C:\\Windows\\Fonts\\lucon.ttf",
];

/// Une police TTF chargée, avec son identité de cache.
///
/// L'identité est le chemin du fichier, ou `"default"` pour la police
/// système de repli — c'est la clé du cache de rampes et des atlas.
pub struct LoadedFont {
    font: FontVec,
    identity: String,
}

impl LoadedFont {
    /// Charge une police depuis un fichier TTF/OTF.
    ///
    /// # Errors
    /// `FontLoad` si le fichier est illisible ou n'est pas une police.
    pub fn from_path(path: &Path) -> Result<Self, PicaError> {
        let bytes = std::fs::read(path)
            .map_err(|e| PicaError::FontLoad(format!("{} : {e}", path.display())))?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| PicaError::FontLoad(format!("{} : {e}", path.display())))?;
        Ok(Self {
            font,
            identity: path.display().to_string(),
        })
    }

    /// Première police mono système disponible.
    ///
    /// # Errors
    /// `FontLoad` si aucune candidate n'existe sur ce système.
    pub fn system_default() -> Result<Self, PicaError> {
        for candidate in SYSTEM_FONT_CANDIDATES {
            let path = Path::new(candidate);
            if path.exists() {
                let mut font = Self::from_path(path)?;
                font.identity = "default".to_string();
                return Ok(font);
            }
        }
        Err(PicaError::FontLoad(
            "aucune police mono système trouvée".to_string(),
        ))
    }

    /// Charge la police utilisateur, avec repli sur la police système.
    ///
    /// Une police utilisateur illisible est signalée (warn) puis remplacée —
    /// jamais fatale. L'erreur finale ne survient que si le système n'a
    /// aucune police du tout.
    ///
    /// # Errors
    /// `FontLoad` uniquement quand ni la police demandée ni aucune police
    /// système n'est chargeable.
    pub fn load_or_default(user: Option<&Path>) -> Result<Self, PicaError> {
        if let Some(path) = user {
            match Self::from_path(path) {
                Ok(font) => return Ok(font),
                Err(e) => {
                    log::warn!("{e} — repli sur la police système");
                }
            }
        }
        Self::system_default()
    }

    /// Identité de cache : chemin fourni ou `"default"`.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Rasterise un glyphe dans un buffer alpha `w × h` (0 = vide,
    /// 255 = plein), pointe de plume à `(ox, oy)` depuis le coin haut-gauche.
    ///
    /// Retourne `None` si la police ne couvre pas ce caractère (.notdef),
    /// pour éviter de mesurer ou dessiner des boîtes de remplacement.
    #[must_use]
    pub fn rasterize(&self, ch: char, px: f32, w: u32, h: u32, ox: f32, oy: f32) -> Option<Vec<u8>> {
        let gid = self.font.glyph_id(ch);
        if gid.0 == 0 && ch != '\0' {
            return None;
        }

        let mut buffer = vec![0u8; (w * h) as usize];
        let scale = PxScale::from(px);
        let ascent_px = self.font.ascent_unscaled() * scale.y / self.font.height_unscaled();
        let glyph = gid.with_scale_and_position(scale, point(ox, oy + ascent_px));

        if let Some(outline) = self.font.outline_glyph(glyph) {
            let bounds = outline.px_bounds();
            #[allow(clippy::cast_possible_wrap)]
            outline.draw(|x, y, v| {
                let gx = (x as i32 + bounds.min.x as i32).max(0) as u32;
                let gy = (y as i32 + bounds.min.y as i32).max(0) as u32;
                if gx < w && gy < h {
                    let idx = (gy * w + gx) as usize;
                    if idx < buffer.len() {
                        buffer[idx] = (v * 255.0).round() as u8;
                    }
                }
            });
        }
        Some(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_font_file_is_font_load_error() {
        let err = LoadedFont::from_path(Path::new("/nonexistent/font.ttf"));
        assert!(matches!(err, Err(PicaError::FontLoad(_))));
    }

    #[test]
    fn garbage_bytes_are_not_a_font() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        assert!(matches!(
            LoadedFont::from_path(&path),
            Err(PicaError::FontLoad(_))
        ));
    }
}

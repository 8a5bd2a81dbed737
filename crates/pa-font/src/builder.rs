//! Charset builder : mesure la couverture d'encre de chaque candidat et
//! retourne une rampe triée du plus clair au plus dense.

use pa_core::ramp::CharRamp;

use crate::font::LoadedFont;

/// ASCII imprimable, sans `"` ni `\` (peu utiles dans une rampe et pénibles
/// à citer dans les artefacts texte).
const BASE_ASCII: &str =
    " !#$%&'()*+,-./0123456789:;<=>?@ABCDEFGHIJKLMNOPQRSTUVWXYZ[]^_`abcdefghijklmnopqrstuvwxyz{|}~";

/// Supplément Latin-1 : ponctuation, symboles et lettres accentuées.
const BASE_LATIN1: &str = "¡¢£¤¥¦§¨©ª«¬®¯·¸¹º»¼½¾¿ÀÁÂÃÄÅÆÇÈÉÊËÌÍÎÏÐÑÒÓÔÕÖ×ØÙÚÛÜÝÞßàáâãäåæçèéêëìíîïðñòóôõö÷øùúûüýþÿ";

/// Latin étendu A, jusqu'à Ŋ (U+014A).
const BASE_LATIN_EXT_A: &str = "ĀāĂăĄąĆćĈĉĊċČčĎďĐđĒēĔĕĖėĘęĚěĜĝĞğĠġĢģĤĥĦħĨĩĪīĬĭĮįİıĲĳĴĵĶķĸĹĺĻļĽľĿŀŁłŃńŅņŇňŉŊ";

/// Canvas de mesure : assez grand pour un glyphe à 250 px sans rognage.
const INK_CANVAS_W: u32 = 200;
const INK_CANVAS_H: u32 = 250;
/// Taille de rendu des candidats. Grande pour la précision du ratio.
const INK_POINT_SIZE: f32 = 250.0;
/// Plume décalée du bord pour laisser respirer les diacritiques.
const INK_PEN: (f32, f32) = (25.0, 5.0);
/// Un pixel compte comme encré au-dessus de ce seuil alpha.
const INK_THRESHOLD: u8 = 100;

/// Le set de candidats par défaut du builder.
///
/// # Example
/// ```
/// use pa_font::builder::base_chars;
/// let base = base_chars();
/// assert!(base.contains(&' '));
/// assert!(base.contains(&'@'));
/// assert!(base.len() > 200);
/// ```
#[must_use]
pub fn base_chars() -> Vec<char> {
    let mut out: Vec<char> = BASE_ASCII.chars().collect();
    out.extend(BASE_LATIN1.chars());
    out.extend(BASE_LATIN_EXT_A.chars());
    out
}

/// Ratio de pixels encrés pour `ch` rendu sur le canvas de mesure.
///
/// Retourne `None` quand la police ne couvre pas le caractère — le
/// candidat est alors écarté de la rampe plutôt que mesuré à zéro.
#[must_use]
pub fn ink_ratio(font: &LoadedFont, ch: char) -> Option<f32> {
    let buf = font.rasterize(
        ch,
        INK_POINT_SIZE,
        INK_CANVAS_W,
        INK_CANVAS_H,
        INK_PEN.0,
        INK_PEN.1,
    )?;
    let lit = buf.iter().filter(|&&a| a > INK_THRESHOLD).count();
    Some(lit as f32 / (INK_CANVAS_W * INK_CANVAS_H) as f32)
}

/// Construit la rampe : candidats triés par ratio d'encre croissant.
///
/// Tri stable — les ex æquo gardent l'ordre du set de base, il n'existe
/// aucun autre signal pour les départager. Les doublons du set restent.
/// Repli sur la rampe par défaut si moins de 2 candidats sont mesurables
/// (police exotique sans couverture latine).
#[must_use]
pub fn build_ramp(font: &LoadedFont, base: &[char]) -> CharRamp {
    let mut measured: Vec<(f32, char)> = base
        .iter()
        .filter_map(|&ch| ink_ratio(font, ch).map(|ratio| (ratio, ch)))
        .collect();

    measured.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let glyphs: Vec<char> = measured.into_iter().map(|(_, ch)| ch).collect();
    match CharRamp::new(glyphs) {
        Ok(ramp) => ramp,
        Err(_) => {
            log::warn!("police sans couverture mesurable, rampe par défaut utilisée");
            CharRamp::default_ramp()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system_font() -> Option<LoadedFont> {
        LoadedFont::system_default().ok()
    }

    #[test]
    fn space_ranks_first_on_any_real_font() {
        // Sans police système le builder n'est pas testable ici ; le repli
        // DEFAULT_RAMP est couvert par pa-core.
        let Some(font) = system_font() else { return };
        let ramp = build_ramp(&font, &base_chars());
        assert_eq!(ramp.glyphs()[0], ' ');
        assert!(ramp.len() >= 2);
    }

    #[test]
    fn ink_ratio_orders_space_below_at_sign() {
        let Some(font) = system_font() else { return };
        let space = ink_ratio(&font, ' ').unwrap();
        let dense = ink_ratio(&font, '@').unwrap();
        assert_eq!(space, 0.0);
        assert!(dense > space);
    }

    #[test]
    fn build_is_deterministic() {
        let Some(font) = system_font() else { return };
        let base = base_chars();
        let a = build_ramp(&font, &base);
        let b = build_ramp(&font, &base);
        assert_eq!(a, b);
    }
}

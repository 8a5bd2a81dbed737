//! Nommage des artefacts de sortie.
//!
//! Un stem encode les paramètres qui changent le rendu :
//! `O_h_{brightness}_f_{scale}_{base}`, plus un index pour les sources
//! multi-frames. Le parsing inverse sert au nettoyage et aux tests.

/// Paramètres extraits d'un stem de sortie.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStem {
    pub bg_brightness: u8,
    pub scale: f32,
    pub base: String,
}

/// Stem d'artefact pour une frame donnée.
///
/// `frame` n'est ajouté que pour les sources multi-frames — une image
/// fixe garde un nom stable d'un run à l'autre.
///
/// # Example
/// ```
/// use pa_export::naming::output_stem;
/// assert_eq!(output_stem(30, 0.2, "photo", None), "O_h_30_f_0.2_photo");
/// assert_eq!(output_stem(30, 0.2, "anim", Some(3)), "O_h_30_f_0.2_anim_3");
/// ```
#[must_use]
pub fn output_stem(bg_brightness: u8, scale: f32, base: &str, frame: Option<u32>) -> String {
    let mut stem = format!("O_h_{bg_brightness}_f_{scale}_{base}");
    if let Some(index) = frame {
        stem.push('_');
        stem.push_str(&index.to_string());
    }
    stem
}

/// Stem de frame vidéo : l'index est zero-paddé pour que le pattern
/// `%05d` de ffmpeg et l'ordre lexicographique coïncident.
#[must_use]
pub fn video_frame_base(base: &str, index: u32) -> String {
    format!("{base}_{index:05}")
}

/// Inverse de [`output_stem`] (sans l'index de frame — il est indistinct
/// d'un `base` se terminant par un nombre).
///
/// # Example
/// ```
/// use pa_export::naming::parse_stem;
/// let p = parse_stem("O_h_30_f_0.2_my_photo").unwrap();
/// assert_eq!(p.base, "my_photo");
/// ```
#[must_use]
pub fn parse_stem(stem: &str) -> Option<ParsedStem> {
    let rest = stem.strip_prefix("O_h_")?;
    let (bg, rest) = rest.split_once("_f_")?;
    let (scale, base) = rest.split_once('_')?;
    Some(ParsedStem {
        bg_brightness: bg.parse().ok()?,
        scale: scale.parse().ok()?,
        base: base.to_string(),
    })
}

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::PicaError;
use crate::luma::GrayscaleMode;

/// Largeur par défaut d'une cellule caractère en pixels (sortie raster).
pub const ONE_CHAR_WIDTH: u32 = 10;
/// Hauteur par défaut d'une cellule caractère en pixels (sortie raster).
pub const ONE_CHAR_HEIGHT: u32 = 18;

/// Format de sortie d'une frame rendue.
///
/// Variante taguée plutôt que des comparaisons de chaînes disséminées :
/// un seul point de parsing, quatre chemins de rendu.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Image raster composée avec la police (PNG par artefact).
    #[default]
    Raster,
    /// Texte brut, couleurs ignorées.
    Text,
    /// Fragment HTML avec spans colorés inline.
    Html,
    /// Texte ANSI truecolor écrit sur stdout, aucun fichier.
    Ansi,
}

impl OutputFormat {
    /// Extension de fichier de l'artefact persisté. `None` pour ANSI.
    #[must_use]
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::Raster => Some("png"),
            Self::Text => Some("txt"),
            Self::Html => Some("html"),
            Self::Ansi => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = PicaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Raster),
            "text" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            "ansi" => Ok(Self::Ansi),
            other => Err(PicaError::InvalidParameter(format!(
                "format inconnu '{other}' (attendu : image, text, html, ansi)"
            ))),
        }
    }
}

/// Tramage par diffusion d'erreur appliqué à la luminosité avant la
/// sélection du glyphe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DitherMode {
    /// Pas de tramage : LUT directe.
    #[default]
    None,
    /// Floyd–Steinberg, diffusion 7/16, 3/16, 5/16, 1/16 sur 2 lignes.
    FloydSteinberg,
    /// Atkinson : 6 voisins à 1/8, 2/8 de l'erreur volontairement perdus.
    Atkinson,
}

impl FromStr for DitherMode {
    type Err = PicaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "floyd-steinberg" => Ok(Self::FloydSteinberg),
            "atkinson" => Ok(Self::Atkinson),
            other => Err(PicaError::InvalidParameter(format!(
                "dither inconnu '{other}' (attendu : none, floyd-steinberg, atkinson)"
            ))),
        }
    }
}

/// Paramètres d'une conversion. Validés une fois à l'entrée, jamais clampés.
///
/// # Example
/// ```
/// use pa_core::config::ConvertOptions;
/// let opts = ConvertOptions::default();
/// assert!(opts.validate().is_ok());
/// assert_eq!(opts.bg_brightness, 30);
/// ```
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    /// Facteur d'échelle de la grille, dans (0, 1].
    pub scale: f32,
    /// Luminosité du fond de sortie [0..255].
    pub bg_brightness: u8,
    /// Format de sortie.
    pub format: OutputFormat,
    /// Rendu en niveaux de gris (la luminosité quantifiée remplit R=G=B).
    pub mono: bool,
    /// Formule RGB → luminosité.
    pub grayscale: GrayscaleMode,
    /// Tramage par diffusion d'erreur.
    pub dither: DitherMode,
    /// Largeur d'une cellule en pixels (raster + correction d'aspect).
    pub cell_width: u32,
    /// Hauteur d'une cellule en pixels (raster + correction d'aspect).
    pub cell_height: u32,
    /// Assembler les frames d'une source animée en un GIF unique.
    pub assemble: bool,
    /// Cadence fixe pour le GIF assemblé. `None` = durées par frame source.
    pub gif_fps: Option<f32>,
    /// Nombre de boucles du GIF assemblé. 0 = infini.
    pub gif_loop: u32,
    /// Dossier de sortie des artefacts.
    pub output_dir: PathBuf,
    /// Police TTF pour le raster et le charset dynamique.
    pub font_path: Option<PathBuf>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            scale: 0.2,
            bg_brightness: 30,
            format: OutputFormat::Raster,
            mono: false,
            grayscale: GrayscaleMode::Avg,
            dither: DitherMode::None,
            cell_width: ONE_CHAR_WIDTH,
            cell_height: ONE_CHAR_HEIGHT,
            assemble: false,
            gif_fps: None,
            gif_loop: 0,
            output_dir: PathBuf::from("./assets/output"),
            font_path: None,
        }
    }
}

impl ConvertOptions {
    /// Valide tous les paramètres numériques. Échec immédiat, pas de clamp.
    ///
    /// # Errors
    /// `InvalidParameter` avec un message décrivant la borne violée.
    pub fn validate(&self) -> Result<(), PicaError> {
        if !(self.scale > 0.0 && self.scale <= 1.0) || !self.scale.is_finite() {
            return Err(PicaError::InvalidParameter(format!(
                "scale doit être dans (0, 1], reçu {}",
                self.scale
            )));
        }
        if self.cell_width == 0 || self.cell_height == 0 {
            return Err(PicaError::InvalidParameter(format!(
                "dimensions de cellule non positives : {}×{}",
                self.cell_width, self.cell_height
            )));
        }
        if let Some(fps) = self.gif_fps {
            if !(fps > 0.0) || !fps.is_finite() {
                return Err(PicaError::InvalidParameter(format!(
                    "gif_fps doit être strictement positif, reçu {fps}"
                )));
            }
        }
        Ok(())
    }
}

/// Structure TOML intermédiaire, tous champs optionnels pour un override
/// partiel des défauts.
#[derive(Deserialize)]
struct ConfigFile {
    scale: Option<f32>,
    brightness: Option<u8>,
    output_dir: Option<String>,
    format: Option<String>,
    grayscale: Option<String>,
    dither: Option<String>,
    mono: Option<bool>,
    font: Option<String>,
    cell_width: Option<u32>,
    cell_height: Option<u32>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// Les noms de mode inconnus remontent `InvalidParameter` — un fichier de
/// config erroné échoue avant tout traitement de pixel.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or if a mode
/// name is unknown.
///
/// # Example
/// ```no_run
/// use pa_core::config::load_options;
/// use std::path::Path;
/// let opts = load_options(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_options(path: &Path) -> Result<ConvertOptions> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;

    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))?;

    let mut opts = ConvertOptions::default();
    if let Some(v) = file.scale {
        opts.scale = v;
    }
    if let Some(v) = file.brightness {
        opts.bg_brightness = v;
    }
    if let Some(v) = file.output_dir {
        opts.output_dir = PathBuf::from(v);
    }
    if let Some(v) = file.format {
        opts.format = v.parse()?;
    }
    if let Some(v) = file.grayscale {
        opts.grayscale = v.parse()?;
    }
    if let Some(v) = file.dither {
        opts.dither = v.parse()?;
    }
    if let Some(v) = file.mono {
        opts.mono = v;
    }
    if let Some(v) = file.font {
        opts.font_path = Some(PathBuf::from(v));
    }
    if let Some(v) = file.cell_width {
        opts.cell_width = v;
    }
    if let Some(v) = file.cell_height {
        opts.cell_height = v;
    }
    log::debug!(
        "options chargées depuis {} (scale={}, format={:?})",
        path.display(),
        opts.scale,
        opts.format
    );
    Ok(opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_bounds_exclusive_low_inclusive_high() {
        let mut opts = ConvertOptions::default();
        opts.scale = 0.0;
        assert!(opts.validate().is_err());
        opts.scale = 1.0;
        assert!(opts.validate().is_ok());
        opts.scale = 1.01;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn brightness_extremes_accepted() {
        let mut opts = ConvertOptions::default();
        opts.bg_brightness = 0;
        assert!(opts.validate().is_ok());
        opts.bg_brightness = 255;
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn zero_cell_dimensions_rejected() {
        let mut opts = ConvertOptions::default();
        opts.cell_height = 0;
        assert!(matches!(
            opts.validate(),
            Err(PicaError::InvalidParameter(_))
        ));
    }

    #[test]
    fn non_positive_gif_fps_rejected() {
        let mut opts = ConvertOptions::default();
        opts.gif_fps = Some(0.0);
        assert!(opts.validate().is_err());
        opts.gif_fps = Some(24.0);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn toml_file_merges_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf.toml");
        std::fs::write(&path, "scale = 0.5\nformat = \"html\"\nmono = true\n").unwrap();

        let opts = load_options(&path).unwrap();
        assert!((opts.scale - 0.5).abs() < f32::EPSILON);
        assert_eq!(opts.format, OutputFormat::Html);
        assert!(opts.mono);
        // Les clés absentes gardent leur défaut.
        assert_eq!(opts.bg_brightness, 30);
        assert_eq!(opts.cell_height, ONE_CHAR_HEIGHT);
    }

    #[test]
    fn unknown_mode_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf.toml");
        std::fs::write(&path, "dither = \"bayer\"\n").unwrap();
        assert!(load_options(&path).is_err());
    }

    #[test]
    fn unknown_format_and_dither_rejected() {
        assert!("gif".parse::<OutputFormat>().is_err());
        assert!("bayer".parse::<DitherMode>().is_err());
        assert_eq!(
            "floyd-steinberg".parse::<DitherMode>().unwrap(),
            DitherMode::FloydSteinberg
        );
    }
}

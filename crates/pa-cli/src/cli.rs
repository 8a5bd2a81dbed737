use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use pa_core::config::ConvertOptions;
use pa_core::error::PicaError;

/// Destination des frames d'une conversion vidéo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VideoOut {
    /// Un artefact par frame.
    #[default]
    Frames,
    /// Un GIF unique assemblé à la volée.
    Gif,
    /// Un MP4 encodé en flux via ffmpeg.
    Mp4,
}

impl FromStr for VideoOut {
    type Err = PicaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "frames" => Ok(Self::Frames),
            "gif" => Ok(Self::Gif),
            "mp4" => Ok(Self::Mp4),
            other => Err(PicaError::InvalidParameter(format!(
                "video-out inconnu '{other}' (attendu : frames, gif, mp4)"
            ))),
        }
    }
}

/// picascii — Convertisseur d'images et de vidéos en art ASCII.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Image source (PNG, JPEG, BMP, WebP, ou GIF animé).
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Dossier d'images à convertir en lot.
    #[arg(long)]
    pub batch: Option<PathBuf>,

    /// Vidéo source (tout conteneur décodable par ffmpeg).
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// Utiliser la webcam comme source, jusqu'à Ctrl-C.
    #[arg(long, default_value_t = false)]
    pub webcam: bool,

    /// Facteur d'échelle de la grille, dans (0, 1].
    #[arg(short, long)]
    pub scale: Option<f32>,

    /// Luminosité du fond [0..255].
    #[arg(short, long)]
    pub brightness: Option<u8>,

    /// Dossier de sortie des artefacts.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Format de sortie : image, text, html, ansi.
    #[arg(short, long)]
    pub format: Option<String>,

    /// Formule de luminosité : avg, luma601, luma709.
    #[arg(long)]
    pub grayscale: Option<String>,

    /// Tramage : none, floyd-steinberg, atkinson.
    #[arg(long)]
    pub dither: Option<String>,

    /// Rendu en niveaux de gris.
    #[arg(long, default_value_t = false)]
    pub mono: bool,

    /// Police TTF pour le raster et le charset dynamique.
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Mesurer la rampe sur la police au lieu de la rampe embarquée.
    #[arg(long, default_value_t = false)]
    pub dynamic_set: bool,

    /// Ignorer le cache de charset et re-mesurer la police.
    #[arg(long, default_value_t = false)]
    pub refresh_charset: bool,

    /// Assembler les frames d'un GIF animé en un GIF de sortie unique.
    #[arg(long, default_value_t = false)]
    pub assemble: bool,

    /// Cadence fixe du GIF assemblé (défaut : durées de la source).
    #[arg(long)]
    pub gif_fps: Option<f32>,

    /// Boucles du GIF assemblé. 0 = infini.
    #[arg(long, default_value_t = 0)]
    pub gif_loop: u32,

    /// Largeur d'une cellule caractère en pixels.
    #[arg(long)]
    pub cell_width: Option<u32>,

    /// Hauteur d'une cellule caractère en pixels.
    #[arg(long)]
    pub cell_height: Option<u32>,

    /// Destination vidéo : frames, gif, mp4.
    #[arg(long, default_value = "frames")]
    pub video_out: String,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Validate that exactly one source is provided.
    ///
    /// # Errors
    /// Returns an error if zero or more than one source is specified.
    pub fn validate_source(&self) -> anyhow::Result<()> {
        let count = usize::from(self.input.is_some())
            + usize::from(self.batch.is_some())
            + usize::from(self.video.is_some())
            + usize::from(self.webcam);

        if count == 0 {
            anyhow::bail!(
                "Aucune source spécifiée. Utilisez --input, --batch, --video, ou --webcam."
            );
        }
        if count > 1 {
            anyhow::bail!(
                "Une seule source à la fois. Spécifiez --input, --batch, --video, OU --webcam."
            );
        }
        Ok(())
    }

    /// Applique les overrides CLI sur des options déjà chargées, puis valide.
    ///
    /// # Errors
    /// `InvalidParameter` pour un nom de mode inconnu ou une borne violée —
    /// l'échec précède tout traitement de pixel.
    pub fn apply(&self, opts: &mut ConvertOptions) -> Result<(), PicaError> {
        if let Some(v) = self.scale {
            opts.scale = v;
        }
        if let Some(v) = self.brightness {
            opts.bg_brightness = v;
        }
        if let Some(ref v) = self.output_dir {
            opts.output_dir.clone_from(v);
        }
        if let Some(ref v) = self.format {
            opts.format = v.parse()?;
        }
        if let Some(ref v) = self.grayscale {
            opts.grayscale = v.parse()?;
        }
        if let Some(ref v) = self.dither {
            opts.dither = v.parse()?;
        }
        if self.mono {
            opts.mono = true;
        }
        if let Some(ref v) = self.font {
            opts.font_path = Some(v.clone());
        }
        if self.assemble {
            opts.assemble = true;
        }
        if let Some(v) = self.gif_fps {
            opts.gif_fps = Some(v);
        }
        opts.gif_loop = self.gif_loop;
        if let Some(v) = self.cell_width {
            opts.cell_width = v;
        }
        if let Some(v) = self.cell_height {
            opts.cell_height = v;
        }
        opts.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_source_required() {
        let cli = Cli::parse_from(["picascii"]);
        assert!(cli.validate_source().is_err());

        let cli = Cli::parse_from(["picascii", "--input", "a.png"]);
        assert!(cli.validate_source().is_ok());

        let cli = Cli::parse_from(["picascii", "--input", "a.png", "--webcam"]);
        assert!(cli.validate_source().is_err());
    }

    #[test]
    fn overrides_are_validated_before_any_work() {
        let cli = Cli::parse_from(["picascii", "--input", "a.png", "--scale", "1.5"]);
        let mut opts = ConvertOptions::default();
        assert!(matches!(
            cli.apply(&mut opts),
            Err(PicaError::InvalidParameter(_))
        ));

        let cli = Cli::parse_from(["picascii", "--input", "a.png", "--dither", "bayer"]);
        let mut opts = ConvertOptions::default();
        assert!(cli.apply(&mut opts).is_err());
    }

    #[test]
    fn overrides_land_in_options() {
        let cli = Cli::parse_from([
            "picascii",
            "--input",
            "a.png",
            "--scale",
            "0.5",
            "--format",
            "html",
            "--dither",
            "atkinson",
            "--mono",
        ]);
        let mut opts = ConvertOptions::default();
        cli.apply(&mut opts).unwrap();
        assert!((opts.scale - 0.5).abs() < f32::EPSILON);
        assert_eq!(opts.format, pa_core::config::OutputFormat::Html);
        assert_eq!(opts.dither, pa_core::config::DitherMode::Atkinson);
        assert!(opts.mono);
    }

    #[test]
    fn video_out_parses_known_names() {
        assert_eq!("frames".parse::<VideoOut>().unwrap(), VideoOut::Frames);
        assert_eq!("mp4".parse::<VideoOut>().unwrap(), VideoOut::Mp4);
        assert!("avi".parse::<VideoOut>().is_err());
    }
}

use thiserror::Error;

/// Taxonomie d'erreurs de la conversion.
///
/// Politique de propagation : la validation des paramètres échoue une seule
/// fois, à l'entrée de la conversion (`InvalidParameter`). Les erreurs I/O
/// par frame (`InputNotFound`, `Decode`) sont isolées à cette frame et
/// n'interrompent jamais un lot. `FontLoad` est non-fatal partout où une
/// police de repli existe. `Encode` n'annule que l'étape d'assemblage.
#[derive(Error, Debug)]
pub enum PicaError {
    /// Source image/fichier manquante.
    #[error("fichier introuvable : {path}")]
    InputNotFound {
        /// Path that was not found.
        path: String,
    },

    /// Image corrompue ou format non supporté.
    #[error("image illisible : {0}")]
    Decode(String),

    /// Police demandée invalide ou absente.
    #[error("police illisible : {0}")]
    FontLoad(String),

    /// Paramètre hors plage ou nom de mode inconnu. Jamais clampé en silence.
    #[error("paramètre invalide : {0}")]
    InvalidParameter(String),

    /// Échec d'écriture d'un artefact assemblé (GIF animé, MP4).
    #[error("échec d'encodage : {0}")]
    Encode(String),
}

use crate::frame::Frame;

/// Fournit des frames au pipeline de conversion.
///
/// Implémenté par : `StillSource`, `AnimatedSource` (pa-source::image) et
/// `VideoSource` (pa-source::video, fichier ou webcam via ffmpeg).
///
/// # Example
/// ```
/// use pa_core::traits::FrameSource;
/// use pa_core::frame::Frame;
///
/// struct DummySource;
/// impl FrameSource for DummySource {
///     fn next_frame(&mut self) -> Option<Frame> { None }
///     fn native_size(&self) -> (u32, u32) { (0, 0) }
///     fn is_live(&self) -> bool { false }
/// }
/// ```
pub trait FrameSource {
    /// Retourne la prochaine frame, ou `None` si la source est épuisée.
    ///
    /// La fin de séquence est une terminaison normale, pas une erreur.
    fn next_frame(&mut self) -> Option<Frame>;

    /// Dimensions natives de la source (avant resize).
    fn native_size(&self) -> (u32, u32);

    /// Indique si la source est continue (webcam) ou finie (fichier).
    fn is_live(&self) -> bool;
}

/// Réception de la progression ligne-par-ligne d'un rendu de frame.
///
/// Appelé au moins à (0, total) et (total, total) pour chaque frame.
pub trait ProgressSink {
    /// `done` lignes traitées sur `total`.
    fn on_progress(&mut self, done: u32, total: u32);
}

/// Sink nul : aucune sortie de progression.
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&mut self, _done: u32, _total: u32) {}
}

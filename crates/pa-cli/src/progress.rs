//! Progression du rendu sur stderr — stdout reste réservé aux sorties ANSI.

use std::io::Write;

use pa_core::traits::ProgressSink;

/// Affiche un pourcentage de scanlines traitées, réécrit sur place.
///
/// N'écrit que quand le pourcentage entier change, pour ne pas saturer
/// un terminal lent sur les grandes grilles.
pub struct StderrProgress {
    label: String,
    last_pct: Option<u32>,
}

impl StderrProgress {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            last_pct: None,
        }
    }
}

impl ProgressSink for StderrProgress {
    fn on_progress(&mut self, done: u32, total: u32) {
        if total == 0 {
            return;
        }
        let pct = done * 100 / total;
        if self.last_pct == Some(pct) {
            return;
        }
        self.last_pct = Some(pct);
        let mut err = std::io::stderr();
        if done >= total {
            let _ = writeln!(err, "\r{} : 100%", self.label);
        } else {
            let _ = write!(err, "\r{} : {pct:>3}%", self.label);
        }
        let _ = err.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_total_does_not_divide() {
        let mut p = StderrProgress::new("test");
        p.on_progress(0, 0);
        assert_eq!(p.last_pct, None);
    }

    #[test]
    fn repeated_percent_is_deduplicated() {
        let mut p = StderrProgress::new("test");
        p.on_progress(10, 1000);
        let first = p.last_pct;
        p.on_progress(11, 1000);
        assert_eq!(p.last_pct, first);
        p.on_progress(500, 1000);
        assert_eq!(p.last_pct, Some(50));
    }
}

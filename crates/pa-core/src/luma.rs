use std::str::FromStr;

use crate::error::PicaError;

/// Réduction RGB → luminosité scalaire [0..255].
///
/// Trois formules, toutes en arithmétique entière — aucun flottant dans le
/// hot path, et des sorties identiques bit-à-bit d'une machine à l'autre.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GrayscaleMode {
    /// Moyenne des canaux : `(r + g + b) / 3`.
    #[default]
    Avg,
    /// Luma BT.601, poids entiers 77/150/29 (somme 256).
    Luma601,
    /// Luma BT.709, poids entiers 54/183/19 (somme 256).
    Luma709,
}

impl FromStr for GrayscaleMode {
    type Err = PicaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avg" => Ok(Self::Avg),
            "luma601" => Ok(Self::Luma601),
            "luma709" => Ok(Self::Luma709),
            other => Err(PicaError::InvalidParameter(format!(
                "grayscale mode inconnu '{other}' (attendu : avg, luma601, luma709)"
            ))),
        }
    }
}

/// Luminosité d'un pixel selon le mode choisi.
///
/// # Example
/// ```
/// use pa_core::luma::{brightness, GrayscaleMode};
/// assert_eq!(brightness(255, 0, 0, GrayscaleMode::Avg), 85);
/// assert_eq!(brightness(255, 0, 0, GrayscaleMode::Luma601), 76);
/// assert_eq!(brightness(255, 0, 0, GrayscaleMode::Luma709), 53);
/// ```
#[inline(always)]
#[must_use]
pub fn brightness(r: u8, g: u8, b: u8, mode: GrayscaleMode) -> u8 {
    let (r, g, b) = (u32::from(r), u32::from(g), u32::from(b));
    let v = match mode {
        GrayscaleMode::Avg => (r + g + b) / 3,
        GrayscaleMode::Luma601 => (77 * r + 150 * g + 29 * b) >> 8,
        GrayscaleMode::Luma709 => (54 * r + 183 * g + 19 * b) >> 8,
    };
    v as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_values_pure_red() {
        assert_eq!(brightness(255, 0, 0, GrayscaleMode::Avg), 85);
        assert_eq!(brightness(255, 0, 0, GrayscaleMode::Luma601), 76);
        assert_eq!(brightness(255, 0, 0, GrayscaleMode::Luma709), 53);
    }

    #[test]
    fn white_maps_to_full_scale() {
        // Les poids somment à 256, donc 255 blanc donne 255 en luma, 255 en avg.
        assert_eq!(brightness(255, 255, 255, GrayscaleMode::Avg), 255);
        assert_eq!(brightness(255, 255, 255, GrayscaleMode::Luma601), 255);
        assert_eq!(brightness(255, 255, 255, GrayscaleMode::Luma709), 255);
        assert_eq!(brightness(0, 0, 0, GrayscaleMode::Luma601), 0);
    }

    #[test]
    fn unknown_mode_name_rejected() {
        let err = "luma2020".parse::<GrayscaleMode>();
        assert!(matches!(err, Err(PicaError::InvalidParameter(_))));
    }
}

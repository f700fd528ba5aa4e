//! Global layout metrics and horizontal advances.

use skrifa::raw::{types::GlyphId, FontRef, TableProvider};

use crate::{to_twips, ConvertError, GlyphError};

/// Font wide metrics, in twips unless noted otherwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMetrics {
    pub units_per_em: u16,
    /// Twips per font unit.
    pub scale: f64,
    /// Distance from the baseline to the top of the layout cell.
    pub ascent: i32,
    /// Distance from the baseline to the bottom of the layout cell,
    /// negative below the baseline.
    pub descent: i32,
    pub leading: i32,
}

impl FontMetrics {
    /// Read metrics from `head` and `OS/2`.
    ///
    /// Fonts without `OS/2` get an ascent of 0.8 em, a descent of -0.2 em and
    /// no leading. Fails if `em_square` is not positive and finite, or if the
    /// scaled metrics do not fit an SWF coordinate.
    pub fn new(font: &FontRef, em_square: f64) -> Result<Self, ConvertError> {
        if !(em_square.is_finite() && em_square > 0.0) {
            return Err(ConvertError::InvalidEmSquare(em_square));
        }
        let head = font
            .head()
            .map_err(|e| ConvertError::UnsupportedFontFormat(format!("bad head table: {e}")))?;
        let units_per_em = head.units_per_em();
        if units_per_em == 0 {
            return Err(ConvertError::UnsupportedFontFormat("unitsPerEm is zero".into()));
        }
        let scale = em_square / units_per_em as f64;
        let (ascent, descent, leading) = match font.os2() {
            Ok(os2) => (
                os2.s_typo_ascender() as f64,
                os2.s_typo_descender() as f64,
                os2.s_typo_line_gap() as f64,
            ),
            Err(_) => {
                log::info!("no OS/2 table, using default vertical metrics");
                let upem = units_per_em as f64;
                (0.8 * upem, -0.2 * upem, 0.0)
            }
        };
        let scaled = |value: f64| {
            to_twips(value * scale).map_err(|_| ConvertError::InvalidEmSquare(em_square))
        };
        Ok(FontMetrics {
            units_per_em,
            scale,
            ascent: scaled(ascent)?,
            descent: scaled(descent)?,
            leading: scaled(leading)?,
        })
    }

    /// Scale a horizontal distance in font units to twips.
    pub fn scale_x(&self, units: u16) -> Result<i32, GlyphError> {
        to_twips(units as f64 * self.scale)
    }
}

/// Advance widths in font units from `hmtx`.
#[derive(Clone, Debug)]
pub struct Advances {
    advances: Vec<u16>,
    fallback: u16,
}

impl Advances {
    /// Read the advances of `font`.
    ///
    /// Glyphs past the last long metric share its advance. Without `hmtx`
    /// every glyph advances by one em.
    pub fn new(font: &FontRef, units_per_em: u16) -> Self {
        let advances = match font.hmtx() {
            Ok(hmtx) => hmtx
                .h_metrics()
                .iter()
                .map(|metric| metric.advance())
                .collect(),
            Err(e) => {
                log::info!("no usable hmtx table ({e}), advances fall back to unitsPerEm");
                Vec::new()
            }
        };
        Advances {
            advances,
            fallback: units_per_em,
        }
    }

    pub fn get(&self, gid: GlyphId) -> u16 {
        let index = gid.to_u32() as usize;
        match self.advances.get(index) {
            Some(advance) => *advance,
            None => self.advances.last().copied().unwrap_or(self.fallback),
        }
    }
}

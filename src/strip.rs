use crate::assoc::AssocTable;
use crate::error::{PlotError, Result};
use rayon::prelude::*;

/// Half-width of the horizontal jitter inside the chromosome category (x-units).
pub const JITTER: f64 = 0.1;

/// -log10(p) for finite p > 0.
pub fn neg_log10(p: f64) -> Option<f64> {
    if p.is_finite() && p > 0.0 {
        Some(-p.log10())
    } else {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StripPoint {
    /// -log10(p)
    pub y: f64,
    /// Horizontal offset from the category centre, in [-JITTER, JITTER]
    pub offset: f64,
}

/// All points of one chromosome, drawn at a single categorical x-position.
#[derive(Debug, Clone)]
pub struct StripPlot {
    pub label: String,
    pub points: Vec<StripPoint>,
}

impl StripPlot {
    /// Build the strip for `label` from every complete row of `table`.
    pub fn build(label: &str, table: &AssocTable) -> Result<Self> {
        let label = label.trim();
        if label.is_empty() {
            return Err(PlotError::argument("chromosome label must not be empty"));
        }

        // Report the earliest bad row regardless of how the pool schedules work.
        if let Some(bad) = table
            .records
            .par_iter()
            .find_first(|r| neg_log10(r.p).is_none())
        {
            return Err(PlotError::NumericDomain {
                line: bad.line,
                value: bad.p,
            });
        }

        let points: Vec<StripPoint> = table
            .records
            .par_iter()
            .enumerate()
            .map(|(i, r)| StripPoint {
                y: -r.p.log10(),
                offset: jitter(i as u64),
            })
            .collect();

        Ok(StripPlot {
            label: label.to_string(),
            points,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// (min, max) of the plotted -log10(p) values.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        self.points.iter().fold(None, |acc, p| match acc {
            None => Some((p.y, p.y)),
            Some((lo, hi)) => Some((lo.min(p.y), hi.max(p.y))),
        })
    }
}

/// Deterministic offset in [-JITTER, JITTER] for the i-th point (splitmix64).
fn jitter(i: u64) -> f64 {
    let mut z = i.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    // top 53 bits -> [0, 1)
    let unit = (z >> 11) as f64 / (1u64 << 53) as f64;
    (unit * 2.0 - 1.0) * JITTER
}

//! Mean curvature against normalised position along curved stretches.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::CurveSample;

/// Mean `|κ|` per position bin.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeanKappaProfile {
    /// Bin centres in `[0, 1]`.
    pub centers: Vec<f64>,
    /// Mean `|κ|` per bin (1/m), zero for empty bins.
    pub mean_kappa: Vec<f64>,
}

/// Mean `|κ|` of flagged samples binned by their position within their line.
///
/// The flagged samples of each line are numbered `0..n` in input order and
/// placed at `k / max(n - 1, 1)`. Bins are `[0, 1/bins]` then left-open
/// `(i/bins, (i+1)/bins]`. `groups` is the per-sample group of a
/// [`CurveExtraction`](super::CurveExtraction); `None` means not flagged.
pub fn mean_kappa_profile(
    samples: &[CurveSample],
    groups: &[Option<usize>],
    bins: usize,
) -> MeanKappaProfile {
    let centers: Vec<f64> = (0..bins)
        .map(|i| (i as f64 + 0.5) / bins as f64)
        .collect();
    if bins == 0 {
        return MeanKappaProfile {
            centers,
            mean_kappa: Vec::new(),
        };
    }

    // Position of each flagged sample within its line
    let mut counters: HashMap<&str, usize> = HashMap::new();
    let positions: Vec<Option<usize>> = samples
        .iter()
        .zip(groups)
        .map(|(s, g)| {
            g.map(|_| {
                let c = counters.entry(s.line_id.as_str()).or_insert(0);
                *c += 1;
                *c - 1
            })
        })
        .collect();

    let mut sums = vec![0.0; bins];
    let mut counts = vec![0usize; bins];
    for (s, pos) in samples.iter().zip(&positions) {
        let Some(pos) = pos else {
            continue;
        };
        let Some(kappa) = s.abs_curvature() else {
            continue;
        };
        let last = counters.get(s.line_id.as_str()).copied().unwrap_or(1);
        let norm = *pos as f64 / (last.saturating_sub(1).max(1)) as f64;
        let bin = position_bin(norm, bins);
        sums[bin] += kappa;
        counts[bin] += 1;
    }

    let mean_kappa = sums
        .iter()
        .zip(&counts)
        .map(|(&sum, &n)| if n > 0 { sum / n as f64 } else { 0.0 })
        .collect();

    MeanKappaProfile {
        centers,
        mean_kappa,
    }
}

fn position_bin(norm: f64, bins: usize) -> usize {
    let norm = norm.clamp(0.0, 1.0);
    if norm <= 0.0 {
        return 0;
    }
    ((norm * bins as f64).ceil() as usize)
        .saturating_sub(1)
        .min(bins - 1)
}

//! Weight Deriver — sub-score weights from correlation with commission
//!
//! Each weight is |pearson(sub_score, total_commission)| divided by the sum of
//! the three absolute correlations, so the weights are recomputed from the
//! current population on every run.

use tracing::{info, warn};

use crate::types::{ClientScore, RfmWeights};

/// Pearson correlation. `None` when either side has zero variance or fewer
/// than two points.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }

    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }

    let r = cov / (var_x.sqrt() * var_y.sqrt());
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Derive weights for recency, frequency and monetary sub-scores.
/// Falls back to equal weights when no sub-score correlates with commission.
pub fn derive_weights(scores: &[ClientScore]) -> RfmWeights {
    let commission: Vec<f64> = scores.iter().map(|s| s.total_commission).collect();
    let column = |f: fn(&ClientScore) -> f64| scores.iter().map(f).collect::<Vec<f64>>();

    let strength = |xs: Vec<f64>| pearson(&xs, &commission).map(f64::abs).unwrap_or(0.0);
    let r = strength(column(|s| s.recency_score));
    let f = strength(column(|s| s.frequency_score));
    let m = strength(column(|s| s.monetary_score));

    let total = r + f + m;
    if total <= 0.0 {
        warn!(
            clients = scores.len(),
            "No sub-score correlates with commission, using equal weights"
        );
        return RfmWeights::equal();
    }

    let weights = RfmWeights {
        recency: r / total,
        frequency: f / total,
        monetary: m / total,
        fallback: false,
    };

    info!(
        recency = weights.recency,
        frequency = weights.frequency,
        monetary = weights.monetary,
        "Derived RFM weights from commission correlation"
    );

    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(r: f64, f: f64, m: f64, commission: f64) -> ClientScore {
        ClientScore {
            client_id: String::new(),
            recency_days: 0.0,
            monetary_value: 0.0,
            total_commission: commission,
            recency_score: r,
            frequency_score: f,
            monetary_score: m,
            rfm_score: 0.0,
        }
    }

    #[test]
    fn test_pearson_basic() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert!((pearson(&xs, &[2.0, 4.0, 6.0, 8.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&xs, &[8.0, 6.0, 4.0, 2.0]).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&xs, &[1.0, 1.0, 1.0, 1.0]), None);
        assert_eq!(pearson(&[1.0], &[2.0]), None);
    }

    #[test]
    fn test_weights_follow_correlation_strength() {
        // monetary tracks commission exactly, frequency partially, recency not at all
        let scores = vec![
            score(0.5, 0.0, 0.0, 10.0),
            score(0.1, 1.0, 1.0 / 3.0, 20.0),
            score(0.1, 0.0, 2.0 / 3.0, 30.0),
            score(0.5, 1.0, 1.0, 40.0),
        ];
        let w = derive_weights(&scores);

        assert!(!w.fallback);
        assert!(w.recency.abs() < 1e-12);
        assert!(w.monetary > w.frequency);
        assert!(w.frequency > 0.0);
        assert!((w.sum() - 1.0).abs() < 1e-12);
        // |r_f| = 1/sqrt(5), |r_m| = 1
        let rf = 1.0 / 5.0f64.sqrt();
        assert!((w.monetary - 1.0 / (1.0 + rf)).abs() < 1e-9);
    }

    #[test]
    fn test_negative_correlation_counts_by_magnitude() {
        let scores = vec![
            score(1.0, 0.2, 0.5, 1.0),
            score(0.5, 0.2, 0.5, 2.0),
            score(0.0, 0.2, 0.5, 3.0),
        ];
        let w = derive_weights(&scores);
        assert!((w.recency - 1.0).abs() < 1e-12);
        assert_eq!(w.frequency, 0.0);
        assert_eq!(w.monetary, 0.0);
    }

    #[test]
    fn test_constant_commission_falls_back_to_equal_weights() {
        let scores = vec![score(0.9, 0.1, 0.3, 5.0), score(0.2, 0.8, 0.6, 5.0)];
        let w = derive_weights(&scores);
        assert!(w.fallback);
        assert_eq!(w, RfmWeights::equal());
        assert!((w.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_client_falls_back() {
        let w = derive_weights(&[score(1.0, 1.0, 1.0, 100.0)]);
        assert!(w.fallback);
        assert!(w.recency >= 0.0 && w.frequency >= 0.0 && w.monetary >= 0.0);
    }
}

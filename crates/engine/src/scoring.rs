//! Score Transformer and Composite Scorer
//!
//! Turns raw client features into three comparable sub-scores in [0, 1]:
//! - recency:   exp(-recency_days / half_life_days)
//! - frequency: log1p(total_frequency), min-max normalized
//! - monetary:  log1p(sum_ins × (1 + 0.05 × total_trades) + total_commission), min-max normalized
//!
//! Imputation happens before any transform: missing amounts and counts become 0,
//! a client with no activity gets the largest recency observed in the population.

use chrono::NaiveDate;
use tracing::debug;

use crate::types::{ClientFeatureRow, ClientScore, RfmWeights, SegmentationConfig};

/// Days between the last activity and `as_of`, never negative
pub fn recency_days(last_activity: NaiveDate, as_of: NaiveDate) -> f64 {
    (as_of - last_activity).num_days().max(0) as f64
}

/// Exponential decay of recency; 1.0 for activity today.
/// Floored at the smallest positive f64 so very old activity never scores 0.
pub fn recency_score(recency_days: f64, half_life_days: f64) -> f64 {
    (-recency_days / half_life_days).exp().max(f64::MIN_POSITIVE)
}

/// Monetary value before log transform, clipped at zero
pub fn monetary_value(sum_ins: f64, total_trades: f64, total_commission: f64, trade_multiplier: f64) -> f64 {
    let value = sum_ins * (1.0 + trade_multiplier * total_trades) + total_commission;
    if value.is_nan() {
        value
    } else {
        value.max(0.0)
    }
}

/// Linear rescale to [0, 1]. A zero-range column maps every value to 0.0.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if !(range.is_finite() && range > 0.0) {
        return vec![0.0; values.len()];
    }

    values.iter().map(|v| (v - min) / range).collect()
}

struct RawScore<'a> {
    client_id: &'a str,
    recency_days: f64,
    recency_score: f64,
    log_frequency: f64,
    log_monetary: f64,
    monetary_value: f64,
    total_commission: f64,
}

/// Score every client. Rows whose score cannot be defined are dropped:
/// clients without activity when nobody in the population has any, and rows
/// carrying non-finite amounts.
pub fn transform(
    rows: &[ClientFeatureRow],
    as_of: NaiveDate,
    config: &SegmentationConfig,
) -> Vec<ClientScore> {
    let observed: Vec<Option<f64>> = rows
        .iter()
        .map(|r| r.last_activity_date.map(|d| recency_days(d, as_of)))
        .collect();
    let max_recency = observed.iter().flatten().copied().reduce(f64::max);

    let mut raw = Vec::with_capacity(rows.len());
    for (row, recency) in rows.iter().zip(observed) {
        let Some(recency_days) = recency.or(max_recency) else {
            continue;
        };

        let total_trades = row.total_trades.unwrap_or(0) as f64;
        let sum_ins = row.sum_ins.unwrap_or(0.0);
        let total_commission = row.total_commission.unwrap_or(0.0);
        let frequency = row.total_frequency.max(0) as f64;

        let monetary = monetary_value(sum_ins, total_trades, total_commission, config.trade_multiplier);
        let score = RawScore {
            client_id: &row.client_id,
            recency_days,
            recency_score: recency_score(recency_days, config.half_life_days),
            log_frequency: frequency.ln_1p(),
            log_monetary: monetary.ln_1p(),
            monetary_value: monetary,
            total_commission,
        };

        let defined = [
            score.recency_score,
            score.log_frequency,
            score.log_monetary,
            score.total_commission,
        ]
        .iter()
        .all(|v| v.is_finite());
        if defined {
            raw.push(score);
        }
    }

    let dropped = rows.len() - raw.len();
    if dropped > 0 {
        debug!(dropped, "Dropped clients with undefined scores");
    }

    let frequency_scores =
        min_max_normalize(&raw.iter().map(|r| r.log_frequency).collect::<Vec<_>>());
    let monetary_scores =
        min_max_normalize(&raw.iter().map(|r| r.log_monetary).collect::<Vec<_>>());

    raw.into_iter()
        .zip(frequency_scores)
        .zip(monetary_scores)
        .map(|((r, frequency_score), monetary_score)| ClientScore {
            client_id: r.client_id.to_string(),
            recency_days: r.recency_days,
            monetary_value: r.monetary_value,
            total_commission: r.total_commission,
            recency_score: r.recency_score,
            frequency_score,
            monetary_score,
            rfm_score: 0.0,
        })
        .collect()
}

/// Composite score: weighted sum of the three sub-scores.
/// Clamped so rounding in the weights never pushes it past 1.
pub fn apply_weights(scores: &mut [ClientScore], weights: &RfmWeights) {
    for s in scores.iter_mut() {
        let weighted = s.recency_score * weights.recency
            + s.frequency_score * weights.frequency
            + s.monetary_score * weights.monetary;
        s.rfm_score = weighted.clamp(0.0, 1.0);
    }
}

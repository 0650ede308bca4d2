//! Clustering Engine — seeded k-means over the three RFM sub-scores
//!
//! k-means++ initialization, `n_init` restarts from one seeded RNG, Lloyd
//! iterations until the squared centroid shift drops under `tolerance`.
//! The lowest-inertia restart wins. Labels carry no ranking.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::error::{SegmentationError, SegmentationResult};
use crate::types::SegmentationConfig;

pub type Point = [f64; 3];

/// Result of a k-means fit
#[derive(Debug, Clone, Serialize)]
pub struct Clustering {
    pub labels: Vec<usize>,
    pub centroids: Vec<Point>,
    pub inertia: f64,
    pub iterations: usize,
}

fn sq_dist(a: &Point, b: &Point) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index of the closest centroid; ties go to the lowest index
fn nearest(point: &Point, centroids: &[Point]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = sq_dist(point, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

/// Partition `points` into `config.n_clusters` groups.
/// Fails when there are fewer points than clusters.
pub fn kmeans(points: &[Point], config: &SegmentationConfig) -> SegmentationResult<Clustering> {
    let k = config.n_clusters;
    if k == 0 || points.len() < k {
        return Err(SegmentationError::InsufficientData {
            clients: points.len(),
            clusters: k,
        });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut best = lloyd(points, init_plus_plus(points, k, &mut rng), config);

    for run in 1..config.n_init {
        let candidate = lloyd(points, init_plus_plus(points, k, &mut rng), config);
        debug!(run, inertia = candidate.inertia, "k-means restart");
        if candidate.inertia < best.inertia {
            best = candidate;
        }
    }

    debug!(
        k,
        points = points.len(),
        inertia = best.inertia,
        iterations = best.iterations,
        "k-means fitted"
    );

    Ok(best)
}

/// k-means++ seeding: each next centroid is drawn with probability
/// proportional to its squared distance from the closest chosen centroid.
fn init_plus_plus(points: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..points.len())]);

    let mut dist: Vec<f64> = points.iter().map(|p| sq_dist(p, &centroids[0])).collect();

    while centroids.len() < k {
        let total: f64 = dist.iter().sum();
        let chosen = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = None;
            let mut last_positive = 0;
            for (i, d) in dist.iter().enumerate() {
                if *d <= 0.0 {
                    continue;
                }
                last_positive = i;
                if target < *d {
                    chosen = Some(i);
                    break;
                }
                target -= d;
            }
            chosen.unwrap_or(last_positive)
        } else {
            // every point sits on a centroid already
            rng.gen_range(0..points.len())
        };

        let centroid = points[chosen];
        for (d, p) in dist.iter_mut().zip(points) {
            *d = d.min(sq_dist(p, &centroid));
        }
        centroids.push(centroid);
    }

    centroids
}

fn lloyd(points: &[Point], mut centroids: Vec<Point>, config: &SegmentationConfig) -> Clustering {
    let k = centroids.len();
    let mut labels = vec![0usize; points.len()];
    let mut iterations = 0;

    for _ in 0..config.max_iterations.max(1) {
        iterations += 1;
        for (label, p) in labels.iter_mut().zip(points) {
            *label = nearest(p, &centroids).0;
        }

        let mut sums = vec![[0.0; 3]; k];
        let mut counts = vec![0usize; k];
        for (label, p) in labels.iter().zip(points) {
            counts[*label] += 1;
            for (s, v) in sums[*label].iter_mut().zip(p) {
                *s += v;
            }
        }

        let mut shift = 0.0;
        for ((centroid, sum), count) in centroids.iter_mut().zip(&sums).zip(&counts) {
            // an empty cluster keeps its previous centroid
            if *count == 0 {
                continue;
            }
            let updated = sum.map(|s| s / *count as f64);
            shift += sq_dist(centroid, &updated);
            *centroid = updated;
        }

        if shift <= config.tolerance {
            break;
        }
    }

    let mut inertia = 0.0;
    for (label, p) in labels.iter_mut().zip(points) {
        let (idx, d) = nearest(p, &centroids);
        *label = idx;
        inertia += d;
    }

    Clustering {
        labels,
        centroids,
        inertia,
        iterations,
    }
}

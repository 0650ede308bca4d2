//! Summary Builder — per-cluster population and commission

use crate::types::{ClientScore, ClusterSummary};

/// One row per label `0..n_clusters`, ascending. Labels nobody was assigned to
/// are reported with zero members and zero commission.
pub fn summarize_clusters(
    scores: &[ClientScore],
    labels: &[usize],
    n_clusters: usize,
) -> Vec<ClusterSummary> {
    let mut summary: Vec<ClusterSummary> = (0..n_clusters)
        .map(|cluster_number| ClusterSummary {
            cluster_number,
            cluster_count: 0,
            total_commission: 0.0,
        })
        .collect();

    for (score, label) in scores.iter().zip(labels) {
        if let Some(row) = summary.get_mut(*label) {
            row.cluster_count += 1;
            row.total_commission += score.total_commission;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(commission: f64) -> ClientScore {
        ClientScore {
            client_id: String::new(),
            recency_days: 0.0,
            monetary_value: 0.0,
            total_commission: commission,
            recency_score: 1.0,
            frequency_score: 0.0,
            monetary_score: 0.0,
            rfm_score: 0.0,
        }
    }

    #[test]
    fn test_summary_counts_and_sums() {
        let scores = vec![client(10.0), client(5.0), client(2.5), client(1.0)];
        let labels = vec![2, 0, 2, 0];
        let summary = summarize_clusters(&scores, &labels, 3);

        assert_eq!(summary.len(), 3);
        assert_eq!(summary[0], ClusterSummary { cluster_number: 0, cluster_count: 2, total_commission: 6.0 });
        assert_eq!(summary[1], ClusterSummary { cluster_number: 1, cluster_count: 0, total_commission: 0.0 });
        assert_eq!(summary[2], ClusterSummary { cluster_number: 2, cluster_count: 2, total_commission: 12.5 });

        let total: usize = summary.iter().map(|s| s.cluster_count).sum();
        assert_eq!(total, scores.len());
    }

    #[test]
    fn test_summary_ordered_by_label() {
        let scores = vec![client(1.0); 5];
        let summary = summarize_clusters(&scores, &[4, 3, 2, 1, 0], 5);
        let numbers: Vec<usize> = summary.iter().map(|s| s.cluster_number).collect();
        assert_eq!(numbers, vec![0, 1, 2, 3, 4]);
        assert!(summary.iter().all(|s| s.cluster_count == 1));
    }
}

//! Support level estimation from repeated pivot lows.

use crate::types::{PivotPoint, SupportCluster};

/// Absorbs float noise in relative distance checks so a gap of exactly the
/// tolerance still counts as inside it.
const TOLERANCE_EPSILON: f64 = 1e-9;

/// Clusters and how many of them sit at the current close.
#[derive(Debug, Clone, PartialEq)]
pub struct SupportAnalysis {
    pub clusters: Vec<SupportCluster>,
    /// Clusters with at least the minimum number of members near close.
    pub near_close: usize,
}

/// Relative distance `|a - reference| / reference`.
fn relative_gap(a: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return if a == 0.0 { 0.0 } else { f64::INFINITY };
    }
    (a - reference).abs() / reference.abs()
}

fn within(a: f64, reference: f64, tolerance: f64) -> bool {
    relative_gap(a, reference) <= tolerance + TOLERANCE_EPSILON
}

/// Greedy single pass over ascending prices.
///
/// A new cluster starts whenever a price is more than `tolerance` above the
/// current cluster's first member. The first member stays the reference for
/// the whole cluster so a slow staircase of prices cannot drift into one
/// giant cluster.
pub fn cluster_prices(prices: &[f64], tolerance: f64) -> Vec<SupportCluster> {
    let mut sorted: Vec<f64> = prices.iter().copied().filter(|p| p.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut clusters: Vec<SupportCluster> = Vec::new();
    for price in sorted {
        match clusters.last_mut() {
            Some(cluster) if within(price, cluster.reference, tolerance) => {
                cluster.members.push(price);
            }
            _ => clusters.push(SupportCluster {
                reference: price,
                members: vec![price],
            }),
        }
    }
    clusters
}

/// Members of `cluster` within `tolerance` of `close`.
fn members_near(cluster: &SupportCluster, close: f64, tolerance: f64) -> usize {
    cluster
        .members
        .iter()
        .filter(|&&price| within(price, close, tolerance))
        .count()
}

/// Cluster the most recent `max_pivots` pivot lows (all when `None`) and count
/// the clusters holding at least `min_members` pivot lows that each lie within
/// `tolerance` of `close`.
pub fn detect_support(
    pivot_lows: &[PivotPoint],
    close: f64,
    tolerance: f64,
    min_members: usize,
    max_pivots: Option<usize>,
) -> SupportAnalysis {
    let recent = match max_pivots {
        Some(n) if n < pivot_lows.len() => &pivot_lows[pivot_lows.len() - n..],
        _ => pivot_lows,
    };
    let prices: Vec<f64> = recent.iter().map(|p| p.price).collect();
    let clusters = cluster_prices(&prices, tolerance);

    let near_close = clusters
        .iter()
        .filter(|c| members_near(c, close, tolerance) >= min_members)
        .count();

    SupportAnalysis {
        clusters,
        near_close,
    }
}

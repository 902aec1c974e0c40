use std::cmp::Ordering;

/// Number of topic labels attached to a selected document
pub const TOP_K: usize = 3;

/// Column indices of the `k` heaviest weights, heaviest first
///
/// Equal weights rank by ascending column index, so the order is the same on
/// every call for the same row.
pub fn top_k_topics(weights: &[f64], k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..weights.len()).collect();
    indices.sort_by(|&a, &b| compare_weights(weights, a, b));
    indices.truncate(k);
    indices
}

fn compare_weights(weights: &[f64], a: usize, b: usize) -> Ordering {
    weights[b].total_cmp(&weights[a]).then(a.cmp(&b))
}

/// The [`TOP_K`] highest weighted topics of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRanking {
    indices: Vec<usize>,
}

impl TopicRanking {
    pub fn from_weights(weights: &[f64]) -> Self {
        Self {
            indices: top_k_topics(weights, TOP_K),
        }
    }

    /// Rank-1 topic, `None` only for a row without columns
    pub fn dominant(&self) -> Option<usize> {
        self.indices.first().copied()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

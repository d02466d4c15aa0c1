use std::collections::BTreeSet;

use super::model::{SurveyTable, pod_of};

// ---------------------------------------------------------------------------
// Pod filter: which pods are shown in the time-series views
// ---------------------------------------------------------------------------

/// Selected pods. An empty selection hides every point.
pub type PodFilter = BTreeSet<String>;

/// Initialise a [`PodFilter`] with every pod selected (i.e., show everything).
pub fn init_pod_filter(table: &SurveyTable) -> PodFilter {
    table.pods()
}

/// Return indices of monitoring points whose pod is selected.
pub fn visible_points(table: &SurveyTable, filter: &PodFilter) -> Vec<usize> {
    table
        .points
        .iter()
        .enumerate()
        .filter(|(_, p)| filter.contains(pod_of(p)))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SurveyTable {
        let points = ["A1-1", "A1-2", "A2-1", "B1-1"];
        SurveyTable::new(
            points.iter().map(|p| p.to_string()).collect(),
            vec![],
            vec![vec![]; points.len()],
        )
    }

    #[test]
    fn all_pods_selected_by_default() {
        let t = table();
        let filter = init_pod_filter(&t);
        assert_eq!(visible_points(&t, &filter), vec![0, 1, 2, 3]);
    }

    #[test]
    fn single_pod_and_empty_selection() {
        let t = table();
        let filter: PodFilter = ["A1".to_string()].into_iter().collect();
        assert_eq!(visible_points(&t, &filter), vec![0, 1]);
        assert!(visible_points(&t, &PodFilter::new()).is_empty());
    }
}

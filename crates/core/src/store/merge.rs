use std::cmp::Ordering;

use itertools::Itertools;

use crate::model::Place;

/// Flattens per-category results into one list: the first occurrence of each
/// place id wins, then nearest first. Places without a distance sort last.
pub fn merge_by_distance(batches: Vec<Vec<Place>>) -> Vec<Place> {
    let mut merged: Vec<Place> = batches
        .into_iter()
        .flatten()
        .unique_by(|place| place.id.clone())
        .collect();

    merged.sort_by(|a, b| match (a.distance_m, b.distance_m) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    merged
}

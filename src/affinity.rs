//! Ranking of followed artists by how often they show up in liked tracks.
//!
//! Artists are matched by display name, so two different artists sharing a
//! name count into the same bucket.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::clients::entities::{Artist, LikedTrack};

/// Number of liked tracks each artist name appears on.
pub fn affinity_counts(liked: &[LikedTrack]) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for artist in liked.iter().flat_map(LikedTrack::artists) {
        *counts.entry(artist.name.as_str()).or_default() += 1;
    }
    counts
}

/// Orders `followed` by descending affinity count. Artists with equal counts
/// keep their relative input order.
pub fn rank(mut followed: Vec<Artist>, liked: &[LikedTrack]) -> Vec<Artist> {
    let counts = affinity_counts(liked);
    followed.sort_by_key(|artist| {
        Reverse(counts.get(artist.name.as_str()).copied().unwrap_or(0))
    });
    followed
}

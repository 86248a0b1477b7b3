//! Occurrence-group size inference.
//!
//! A label's raw rows are a concatenation of occurrence groups, each group
//! being one full reading of all elements. The group size is not recorded
//! anywhere in the export; it is inferred from the per-element occurrence
//! counts: if every element appears `g` times, the run holds `g` groups of
//! `total / g` rows. The GCD handles labels whose elements repeat unevenly
//! within a group.

use std::collections::HashMap;

/// GCD of two counts.
fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Infer how many consecutive rows of one label form a single occurrence
/// group.
///
/// Deterministic and conservative: when the counts do not divide the total
/// evenly the whole run is treated as one group; a label with no elements
/// at all yields 1.
pub fn infer_group_size<'a, I>(elements: I) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut total = 0usize;
    for element in elements {
        *counts.entry(element).or_insert(0) += 1;
        total += 1;
    }
    if counts.is_empty() {
        return 1;
    }
    let g = counts.values().copied().fold(0, gcd);
    if g > 0 && total % g == 0 { total / g } else { total }
}

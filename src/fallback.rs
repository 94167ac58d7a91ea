//! Sample-data fallback policy.
//!
//! The free-tier upstream APIs are frequently rate-limited or sparse, and
//! an empty dashboard is a worse failure mode than a clearly labeled
//! partial result. When live results fall below a resource-specific
//! minimum, bundled samples top the list up, live entries first and in
//! their original order. The merge is a pure function of its inputs so it
//! can be exercised without any I/O.

use std::collections::HashSet;
use std::hash::Hash;

/// Outcome of a fallback merge. `used_samples` is set at most once per
/// merge and drives the single "using sample data" notice.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged<T> {
    pub items: Vec<T>,
    pub used_samples: bool,
}

/// Tops `live` up with entries from `samples` until at least `min` items,
/// skipping samples whose key duplicates a live entry. Live entries keep
/// their original order and always come first.
pub fn merge_with_samples<T, K, F>(
    live: Vec<T>,
    samples: Vec<T>,
    min: usize,
    key: F,
) -> Merged<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    if live.len() >= min {
        return Merged {
            items: live,
            used_samples: false,
        };
    }

    let seen: HashSet<K> = live.iter().map(&key).collect();
    let mut items = live;
    for sample in samples {
        if items.len() >= min {
            break;
        }
        if seen.contains(&key(&sample)) {
            continue;
        }
        items.push(sample);
    }

    Merged {
        items,
        used_samples: true,
    }
}

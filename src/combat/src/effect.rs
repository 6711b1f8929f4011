//! Item use effects and the target selection they rely on.

use serde::{Deserialize, Serialize};

/// Default duration of a confusion scroll.
pub const DEFAULT_CONFUSE_TURNS: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemEffect {
    Heal { amount: i32 },
    Lightning { damage: i32, max_range: i32 },
    Fireball { damage: i32, radius: i32 },
    Confuse { turns: u32 },
}

impl ItemEffect {
    /// Effects that need a map cell picked before they can be used.
    pub fn needs_target(&self) -> bool {
        matches!(self, ItemEffect::Fireball { .. } | ItemEffect::Confuse { .. })
    }

    pub fn targeting_prompt(&self) -> Option<&'static str> {
        match self {
            ItemEffect::Fireball { .. } => {
                Some("Left-click a target tile for the fireball, or right-click to cancel.")
            }
            ItemEffect::Confuse { .. } => {
                Some("Left-click an enemy to confuse it, or right-click to cancel.")
            }
            ItemEffect::Heal { .. } | ItemEffect::Lightning { .. } => None,
        }
    }
}

pub fn distance(from: (i32, i32), to: (i32, i32)) -> f64 {
    let dx = (to.0 - from.0) as f64;
    let dy = (to.1 - from.1) as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Closest candidate strictly nearer than `max_range + 1`. Ties keep the
/// first candidate seen.
pub fn nearest_within<Id>(
    origin: (i32, i32),
    candidates: impl IntoIterator<Item = (Id, (i32, i32))>,
    max_range: i32,
) -> Option<Id> {
    let mut best = None;
    let mut closest = f64::from(max_range + 1);
    for (id, pos) in candidates {
        let d = distance(origin, pos);
        if d < closest {
            closest = d;
            best = Some(id);
        }
    }
    best
}

/// Candidates whose distance to `center` is at most `radius`, in input order.
pub fn within_radius<Id>(
    center: (i32, i32),
    candidates: impl IntoIterator<Item = (Id, (i32, i32))>,
    radius: i32,
) -> Vec<Id> {
    candidates
        .into_iter()
        .filter(|&(_, pos)| distance(center, pos) <= f64::from(radius))
        .map(|(id, _)| id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_prefers_first_on_ties() {
        let picks = [("a", (3, 0)), ("b", (0, 3)), ("c", (1, 1))];
        assert_eq!(nearest_within((0, 0), picks, 5), Some("c"));
        let tied = [("a", (3, 0)), ("b", (0, 3))];
        assert_eq!(nearest_within((0, 0), tied, 5), Some("a"));
    }

    #[test]
    fn nearest_respects_range() {
        assert_eq!(nearest_within((0, 0), [(1, (5, 0))], 5), Some(1));
        assert_eq!(nearest_within((0, 0), [(1, (6, 0))], 5), None);
        assert_eq!(nearest_within::<u8>((0, 0), [], 5), None);
    }

    #[test]
    fn radius_is_inclusive() {
        let hits = within_radius((5, 5), [(1, (8, 5)), (2, (9, 5)), (3, (7, 7))], 3);
        assert_eq!(hits, vec![1, 3]);
    }

    #[test]
    fn only_area_effects_need_targets() {
        assert!(ItemEffect::Fireball { damage: 25, radius: 3 }.needs_target());
        assert!(ItemEffect::Confuse { turns: 10 }.needs_target());
        assert!(!ItemEffect::Lightning { damage: 40, max_range: 5 }.needs_target());
        assert_eq!(ItemEffect::Heal { amount: 40 }.targeting_prompt(), None);
    }
}

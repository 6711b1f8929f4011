use rand::Rng;
use serde::{Deserialize, Serialize};

/// Monster behaviour. Confusion wraps the behaviour it replaces and
/// restores it when the counter runs out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ai {
    Basic,
    Confused { previous: Box<Ai>, turns_left: u32 },
}

/// What a confused monster does this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfusedTurn {
    /// Offset to stumble toward, only when both axes are nonzero.
    pub stumble: Option<(i32, i32)>,
    /// The previous behaviour was restored this turn.
    pub recovered: bool,
}

impl Ai {
    pub fn confused(previous: Ai, turns: u32) -> Ai {
        Ai::Confused {
            previous: Box::new(previous),
            turns_left: turns,
        }
    }

    pub fn is_confused(&self) -> bool {
        matches!(self, Ai::Confused { .. })
    }

    /// Runs one confused turn. Returns `None` for non-confused behaviour.
    ///
    /// A random offset in `{-1, 0, 1}²` is drawn while turns remain; pure
    /// horizontal or vertical jitter is dropped. Once the counter is at zero
    /// the wrapped behaviour is put back.
    pub fn confused_turn(&mut self, rng: &mut impl Rng) -> Option<ConfusedTurn> {
        let Ai::Confused {
            previous,
            turns_left,
        } = self
        else {
            return None;
        };

        let mut stumble = None;
        if *turns_left > 0 {
            let dx = rng.random_range(0..=2) - 1;
            let dy = rng.random_range(0..=2) - 1;
            if dx != 0 && dy != 0 {
                stumble = Some((dx, dy));
            }
            *turns_left -= 1;
        }

        let recovered = *turns_left == 0;
        if recovered {
            let restored = std::mem::replace(&mut **previous, Ai::Basic);
            *self = restored;
        }
        Some(ConfusedTurn { stumble, recovered })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn single_turn_confusion_reverts_after_one_call() {
        let mut rng = Pcg64::seed_from_u64(1);
        let mut ai = Ai::confused(Ai::Basic, 1);
        let turn = ai.confused_turn(&mut rng).unwrap();
        assert!(turn.recovered);
        assert_eq!(ai, Ai::Basic);
    }

    #[test]
    fn zero_turn_confusion_reverts_without_moving() {
        let mut rng = Pcg64::seed_from_u64(2);
        let mut ai = Ai::confused(Ai::Basic, 0);
        let turn = ai.confused_turn(&mut rng).unwrap();
        assert_eq!(turn.stumble, None);
        assert!(turn.recovered);
        assert_eq!(ai, Ai::Basic);
    }

    #[test]
    fn stumbles_are_diagonal() {
        let mut rng = Pcg64::seed_from_u64(3);
        let mut ai = Ai::confused(Ai::Basic, 500);
        for _ in 0..499 {
            let turn = ai.confused_turn(&mut rng).unwrap();
            assert!(!turn.recovered);
            if let Some((dx, dy)) = turn.stumble {
                assert!(dx.abs() == 1 && dy.abs() == 1);
            }
        }
        assert!(ai.is_confused());
        assert!(ai.confused_turn(&mut rng).unwrap().recovered);
    }

    #[test]
    fn nested_confusion_restores_one_layer() {
        let mut rng = Pcg64::seed_from_u64(4);
        let inner = Ai::confused(Ai::Basic, 5);
        let mut ai = Ai::confused(inner.clone(), 0);
        ai.confused_turn(&mut rng);
        assert_eq!(ai, inner);
    }

    #[test]
    fn basic_has_no_confused_turn() {
        let mut rng = Pcg64::seed_from_u64(5);
        assert_eq!(Ai::Basic.confused_turn(&mut rng), None);
    }
}

//! Shaking: random `k`-flip perturbations of an open-set.

use super::config::ShakingMode;
use crate::evaluation::Evaluator;
use crate::models::{Instance, OpenSet};
use rand::seq::index;
use rand::Rng;

/// Weight floor so every facility stays selectable under biased modes.
const MIN_WEIGHT: f64 = 0.05;

/// Flips exactly `min(k, I)` distinct facilities of `parent`.
///
/// `Uniform` draws the facilities uniformly without replacement. The
/// biased modes draw without replacement proportionally to a per-facility
/// weight that depends on whether the facility is currently open.
pub fn shake<R: Rng>(
    parent: &OpenSet,
    k: usize,
    mode: ShakingMode,
    instance: &Instance,
    rng: &mut R,
) -> OpenSet {
    let n = parent.len();
    let amount = k.min(n);
    let mut child = parent.clone();
    if amount == 0 {
        return child;
    }

    let picks = match mode {
        ShakingMode::Uniform => index::sample(rng, n, amount),
        ShakingMode::CostBiased | ShakingMode::CapacityBiased => {
            let weights = flip_weights(parent, mode, instance);
            index::sample_weighted(rng, n, |i| weights[i], amount)
                .unwrap_or_else(|_| index::sample(rng, n, amount))
        }
    };
    for i in picks.iter() {
        child.flip(i);
    }
    child
}

/// Shakes until the result passes the capacity pre-check.
///
/// Returns `None` once `retries` draws have all failed.
pub fn shake_feasible<R: Rng>(
    parent: &OpenSet,
    k: usize,
    mode: ShakingMode,
    evaluator: &Evaluator<'_>,
    retries: usize,
    rng: &mut R,
) -> Option<OpenSet> {
    (0..retries)
        .map(|_| shake(parent, k, mode, evaluator.instance(), rng))
        .find(|candidate| evaluator.passes_precheck(candidate))
}

/// Opens `min(k, closed)` random closed facilities.
pub(crate) fn open_random<R: Rng>(parent: &OpenSet, k: usize, rng: &mut R) -> OpenSet {
    let closed: Vec<usize> = (0..parent.len()).filter(|&i| !parent.is_open(i)).collect();
    let mut child = parent.clone();
    for pos in index::sample(rng, closed.len(), k.min(closed.len())).iter() {
        child.flip(closed[pos]);
    }
    child
}

/// Cost bias closes open facilities in proportion to their opening cost and
/// opens closed ones in proportion to its inverse. Capacity bias opens closed
/// facilities in proportion to capacity and closes open ones in proportion to
/// its inverse. Values are normalized by their maximum first.
fn flip_weights(parent: &OpenSet, mode: ShakingMode, instance: &Instance) -> Vec<f64> {
    let values = match mode {
        ShakingMode::CostBiased => instance.opening_costs(),
        _ => instance.capacities(),
    };
    let max = values.iter().copied().fold(0.0, f64::max);
    (0..parent.len())
        .map(|i| {
            let share = if max > 0.0 { values[i] / max } else { 0.5 };
            let direct = share + MIN_WEIGHT;
            let inverse = 1.0 / direct;
            match (mode, parent.is_open(i)) {
                (ShakingMode::CostBiased, true) => direct,
                (ShakingMode::CostBiased, false) => inverse,
                (_, true) => inverse,
                (_, false) => direct,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportMode;
    use u_numflow::random::create_rng;

    fn instance() -> Instance {
        Instance::from_rows(
            vec![5.0, 5.0],
            vec![10.0, 10.0, 1.0, 20.0, 4.0],
            vec![100.0, 1.0, 50.0, 3.0, 8.0],
            vec![vec![1.0, 1.0]; 5],
        )
        .expect("valid")
    }

    fn flipped_count(a: &OpenSet, b: &OpenSet) -> usize {
        a.as_slice()
            .iter()
            .zip(b.as_slice())
            .filter(|(x, y)| x != y)
            .count()
    }

    #[test]
    fn test_flips_exactly_k() {
        let inst = instance();
        let mut rng = create_rng(42);
        let parent = OpenSet::from_vec(vec![true, false, true, false, true]);
        for mode in [
            ShakingMode::Uniform,
            ShakingMode::CostBiased,
            ShakingMode::CapacityBiased,
        ] {
            for k in 1..=5 {
                let child = shake(&parent, k, mode, &inst, &mut rng);
                assert_eq!(flipped_count(&parent, &child), k, "{mode:?} k={k}");
            }
        }
    }

    #[test]
    fn test_k_clamped_to_facility_count() {
        let inst = instance();
        let mut rng = create_rng(1);
        let parent = OpenSet::closed(5);
        let child = shake(&parent, 9, ShakingMode::Uniform, &inst, &mut rng);
        assert_eq!(child, OpenSet::all_open(5));
    }

    #[test]
    fn test_same_seed_same_shake() {
        let inst = instance();
        let parent = OpenSet::all_open(5);
        let a = shake(&parent, 2, ShakingMode::CostBiased, &inst, &mut create_rng(9));
        let b = shake(&parent, 2, ShakingMode::CostBiased, &inst, &mut create_rng(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_cost_bias_prefers_closing_expensive() {
        let inst = instance();
        let parent = OpenSet::all_open(5);
        let mut rng = create_rng(3);
        let mut closed_expensive = 0;
        let mut closed_cheap = 0;
        for _ in 0..500 {
            let child = shake(&parent, 1, ShakingMode::CostBiased, &inst, &mut rng);
            if !child.is_open(0) {
                closed_expensive += 1;
            }
            if !child.is_open(1) {
                closed_cheap += 1;
            }
        }
        assert!(
            closed_expensive > closed_cheap * 3,
            "expensive {closed_expensive} vs cheap {closed_cheap}"
        );
    }

    #[test]
    fn test_cost_bias_opens_by_inverse_cost() {
        // Opening costs 3 and 8 differ little in complement but by 1.6x inverted.
        let inst = instance();
        let parent = OpenSet::closed(5);
        let mut rng = create_rng(17);
        let mut opened_cheaper = 0;
        let mut opened_dearer = 0;
        for _ in 0..4000 {
            let child = shake(&parent, 1, ShakingMode::CostBiased, &inst, &mut rng);
            if child.is_open(3) {
                opened_cheaper += 1;
            }
            if child.is_open(4) {
                opened_dearer += 1;
            }
        }
        assert!(
            opened_cheaper * 10 > opened_dearer * 13,
            "cost 3 opened {opened_cheaper} vs cost 8 opened {opened_dearer}"
        );
    }

    #[test]
    fn test_capacity_bias_prefers_closing_small() {
        let inst = instance();
        let parent = OpenSet::all_open(5);
        let mut rng = create_rng(3);
        let mut closed_small = 0;
        let mut closed_large = 0;
        for _ in 0..500 {
            let child = shake(&parent, 1, ShakingMode::CapacityBiased, &inst, &mut rng);
            if !child.is_open(2) {
                closed_small += 1;
            }
            if !child.is_open(3) {
                closed_large += 1;
            }
        }
        assert!(
            closed_small > closed_large * 3,
            "capacity 1 closed {closed_small} vs capacity 20 closed {closed_large}"
        );
    }

    #[test]
    fn test_capacity_bias_prefers_opening_large() {
        let inst = instance();
        let parent = OpenSet::closed(5);
        let mut rng = create_rng(4);
        let mut opened_large = 0;
        let mut opened_small = 0;
        for _ in 0..500 {
            let child = shake(&parent, 1, ShakingMode::CapacityBiased, &inst, &mut rng);
            if child.is_open(3) {
                opened_large += 1;
            }
            if child.is_open(2) {
                opened_small += 1;
            }
        }
        assert!(opened_large > opened_small * 3);
    }

    #[test]
    fn test_shake_feasible_respects_precheck() {
        let inst = instance();
        let eval = Evaluator::new(&inst, TransportMode::Vogel);
        let mut rng = create_rng(5);
        let parent = OpenSet::all_open(5);
        for _ in 0..50 {
            if let Some(child) =
                shake_feasible(&parent, 3, ShakingMode::Uniform, &eval, 20, &mut rng)
            {
                assert!(eval.passes_precheck(&child));
            }
        }
    }

    #[test]
    fn test_shake_feasible_gives_up() {
        // Demand needs every facility open; any flip from all-open fails.
        let inst = Instance::from_rows(
            vec![20.0],
            vec![10.0, 10.0],
            vec![1.0, 1.0],
            vec![vec![1.0], vec![1.0]],
        )
        .expect("valid");
        let eval = Evaluator::new(&inst, TransportMode::Vogel);
        let mut rng = create_rng(5);
        let out = shake_feasible(&OpenSet::all_open(2), 1, ShakingMode::Uniform, &eval, 10, &mut rng);
        assert!(out.is_none());
    }

    #[test]
    fn test_open_random_only_opens() {
        let mut rng = create_rng(11);
        let parent = OpenSet::from_vec(vec![true, false, false, true, false]);
        let child = open_random(&parent, 2, &mut rng);
        assert_eq!(child.open_count(), 4);
        assert!(child.is_open(0) && child.is_open(3));
        let full = open_random(&child, 10, &mut rng);
        assert_eq!(full, OpenSet::all_open(5));
    }
}

use bioprint_logic::organs::Organ;
use bioprint_logic::progression::{level_for, LEVELS};
use bioprint_logic::simulation::{estimate, SimulationOutput};
use proptest::prelude::*;

fn organ() -> impl Strategy<Value = Organ> {
    prop::sample::select(Organ::ALL.to_vec())
}

fn percentages(out: &SimulationOutput) -> [u8; 4] {
    [
        out.rejection_probability,
        out.integration_success,
        out.functional_recovery,
        out.long_term_stability,
    ]
}

proptest! {
    #[test]
    fn outputs_stay_within_one_to_hundred(
        organ in organ(),
        c in 0i64..=100,
        s in 0i64..=100,
        g in 0i64..=100,
    ) {
        let out = estimate(organ, c, s, g).unwrap();
        for value in percentages(&out) {
            prop_assert!((1..=100).contains(&value), "{value} out of range for {organ}");
        }
    }

    #[test]
    fn estimate_is_pure(organ in organ(), c in 0i64..=100, s in 0i64..=100, g in 0i64..=100) {
        prop_assert_eq!(estimate(organ, c, s, g).unwrap(), estimate(organ, c, s, g).unwrap());
    }

    #[test]
    fn more_collagen_never_hurts(organ in organ(), c in 0i64..100, s in 0i64..=100, g in 0i64..=100) {
        let lo = estimate(organ, c, s, g).unwrap();
        let hi = estimate(organ, c + 1, s, g).unwrap();
        prop_assert!(hi.rejection_probability <= lo.rejection_probability);
        prop_assert!(hi.integration_success >= lo.integration_success);
        // Collagen touches neither of these
        prop_assert_eq!(hi.functional_recovery, lo.functional_recovery);
        prop_assert_eq!(hi.long_term_stability, lo.long_term_stability);
    }

    #[test]
    fn ten_points_of_collagen_move_unclamped_scores(
        organ in organ(),
        c in 0i64..=90,
        s in 0i64..=100,
        g in 0i64..=100,
    ) {
        let lo = estimate(organ, c, s, g).unwrap();
        let hi = estimate(organ, c + 10, s, g).unwrap();
        prop_assert!(hi.rejection_probability < lo.rejection_probability || lo.rejection_probability == 1);
        prop_assert!(hi.integration_success > lo.integration_success || hi.integration_success == 100);
    }

    #[test]
    fn later_checkpoints_imply_earlier_ones(
        organ in organ(),
        c in 0i64..=100,
        s in 0i64..=100,
        g in 0i64..=100,
    ) {
        let t = estimate(organ, c, s, g).unwrap().timeline;
        prop_assert!(t.day1 && t.day7);
        prop_assert!(!t.day90 || t.day30);
        prop_assert!(!t.day30 || t.day14);
    }

    #[test]
    fn out_of_range_sliders_rejected(organ in organ(), bad in prop_oneof![i64::MIN..0i64, 101i64..i64::MAX]) {
        prop_assert!(estimate(organ, bad, 50, 50).is_err());
        prop_assert!(estimate(organ, 50, bad, 50).is_err());
        prop_assert!(estimate(organ, 50, 50, bad).is_err());
    }

    #[test]
    fn level_never_decreases_with_xp(a in 0u64..20_000, b in 0u64..20_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (lo, hi) = (level_for(lo), level_for(hi));
        prop_assert!(lo.level <= hi.level);
        prop_assert!(lo.percent_to_next_level <= 100 && hi.percent_to_next_level <= 100);
        prop_assert!((1..=LEVELS.len() as u8).contains(&hi.level));
    }
}

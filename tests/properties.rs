//! Property tests for fused single-pass aggregation

use passweld::prelude::*;
use passweld::util::Tally;
use proptest::prelude::*;

fn arb_source() -> impl Strategy<Value = Vec<i16>> {
    prop::collection::vec(-50i16..50, 0..64)
}

fn arb_keyed() -> impl Strategy<Value = Vec<(u8, i16)>> {
    prop::collection::vec((0u8..8, any::<i16>()), 0..24)
}

fn brute_force_has_duplicates<T: PartialEq>(items: &[T]) -> bool {
    (0..items.len()).any(|i| (0..items.len()).any(|j| i != j && items[i] == items[j]))
}

proptest! {
    #[test]
    fn duplicates_iff_two_positions_are_equal(items in arb_source()) {
        let (dupes,) = items.clone().aggregate(HasDuplicates::new()).into_results()?;
        prop_assert_eq!(dupes, brute_force_has_duplicates(&items));
    }

    #[test]
    fn duplicates_by_key_ignore_the_rest(items in arb_keyed()) {
        let (dupes,) = items
            .clone()
            .aggregate(HasDuplicates::by_key(|(k, _): &(u8, i16)| *k))
            .into_results()?;
        let keys: Vec<u8> = items.iter().map(|(k, _)| *k).collect();
        prop_assert_eq!(dupes, brute_force_has_duplicates(&keys));
    }

    #[test]
    fn min_is_the_earliest_smallest_element(items in arb_keyed()) {
        let by_key = |a: &(u8, i16), b: &(u8, i16)| a.0.cmp(&b.0);
        let result = items.clone().aggregate(Min::with_comparer(by_key)).into_results();

        match items.iter().map(|(k, _)| *k).min() {
            None => {
                prop_assert!(result.unwrap_err().is_empty_sequence());
            }
            Some(smallest) => {
                let earliest = items.iter().find(|(k, _)| *k == smallest).copied();
                prop_assert_eq!(Some(result?.0), earliest);
            }
        }
    }

    #[test]
    fn fusion_preserves_each_aggregate(items in arb_source()) {
        let fused = items
            .clone()
            .aggregate(HasDuplicates::new())
            .add(Min::new().or_none())?
            .add(Max::new().or_none())?
            .add(Count::matching(|x: &i16| *x >= 0))?
            .add(First::matching(|x: &i16| *x % 7 == 0).or_none())?
            .into_results()?;

        prop_assert_eq!(fused.0, brute_force_has_duplicates(&items));
        prop_assert_eq!(fused.1, items.iter().copied().min());
        prop_assert_eq!(fused.2, items.iter().copied().max());
        prop_assert_eq!(fused.3, items.iter().filter(|x| **x >= 0).count());
        prop_assert_eq!(fused.4, items.iter().copied().find(|x| *x % 7 == 0));
    }

    #[test]
    fn source_is_traversed_at_most_once(items in arb_source(), reads in 1usize..6) {
        let (source, stats) = Tally::new(items.clone());
        let request = source
            .aggregate(HasDuplicates::new())
            .add(Min::new().or_none())?
            .add(Sum::by(|x: &i16| i64::from(*x)))?;

        for _ in 0..reads {
            request.results()?;
        }
        prop_assert_eq!(stats.cursors(), 1);
        prop_assert_eq!(stats.released(), 1);
        prop_assert_eq!(stats.yielded(), items.len());
    }

    #[test]
    fn early_stop_pulls_up_to_the_first_repeat(items in arb_source()) {
        let (source, stats) = Tally::new(items.clone());
        let (dupes,) = source.aggregate(HasDuplicates::new()).into_results()?;

        let first_repeat = (0..items.len()).find(|&j| items[..j].contains(&items[j]));
        match first_repeat {
            Some(j) => {
                prop_assert!(dupes);
                prop_assert_eq!(stats.advances(), j + 1);
            }
            None => {
                prop_assert!(!dupes);
                prop_assert_eq!(stats.advances(), items.len() + 1);
            }
        }
    }

    #[test]
    fn prune_matches_broadcast(items in arb_source()) {
        let run = |fan_out: FanOut| -> Result<(bool, bool, bool, Option<i16>)> {
            items
                .clone()
                .aggregate(HasDuplicates::new())
                .add(AnyMatch::new(|x: &i16| *x > 40))?
                .add(AllMatch::new(|x: &i16| *x > -40))?
                .add(Max::new().or_none())?
                .fan_out(fan_out)
                .into_results()
        };
        prop_assert_eq!(run(FanOut::Broadcast)?, run(FanOut::Prune)?);
    }
}

use proptest::prelude::*;
use scrolly_data::{filter, group_reduce, AggregatedSeries, Listing, Reducer, SeriesOrder};

const HOODS: [&str; 4] = ["Harlem", "Chelsea", "Williamsburg", "Astoria"];

fn listings_strategy() -> impl Strategy<Value = Vec<Listing>> {
    prop::collection::vec((0usize..HOODS.len(), 1u32..5_000), 0..60).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (hood, price))| Listing::new(i as u64, HOODS[hood], f64::from(price)))
            .collect()
    })
}

fn by_hood(l: &Listing) -> String {
    l.neighbourhood.clone()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

fn assert_same_groups(a: &AggregatedSeries, b: &AggregatedSeries) {
    let a = a.sorted(SeriesOrder::KeyAscending);
    let b = b.sorted(SeriesOrder::KeyAscending);
    assert_eq!(a.keys().collect::<Vec<_>>(), b.keys().collect::<Vec<_>>());
    for (x, y) in a.iter().zip(b.iter()) {
        assert!(close(x.value, y.value), "{} differs: {} vs {}", x.key, x.value, y.value);
    }
}

proptest! {
    #[test]
    fn prop_grouping_ignores_input_order(
        (original, shuffled) in listings_strategy()
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        for reducer in [Reducer::Count, Reducer::sum("price"), Reducer::mean("price")] {
            let a = group_reduce(&original, by_hood, &reducer).unwrap();
            let b = group_reduce(&shuffled, by_hood, &reducer).unwrap();
            assert_same_groups(&a, &b);
        }
    }

    #[test]
    fn prop_sum_is_mean_times_count(listings in listings_strategy()) {
        let count = group_reduce(&listings, by_hood, &Reducer::Count).unwrap();
        let sum = group_reduce(&listings, by_hood, &Reducer::sum("price")).unwrap();
        let mean = group_reduce(&listings, by_hood, &Reducer::mean("price")).unwrap();

        prop_assert_eq!(count.len(), sum.len());
        for point in &sum {
            let n = count.get(&point.key).unwrap();
            let m = mean.get(&point.key).unwrap();
            prop_assert!(n >= 1.0);
            prop_assert!(close(point.value, m * n));
        }
    }

    #[test]
    fn prop_filter_then_aggregate_matches_slice(
        listings in listings_strategy(),
        hood in 0usize..HOODS.len(),
    ) {
        let key = HOODS[hood];
        let full = group_reduce(&listings, by_hood, &Reducer::mean("price")).unwrap();
        let slice = filter(&listings, |l| l.neighbourhood == key);
        let narrowed = group_reduce(&slice, by_hood, &Reducer::mean("price")).unwrap();

        match full.get(key) {
            Some(value) => {
                prop_assert_eq!(narrowed.len(), 1);
                prop_assert_eq!(narrowed.get(key), Some(value));
            }
            None => prop_assert!(narrowed.is_empty()),
        }
    }

    #[test]
    fn prop_group_reduce_is_idempotent(listings in listings_strategy()) {
        let reducer = Reducer::mean("price");
        let a = group_reduce(&listings, by_hood, &reducer).unwrap();
        let b = group_reduce(&listings, by_hood, &reducer).unwrap();
        prop_assert_eq!(a, b);
    }
}

#[test]
fn scenario_mean_price_two_neighbourhoods() {
    let listings = vec![
        Listing::new(1, "X", 100.0),
        Listing::new(2, "X", 200.0),
        Listing::new(3, "Y", 300.0),
    ];
    let series = group_reduce(&listings, by_hood, &Reducer::mean("price")).unwrap();
    assert_eq!(series, AggregatedSeries::from_pairs([("X", 150.0), ("Y", 300.0)]));
}

//! Property tests for in-memory fragment store search.

use std::collections::HashMap;

use meeting_rag::fragment::{Category, Fragment, FragmentFilter};
use meeting_rag::inmemory::InMemoryFragmentStore;
use meeting_rag::store::{FragmentPoint, FragmentStore};
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

fn arb_category() -> impl Strategy<Value = Category> {
    prop_oneof![Just(Category::Minute), Just(Category::ActionItem), Just(Category::KeyInsight)]
}

fn arb_meeting() -> impl Strategy<Value = String> {
    prop_oneof![Just("MTG_001".to_string()), Just("MTG_002".to_string())]
}

/// Generate a fragment point with a normalized embedding.
fn arb_point(dim: usize) -> impl Strategy<Value = FragmentPoint> {
    ("[a-z]{3,8}", "[a-z ]{4,30}[a-z]", arb_category(), arb_meeting(), arb_normalized_embedding(dim))
        .prop_map(|(id, text, category, meeting, vector)| {
            let fragment = match category {
                Category::Minute => Fragment::minute(&id, meeting, text),
                Category::ActionItem => {
                    Fragment::action_item(&id, meeting, text, Default::default())
                }
                Category::KeyInsight => Fragment::key_insight(&id, meeting, text),
            };
            FragmentPoint { id, vector, fragment, source_file: None }
        })
}

fn arb_filter() -> impl Strategy<Value = FragmentFilter> {
    (proptest::option::of(arb_category()), proptest::option::of(arb_meeting()))
        .prop_map(|(category, record_id)| FragmentFilter { category, record_id })
}

/// *For any* set of points stored in an InMemoryFragmentStore and any filter,
/// search returns results ordered by descending cosine similarity, every
/// result satisfies the filter, and the count is at most `limit`.
mod prop_inmemory_search {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_filtered_and_bounded(
            points in proptest::collection::vec(arb_point(DIM), 0..20),
            query in arb_normalized_embedding(DIM),
            filter in arb_filter(),
            limit in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (results, matching) = rt.block_on(async {
                let store = InMemoryFragmentStore::new(DIM);

                // Deduplicate by id to avoid upsert overwriting
                let mut deduped: HashMap<String, FragmentPoint> = HashMap::new();
                for point in &points {
                    deduped.entry(point.id.clone()).or_insert_with(|| point.clone());
                }
                let unique: Vec<FragmentPoint> = deduped.into_values().collect();
                let matching = unique.iter().filter(|p| filter.matches(&p.fragment)).count();

                store.upsert(&unique).await.unwrap();
                let results = store.search(&query, &filter, limit).await.unwrap();
                (results, matching)
            });

            prop_assert!(results.len() <= limit);
            prop_assert_eq!(results.len(), matching.min(limit));

            for result in &results {
                prop_assert!(filter.matches(&result.fragment));
            }

            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }
    }
}

use std::collections::HashMap;

use hrplus_int_test::test_util::{
    cleanup, create_test_context, create_test_context_with, random_box, run_test, version,
    TestContext,
};
use hrplus_tree::{BoundingBox, HRTreeConfig, HRTreeResult, ObjectId, QueryMatch, VersionedRTree};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

type OracleItem = GeomWithData<Rectangle<[f64; 2]>, ObjectId>;

fn aabb(b: &BoundingBox) -> AABB<[f64; 2]> {
    AABB::from_corners([b.min_x, b.min_y], [b.max_x, b.max_y])
}

fn sorted_ids(matches: Vec<QueryMatch>) -> Vec<ObjectId> {
    let mut ids: Vec<ObjectId> = matches.into_iter().map(|m| m.feature_id).collect();
    ids.sort();
    ids
}

fn sorted_oracle<'a>(items: impl Iterator<Item = &'a OracleItem>) -> Vec<ObjectId> {
    let mut ids: Vec<ObjectId> = items.map(|item| item.data).collect();
    ids.sort();
    ids
}

/// Loads the same random boxes into the tree and into one rstar tree per
/// version, then compares both on random windows.
fn compare_with_oracle(
    ctx: TestContext,
    versions: usize,
    inserts: usize,
    queries: usize,
) -> HRTreeResult<()> {
    let tree = ctx.tree();
    let mut rng = ctx.rng();
    let mut oracles: HashMap<ObjectId, RTree<OracleItem>> = HashMap::new();

    for i in 0..inserts {
        let b = random_box(&mut rng, 1000.0, 20.0);
        let v = version(i % versions);
        let feature = ObjectId::random();
        tree.add(feature, &b, v)?;
        oracles
            .entry(v)
            .or_default()
            .insert(GeomWithData::new(
                Rectangle::from_corners([b.min_x, b.min_y], [b.max_x, b.max_y]),
                feature,
            ));
    }
    assert_eq!(tree.size(), inserts as u64);

    for _ in 0..queries {
        let window = random_box(&mut rng, 1000.0, 150.0);
        let mut all_expected = Vec::new();
        let mut all_contained = Vec::new();

        for v in 0..versions {
            let oracle = &oracles[&version(v)];
            let expected = sorted_oracle(oracle.locate_in_envelope_intersecting(&aabb(&window)));
            let actual = sorted_ids(tree.find_intersecting_in_version(&window, version(v))?);
            assert_eq!(actual, expected, "seed {} window {} version {}", ctx.seed(), window, v);

            all_expected.extend(expected);
            all_contained.extend(oracle.locate_in_envelope(&aabb(&window)).map(|item| item.data));
        }

        all_expected.sort();
        assert_eq!(sorted_ids(tree.find_intersecting(&window)?), all_expected);

        all_contained.sort();
        assert_eq!(sorted_ids(tree.find_contained(&window)?), all_contained);
    }
    Ok(())
}

#[test]
fn test_matches_rstar_default_fan_out() {
    run_test(
        || create_test_context(),
        |ctx| compare_with_oracle(ctx, 3, 600, 200),
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_matches_rstar_wide_fan_out() {
    run_test(
        || create_test_context_with(HRTreeConfig::new().with_max_degree(16).with_min_degree(6)),
        |ctx| compare_with_oracle(ctx, 5, 3000, 200),
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_matches_rstar_single_version() {
    run_test(
        || create_test_context_with(HRTreeConfig::new().with_max_degree(6).with_min_degree(2)),
        |ctx| compare_with_oracle(ctx, 1, 1500, 300),
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_whole_extent_returns_everything() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            let mut rng = ctx.rng();
            for i in 0..400 {
                tree.add(ObjectId::NULL, &random_box(&mut rng, 50.0, 5.0), version(i % 2))?;
            }
            let everything = BoundingBox::new(-1.0, -1.0, 100.0, 100.0);
            assert_eq!(tree.find_intersecting(&everything)?.len(), 400);
            assert_eq!(tree.find_contained(&everything)?.len(), 400);
            assert_eq!(tree.find_intersecting_in_version(&everything, version(0))?.len(), 200);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

use hrplus_int_test::test_util::{cleanup, create_test_context, envelope, run_test, version};
use hrplus_tree::{BoundingBox, ObjectId, VersionedRTree};

#[test]
fn test_query_line_of_boxes() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            let boxes = [
                envelope(-12.0, -10.0, -2.0, 2.0),
                envelope(-8.0, -6.0, -2.0, 2.0),
                envelope(-4.0, -2.0, -2.0, 2.0),
            ];
            for b in &boxes {
                tree.add(ObjectId::NULL, b, version(1))?;
            }

            assert_eq!(tree.find_intersecting(&envelope(-50.0, 50.0, -50.0, 50.0))?.len(), 3);
            for b in &boxes {
                let hits = tree.find_intersecting(b)?;
                assert_eq!(hits.len(), 1);
                assert_eq!(hits[0].bounds, *b);
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_query_quadrants() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            let boxes = [
                envelope(5.0, 10.0, 5.0, 10.0),
                envelope(-10.0, -5.0, 5.0, 10.0),
                envelope(-10.0, -5.0, -5.0, -10.0),
                envelope(10.0, 5.0, -5.0, -10.0),
            ];
            for b in &boxes {
                tree.add(ObjectId::NULL, b, version(1))?;
            }

            assert!(tree.find_intersecting(&envelope(-4.0, 4.0, -4.0, 4.0))?.is_empty());
            assert_eq!(tree.find_intersecting(&envelope(-10.0, 10.0, -10.0, 10.0))?.len(), 4);

            let probes = [
                envelope(11.0, 4.0, 4.0, 11.0),
                envelope(-11.0, -4.0, 4.0, 11.0),
                envelope(-11.0, -4.0, -4.0, -11.0),
                envelope(11.0, 4.0, -4.0, -11.0),
            ];
            for (probe, expected) in probes.iter().zip(boxes.iter()) {
                let hits = tree.find_intersecting(probe)?;
                assert_eq!(hits.len(), 1);
                assert_eq!(hits[0].bounds, *expected);
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_query_edges_and_points() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            tree.add(ObjectId::NULL, &envelope(0.0, 2.0, 0.0, 2.0), version(1))?;
            tree.add(ObjectId::NULL, &BoundingBox::point(5.0, 5.0), version(1))?;

            // shared edge counts as intersecting
            assert_eq!(tree.find_intersecting(&envelope(2.0, 3.0, 0.0, 1.0))?.len(), 1);
            assert_eq!(tree.find_intersecting(&BoundingBox::point(5.0, 5.0))?.len(), 1);
            assert_eq!(tree.find_intersecting(&BoundingBox::point(1.0, 1.0))?.len(), 1);
            assert!(tree.find_intersecting(&BoundingBox::point(3.0, 3.0))?.is_empty());
            assert!(tree.find_intersecting(&BoundingBox::empty())?.is_empty());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_containment_is_stricter_than_intersection() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            for i in 0..10 {
                let x = i as f64 * 2.0;
                tree.add(ObjectId::NULL, &envelope(x, x + 1.5, 0.0, 1.0), version(1))?;
            }

            let window = envelope(0.0, 7.0, 0.0, 1.0);
            // x = 0, 2, 4 fit inside, x = 6 pokes out past 7
            assert_eq!(tree.find_contained(&window)?.len(), 3);
            assert_eq!(tree.find_intersecting(&window)?.len(), 4);

            let guard = tree.read();
            assert_eq!(guard.query_contained_in_version(&window, version(1)).len(), 3);
            assert!(guard.query_contained_in_version(&window, version(2)).is_empty());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_query_results_carry_feature_ids() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            let ids: Vec<ObjectId> = (0..20).map(|_| ObjectId::random()).collect();
            for (i, id) in ids.iter().enumerate() {
                let x = i as f64 * 3.0;
                tree.add(*id, &envelope(x, x + 1.0, 0.0, 1.0), version(1))?;
            }

            let mut found: Vec<ObjectId> = tree
                .find_intersecting(&envelope(-1.0, 100.0, -1.0, 2.0))?
                .into_iter()
                .map(|m| m.feature_id)
                .collect();
            let mut expected = ids.clone();
            found.sort();
            expected.sort();
            assert_eq!(found, expected);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

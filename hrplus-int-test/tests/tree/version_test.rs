use hrplus_int_test::test_util::{
    cleanup, create_test_context, envelope, insert_line, run_test, version,
};
use hrplus_tree::{BoundingBox, ObjectId, VersionedRTree};

#[test]
fn test_each_version_gets_its_own_root() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            for v in 0..5 {
                tree.add(ObjectId::NULL, &envelope(0.0, 1.0, 0.0, 1.0), version(v))?;
            }

            assert_eq!(tree.num_roots(), 5);
            let guard = tree.read();
            let roots: Vec<_> = (0..5).filter_map(|v| guard.root_for_version(version(v))).collect();
            assert_eq!(roots.len(), 5);
            for (i, a) in roots.iter().enumerate() {
                for b in &roots[i + 1..] {
                    assert_ne!(a, b);
                }
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_versions_are_isolated() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            insert_line(&tree, 12, version(1))?;
            tree.add(ObjectId::NULL, &envelope(100.0, 101.0, 0.0, 1.0), version(2))?;

            let everything = envelope(-1000.0, 1000.0, -1000.0, 1000.0);
            assert_eq!(tree.find_intersecting_in_version(&everything, version(1))?.len(), 12);
            assert_eq!(tree.find_intersecting_in_version(&everything, version(2))?.len(), 1);
            assert_eq!(tree.find_intersecting(&everything)?.len(), 13);

            let guard = tree.read();
            assert_eq!(guard.height(version(2)), Some(1));
            assert!(guard.height(version(1)).unwrap_or(0) > 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_identical_boxes_across_versions() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            let b = envelope(3.0, 4.0, 3.0, 4.0);
            let feature = ObjectId::for_name("feature-1");
            for v in 0..3 {
                tree.add(feature, &b, version(v))?;
            }

            let hits = tree.find_intersecting(&b)?;
            assert_eq!(hits.len(), 3);
            assert!(hits.iter().all(|m| m.feature_id == feature && m.bounds == b));
            let mut seen: Vec<_> = hits.iter().map(|m| m.version_id).collect();
            seen.dedup();
            assert_eq!(seen, vec![version(0), version(1), version(2)]);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_unknown_version_is_empty_not_an_error() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            insert_line(&tree, 3, version(0))?;
            let hits =
                tree.find_intersecting_in_version(&envelope(0.0, 10.0, 0.0, 10.0), version(9))?;
            assert!(hits.is_empty());
            assert!(!tree.has_version(version(9)));

            let guard = tree.read();
            assert!(guard.leaves(version(9)).is_empty());
            assert!(guard.containers_for_root(version(9)).is_empty());
            assert!(guard.entries_for_version(version(9)).is_empty());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_remove_version_keeps_others() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            insert_line(&tree, 7, version(0))?;
            insert_line(&tree, 5, version(1))?;
            insert_line(&tree, 3, version(2))?;

            assert!(tree.remove_version(version(1))?);
            assert!(!tree.remove_version(version(1))?);
            assert_eq!(tree.num_roots(), 2);
            assert_eq!(tree.size(), 10);

            let order: Vec<_> = tree.read().versions().collect();
            assert_eq!(order, vec![version(0), version(2)]);

            // a removed version can be started again from scratch
            tree.add(ObjectId::NULL, &BoundingBox::point(1.0, 1.0), version(1))?;
            assert_eq!(tree.read().versions().last(), Some(version(1)));
            assert_eq!(tree.read().leaves(version(1)).len(), 1);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_stats_track_versions() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            insert_line(&tree, 6, version(0))?;
            insert_line(&tree, 2, version(1))?;

            let stats = tree.stats();
            assert_eq!(stats.num_roots, 2);
            assert_eq!(stats.leaf_count, 8);
            assert_eq!(stats.max_height, 3);
            // one internal entry per non-root container
            assert_eq!(stats.internal_entry_count, stats.container_count - 2);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

use hrplus_int_test::test_util::{
    cleanup, create_test_context, create_test_context_with, envelope, insert_line, run_test,
    version,
};
use hrplus_tree::{HRTreeConfig, HRTreeError, ObjectId, VersionedRTree};

#[test]
fn test_height_grows_with_line_inserts() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            let expected = [(3, 1, 1), (4, 2, 3), (5, 2, 4), (6, 3, 7)];
            let mut inserted = 0;
            for (count, height, containers) in expected {
                insert_line_from(&tree, inserted, count)?;
                inserted = count;

                let guard = tree.read();
                assert_eq!(guard.height(version(1)), Some(height), "after {} inserts", count);
                assert_eq!(guard.containers_for_root(version(1)).len(), containers);
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

fn insert_line_from(
    tree: &hrplus_tree::SharedHRPlusTree,
    from: usize,
    to: usize,
) -> hrplus_tree::HRTreeResult<()> {
    for i in from..to {
        let x = 2.0 * i as f64;
        tree.add(ObjectId::NULL, &envelope(x, x + 1.0, 0.0, 1.0), version(1))?;
    }
    Ok(())
}

#[test]
fn test_twelve_nested_inserts() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            let boxes = [
                envelope(12.0, 10.0, 4.0, 2.0),
                envelope(-12.0, -10.0, 4.0, 2.0),
                envelope(-12.0, -10.0, -4.0, -2.0),
                envelope(12.0, 10.0, -4.0, -2.0),
                envelope(11.0, 9.0, 3.0, 2.0),
                envelope(-11.0, -9.0, 3.0, 2.0),
                envelope(-11.0, -9.0, -3.0, -2.0),
                envelope(11.0, 9.0, -3.0, -2.0),
                envelope(10.0, 8.0, 2.5, 1.5),
                envelope(-10.0, -8.0, 2.5, 1.5),
                envelope(-10.0, -8.0, -2.5, -1.5),
                envelope(10.0, 8.0, -2.5, -1.5),
            ];
            for b in &boxes {
                tree.add(ObjectId::NULL, b, version(1))?;
            }

            assert_eq!(tree.size(), 12);
            // each quadrant cluster is found by its outer box
            for outer in &boxes[..4] {
                let hits = tree.find_intersecting(outer)?;
                assert!(hits.len() >= 3, "{} found {}", outer, hits.len());
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_sixteen_quadrant_inserts() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            let mut boxes = Vec::new();
            for (sx, sy) in [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)] {
                for (x1, x2, y1, y2) in [
                    (2.0, 4.0, 2.0, 4.0),
                    (2.0, 4.0, 6.0, 8.0),
                    (6.0, 8.0, 2.0, 4.0),
                    (6.0, 8.0, 6.0, 8.0),
                ] {
                    boxes.push(envelope(sx * x1, sx * x2, sy * y1, sy * y2));
                }
            }
            for b in &boxes {
                tree.add(ObjectId::NULL, b, version(1))?;
            }

            assert_eq!(tree.read().leaves(version(1)).len(), 16);
            assert_eq!(tree.find_intersecting(&envelope(0.0, 10.0, 0.0, 10.0))?.len(), 4);
            assert!(tree.find_intersecting(&envelope(-1.0, 1.0, -1.0, 1.0))?.is_empty());
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_min_degree_respected_after_many_splits() {
    run_test(
        || create_test_context_with(HRTreeConfig::new().with_max_degree(9).with_min_degree(4)),
        |ctx| {
            let tree = ctx.tree();
            let mut rng = ctx.rng();
            for i in 0..500 {
                let b = hrplus_int_test::test_util::random_box(&mut rng, 100.0, 3.0);
                tree.add(ObjectId::NULL, &b, version(i % 3))?;
            }

            let guard = tree.read();
            for v in 0..3 {
                let Some(root) = guard.root_for_version(version(v)) else {
                    return Err(HRTreeError::CorruptStructure("missing root".into()));
                };
                for c in guard.containers_for_root(version(v)) {
                    let n = guard.arena().num_nodes(c);
                    assert!(n <= 9);
                    if c != root {
                        assert!(n >= 4, "{:?} holds {}", c, n);
                    }
                }
            }
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_key_split_through_write_guard() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            let mut guard = tree.write();
            let container = guard.arena_mut().new_container();
            let mut ids = Vec::new();
            for (x1, x2) in [(1.0, 2.0), (3.0, 4.0), (5.0, 6.0), (7.0, 8.0)] {
                let e = guard
                    .arena_mut()
                    .new_entry(ObjectId::NULL, envelope(x1, x2, 1.0, 2.0), version(1));
                guard.arena_mut().add_node(container, e)?;
                ids.push(e);
            }

            let sibling = guard.key_split_container_node(container)?;
            assert_eq!(guard.arena().nodes(container), &ids[..1]);
            assert_eq!(guard.arena().nodes(sibling), &ids[1..]);

            let e = guard
                .arena_mut()
                .new_entry(ObjectId::NULL, envelope(9.0, 10.0, 1.0, 2.0), version(1));
            guard.arena_mut().add_node(container, e)?;
            // two entries is the smallest splittable container
            assert!(guard.key_split_container_node(container).is_ok());

            guard.arena_mut().release_container(container);
            guard.arena_mut().release_container(sibling);
            assert!(matches!(
                guard.key_split_container_node(container),
                Err(HRTreeError::InvalidArgument(_))
            ));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_rejected_insert_leaves_tree_untouched() {
    run_test(
        || create_test_context(),
        |ctx| {
            let tree = ctx.tree();
            insert_line(&tree, 4, version(1))?;
            let before = tree.stats();

            let bad = envelope(f64::NEG_INFINITY, 0.0, 0.0, 1.0);
            assert!(tree.add(ObjectId::NULL, &bad, version(1)).is_err());
            let bad = envelope(0.0, f64::INFINITY, 0.0, 1.0);
            assert!(tree.add(ObjectId::NULL, &bad, version(2)).is_err());

            assert_eq!(tree.stats(), before);
            assert!(!tree.has_version(version(2)));
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

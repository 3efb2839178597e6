use hrplus_int_test::test_util::{cleanup, create_test_context_with, run_test, version};
use hrplus_tree::{
    BoundingBox, HRPlusTree, HRTreeConfig, HRTreeError, ObjectId, SharedHRPlusTree, VersionedRTree,
};

#[test]
fn test_config_from_json() {
    let config: HRTreeConfig =
        serde_json::from_str(r#"{"max_degree":12,"min_degree":5}"#).unwrap();
    assert_eq!(config.max_degree(), 12);
    assert_eq!(config.min_degree(), 5);

    run_test(
        || create_test_context_with(config),
        |ctx| {
            let tree = ctx.tree();
            for i in 0..200 {
                let x = (i % 20) as f64 * 2.0;
                let y = (i / 20) as f64 * 2.0;
                tree.add(ObjectId::NULL, &BoundingBox::new(x, y, x + 1.0, y + 1.0), version(0))?;
            }
            assert_eq!(tree.read().max_degree(), 12);
            assert_eq!(tree.size(), 200);
            Ok(())
        },
        |ctx| cleanup(ctx),
    )
}

#[test]
fn test_invalid_configs_rejected() {
    for (max, min) in [(1, 1), (3, 0), (4, 3), (10, 6)] {
        let config = HRTreeConfig::new().with_max_degree(max).with_min_degree(min);
        assert!(
            matches!(HRPlusTree::with_config(config), Err(HRTreeError::InvalidConfig(_))),
            "({}, {}) should be rejected",
            max,
            min
        );
        assert!(SharedHRPlusTree::with_config(config).is_err());
    }
}

#[test]
fn test_object_id_json_and_text() {
    let id = ObjectId::random();
    let json = serde_json::to_string(&id).unwrap();
    let back: ObjectId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, back);

    let parsed = ObjectId::parse_str(&id.to_string()).unwrap();
    assert_eq!(parsed, id);
    assert!(ObjectId::parse_str("not-an-id").is_err());

    let raw = uuid::Uuid::new_v4();
    assert_eq!(ObjectId::from_bytes(*raw.as_bytes()).as_bytes(), raw.as_bytes());
}

#[test]
fn test_stats_and_bounds_json() {
    let mut tree = HRPlusTree::new();
    for i in 0..6 {
        let x = i as f64 * 2.0;
        tree.insert(BoundingBox::new(x, 0.0, x + 1.0, 1.0), version(0)).unwrap();
    }

    let json = serde_json::to_value(tree.stats()).unwrap();
    assert_eq!(json["num_roots"], 1);
    assert_eq!(json["leaf_count"], 6);
    assert_eq!(json["max_height"], 3);

    let b = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
    let back: BoundingBox = serde_json::from_str(&serde_json::to_string(&b).unwrap()).unwrap();
    assert_eq!(back, b);
}

use hrplus_tree::{
    BoundingBox, HRTreeConfig, HRTreeError, HRTreeResult, ObjectId, SharedHRPlusTree,
    VersionedRTree,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Runs a test between a setup and a teardown step.
///
/// The teardown runs even when the test fails or panics, so every test gets
/// its tree checked by [`cleanup`].
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> HRTreeResult<()>,
    B: Fn() -> HRTreeResult<TestContext>,
    A: Fn(TestContext) -> HRTreeResult<()>,
{
    let start_time = Instant::now();
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| test(ctx.clone())));
    let after_result = after(ctx);
    let elapsed = start_time.elapsed();

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => panic!("Test failed after {:?}: {:?}", elapsed, e),
        Err(panic_err) => {
            eprintln!("Test panicked after {:?}", elapsed);
            panic::resume_unwind(panic_err);
        }
    }
    if let Err(e) = after_result {
        panic!("After run failed: {:?}", e);
    }
}

#[derive(Clone)]
pub struct TestContext {
    tree: SharedHRPlusTree,
    seed: u64,
}

impl TestContext {
    pub fn new(tree: SharedHRPlusTree, seed: u64) -> Self {
        Self { tree, seed }
    }

    pub fn tree(&self) -> SharedHRPlusTree {
        self.tree.clone()
    }

    /// A generator seeded per context, so failures replay.
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

pub fn create_test_context() -> HRTreeResult<TestContext> {
    create_test_context_with(HRTreeConfig::default())
}

pub fn create_test_context_with(config: HRTreeConfig) -> HRTreeResult<TestContext> {
    let seed = rand::rng().random::<u64>();
    log::debug!("Test context seed {}", seed);
    Ok(TestContext::new(SharedHRPlusTree::with_config(config)?, seed))
}

/// Verifies the tree's structure, then drops its contents.
pub fn cleanup(ctx: TestContext) -> HRTreeResult<()> {
    let tree = ctx.tree();
    let report = tree.read().check_integrity();
    tree.clear()?;
    if report.is_valid {
        Ok(())
    } else {
        Err(HRTreeError::CorruptStructure(format!(
            "seed {}: {}",
            ctx.seed(),
            report.errors.join("; ")
        )))
    }
}

/// Deterministic version id for the n-th version of a test.
pub fn version(n: usize) -> ObjectId {
    ObjectId::for_name(&format!("version-{}", n))
}

/// Box written as (min_x, max_x, min_y, max_y).
pub fn envelope(x1: f64, x2: f64, y1: f64, y2: f64) -> BoundingBox {
    BoundingBox::new(x1, y1, x2, y2)
}

/// Random box inside `[0, extent]` with sides up to `max_side`.
pub fn random_box(rng: &mut StdRng, extent: f64, max_side: f64) -> BoundingBox {
    let x = rng.random_range(0.0..extent);
    let y = rng.random_range(0.0..extent);
    let w = rng.random_range(0.0..=max_side);
    let h = rng.random_range(0.0..=max_side);
    BoundingBox::new(x, y, x + w, y + h)
}

/// Inserts a row of unit boxes spaced two apart along X.
pub fn insert_line(
    tree: &SharedHRPlusTree,
    count: usize,
    version_id: ObjectId,
) -> HRTreeResult<()> {
    for i in 0..count {
        let x = 2.0 * i as f64;
        tree.add(ObjectId::NULL, &BoundingBox::new(x, 0.0, x + 1.0, 1.0), version_id)?;
    }
    Ok(())
}

use hrplus_tree::{
    BoundingBox, HRTreeConfig, HRTreeResult, ObjectId, SharedHRPlusTree, VersionedRTree,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;
use std::time::Instant;

const WRITERS: usize = 4;
const READERS: usize = 4;
const INSERTS_PER_WRITER: usize = 25_000;

fn main() -> HRTreeResult<()> {
    colog::init();
    println!("Starting stress test...");

    let config = HRTreeConfig::new().with_max_degree(16).with_min_degree(6);
    let tree = SharedHRPlusTree::with_config(config)?;
    let start = Instant::now();

    let mut handles = Vec::new();
    for w in 0..WRITERS {
        let tree = tree.clone();
        handles.push(thread::spawn(move || -> HRTreeResult<usize> {
            let mut rng = StdRng::seed_from_u64(w as u64);
            let version = ObjectId::for_name(&format!("stress-{}", w));
            for _ in 0..INSERTS_PER_WRITER {
                let x = rng.random_range(0.0..1000.0);
                let y = rng.random_range(0.0..1000.0);
                tree.add(ObjectId::random(), &BoundingBox::new(x, y, x + 1.0, y + 1.0), version)?;
            }
            Ok(INSERTS_PER_WRITER)
        }));
    }
    for r in 0..READERS {
        let tree = tree.clone();
        handles.push(thread::spawn(move || -> HRTreeResult<usize> {
            let mut rng = StdRng::seed_from_u64(1000 + r as u64);
            let mut hits = 0;
            for _ in 0..2_000 {
                let x = rng.random_range(0.0..950.0);
                let y = rng.random_range(0.0..950.0);
                hits += tree.find_intersecting(&BoundingBox::new(x, y, x + 50.0, y + 50.0))?.len();
            }
            Ok(hits)
        }));
    }

    for handle in handles {
        match handle.join() {
            Ok(result) => {
                result?;
            }
            Err(_) => log::error!("Stress worker panicked"),
        }
    }

    let stats = tree.stats();
    let report = tree.read().check_integrity();
    println!("Stress test finished in {:?}", start.elapsed());
    println!("Stats: {:?}", stats);
    println!(
        "Integrity: valid={} containers={} entries={}",
        report.is_valid, report.containers_checked, report.entries_checked
    );
    for error in &report.errors {
        log::error!("{}", error);
    }
    Ok(())
}

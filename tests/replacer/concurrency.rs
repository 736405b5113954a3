use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use log::info;
use lruk::error::{Error, Result};
use lruk::storage::buffer::{AccessType, Replacer, SyncLRUKReplacer};
use rand::thread_rng;
use rand::Rng;

const CAPACITY: usize = 64;

#[test]
/// Size always matches the number of evictable frames, no matter how
/// the operations from different threads interleave.
fn test_concurrent_accounting() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let replacer = Arc::new(SyncLRUKReplacer::new(CAPACITY, 3)?);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let replacer = Arc::clone(&replacer);
            thread::spawn(move || -> Result<()> {
                let mut rng = thread_rng();
                for _ in 0..2000 {
                    let frame_id = rng.gen_range(0..CAPACITY);
                    match rng.gen_range(0..10) {
                        0..=3 => replacer.record_access(frame_id, AccessType::Lookup)?,
                        4..=6 => replacer.set_evictable(frame_id, rng.gen_bool(0.5))?,
                        7 => match replacer.remove(frame_id) {
                            Ok(()) | Err(Error::RemovePinnedFrame(_)) => {}
                            Err(e) => return Err(e),
                        },
                        _ => {
                            replacer.evict()?;
                        }
                    }
                }
                Ok(())
            })
        })
        .collect();
    for handle in handles {
        handle.join().map_err(|_| Error::Internal("worker panicked".to_string()))??;
    }

    let mut evictable = 0;
    for frame_id in 0..CAPACITY {
        if replacer.is_evictable(frame_id)? == Some(true) {
            evictable += 1;
        }
    }
    let size = replacer.size()?;
    info!("{} evictable frames left after the workload", size);
    assert_eq!(evictable, size);

    let mut drained = 0;
    while replacer.evict()?.is_some() {
        drained += 1;
    }
    assert_eq!(size, drained);
    assert_eq!(0, replacer.size()?);

    Ok(())
}

#[test]
/// Concurrent evictions hand out every evictable frame exactly once.
fn test_concurrent_evict_unique() -> Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let replacer = Arc::new(SyncLRUKReplacer::new(CAPACITY, 2)?);
    for frame_id in 0..CAPACITY {
        replacer.record_access(frame_id, AccessType::Unknown)?;
        replacer.set_evictable(frame_id, true)?;
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let replacer = Arc::clone(&replacer);
            thread::spawn(move || -> Result<Vec<usize>> {
                let mut victims = vec![];
                while let Some(frame_id) = replacer.evict()? {
                    victims.push(frame_id);
                }
                Ok(victims)
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        let victims = handle.join().map_err(|_| Error::Internal("worker panicked".to_string()))??;
        for frame_id in victims {
            assert!(seen.insert(frame_id), "frame {} evicted twice", frame_id);
        }
    }
    assert_eq!(CAPACITY, seen.len());
    assert_eq!(0, replacer.size()?);

    Ok(())
}

//! Integration test: lifecycle observers.
//!
//! Observers see the expected event stream, and attaching one never
//! changes what a container holds.

use strata::prelude::*;
use strata::types::ContainerKind;
use strata_test_utils::RecordingObserver;

/// The same workload, run against a deque with any observer.
fn deque_workload<O: Observer>(observer: O) -> Vec<u32> {
    let config = DequeConfig::new(16);
    let mut d = ChunkedDeque::from_slice_in(&[1, 2, 3, 4, 5], config, observer).unwrap();
    for v in 6..40 {
        d.push_back(v).unwrap();
    }
    d.pop_front();
    d.pop_back();
    d.iter().copied().collect()
}

/// The same workload, run against an array with any observer.
fn array_workload<O: Observer>(observer: O) -> Vec<u32> {
    let mut a = DynArray::with_capacity_in(2, observer).unwrap();
    for v in 0..20 {
        a.push_back(v).unwrap();
    }
    a.insert_slice(a.begin() + 5, &[100, 101]).unwrap();
    a.pop_back();
    a.shrink_to_fit().unwrap();
    a.as_slice().to_vec()
}

#[test]
fn observers_do_not_change_results() {
    let plain = deque_workload(NoopObserver);
    assert_eq!(plain, deque_workload(LogObserver::default()));
    assert_eq!(plain, deque_workload(RecordingObserver::new()));

    let plain = array_workload(NoopObserver);
    assert_eq!(plain, array_workload(LogObserver::new(log::Level::Debug)));
    assert_eq!(plain, array_workload(RecordingObserver::new()));
}

#[test]
fn array_lifecycle_events() {
    let obs = RecordingObserver::new();
    {
        let mut a = DynArray::new_in(obs.clone());
        a.push_back(1).unwrap();
        a.push_back(2).unwrap();
        a.push_back(3).unwrap();
        a.insert(a.begin(), 0).unwrap();
        let _copy = a.clone();
        let _moved = a.take();
    }
    use EventKind::*;
    assert_eq!(obs.kinds(), vec![Created, Reallocated, Inserted, Cloned, Taken, Dropped]);
    // 0 -> 1 -> 2 -> 4 slots.
    assert_eq!(obs.count(Reallocated), 3);
    // copy, moved-to, and the emptied original.
    assert_eq!(obs.count(Dropped), 3);
    assert!(obs
        .events()
        .iter()
        .all(|e| e.container() == ContainerKind::DynArray));
}

#[test]
fn deque_block_traffic_balances() {
    let obs = RecordingObserver::new();
    {
        let d = ChunkedDeque::from_elem_in(2000, &7i32, DequeConfig::default(), obs.clone()).unwrap();
        assert_eq!(obs.count(EventKind::BlockAllocated), 16);
        assert_eq!(d.map_size(), 16);
    }
    assert_eq!(obs.count(EventKind::BlockReleased), 16);
    assert_eq!(obs.count(EventKind::Dropped), 1);
}

#[test]
fn deque_copy_assignment_reports_directory_resize() {
    let obs = RecordingObserver::new();
    let config = DequeConfig::new(8);
    let source = ChunkedDeque::from_slice_in(&[1u16, 2, 3, 4, 5, 6, 7, 8, 9], config, obs.clone()).unwrap();
    let mut target = ChunkedDeque::from_slice_in(&[0u16], config, obs.clone()).unwrap();
    obs.clear();

    target.clone_from(&source);
    assert_eq!(target.map_size(), 3);
    assert_eq!(
        obs.events(),
        vec![
            Event::BlockAllocated { slot: 1 },
            Event::BlockAllocated { slot: 2 },
            Event::DirectoryResized { from: 1, to: 3 },
            Event::CloneAssigned {
                container: ContainerKind::ChunkedDeque,
                len: 9
            },
        ]
    );

    obs.clear();
    target.clone_from(&ChunkedDeque::from_slice_in(&[5u16], config, obs.clone()).unwrap());
    assert_eq!(target.map_size(), 1);
    assert_eq!(obs.count(EventKind::DirectoryResized), 1);
    // Two surplus blocks from the target, plus the temporary source's one.
    assert_eq!(obs.count(EventKind::BlockReleased), 3);
}

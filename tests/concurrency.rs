//! Concurrent mutation, dispatch ordering and registry tests.

use crossbeam_channel::bounded;
use observable_list::{ChangeKind, ChangeNotification, ListenerError, ListenerHandle, ObservableList};
use parking_lot::Mutex;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

type Log<T> = Arc<Mutex<Vec<ChangeNotification<T>>>>;

fn logged<T: Clone + Send + Sync + 'static>(list: &ObservableList<T>) -> Log<T> {
    let log: Log<T> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    list.register(&ListenerHandle::from_fn(move |n: &ChangeNotification<T>| {
        sink.lock().push(n.clone());
        Ok(())
    }));
    log
}

#[test]
fn test_concurrent_disjoint_batches() {
    let list = Arc::new(ObservableList::named("batches"));
    let log = logged(&list);
    let barrier = Arc::new(Barrier::new(2));

    let batches: Vec<Vec<u32>> = vec![(0..100).collect(), (1000..1100).collect()];
    let workers: Vec<_> = batches
        .iter()
        .cloned()
        .map(|batch| {
            let list = Arc::clone(&list);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                list.extend(batch).unwrap()
            })
        })
        .collect();

    for worker in workers {
        assert!(worker.join().unwrap());
    }

    let contents = list.to_vec();
    assert_eq!(contents.len(), 200);

    // Each batch lands contiguously and in its own order.
    for batch in &batches {
        let start = contents.iter().position(|v| *v == batch[0]).unwrap();
        assert_eq!(&contents[start..start + batch.len()], &batch[..]);
    }

    let log = log.lock();
    assert_eq!(log.len(), 2);
    for notification in log.iter() {
        assert_eq!(notification.kind(), ChangeKind::Added);
        assert!(batches.iter().any(|b| notification.changed_elements() == &b[..]));
    }
}

#[test]
fn test_concurrent_pushes_each_notified_once() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 250;

    let list = Arc::new(ObservableList::new());
    let log = logged(&list);

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let list = Arc::clone(&list);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    list.push(t * PER_THREAD + i).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let total = THREADS * PER_THREAD;
    assert_eq!(list.len(), total);

    // Every commit saw a distinct length, and its snapshot ends with its delta.
    let log = log.lock();
    assert_eq!(log.len(), total);
    let mut lengths: Vec<usize> = log.iter().map(|n| n.resulting_snapshot().len()).collect();
    lengths.sort_unstable();
    assert_eq!(lengths, (1..=total).collect::<Vec<_>>());
    for n in log.iter() {
        assert_eq!(n.resulting_snapshot().last(), n.changed_elements().first());
    }
}

#[test]
fn test_dispatch_order_may_differ_from_commit_order() {
    let list = Arc::new(ObservableList::<String>::named("ordering"));
    let order = Arc::new(Mutex::new(Vec::new()));
    let (entered_tx, entered_rx) = bounded::<()>(1);
    let (release_tx, release_rx) = bounded::<()>(1);

    let sink = Arc::clone(&order);
    list.register(&ListenerHandle::from_fn(move |n: &ChangeNotification<String>| {
        let value = n.changed_elements()[0].clone();
        if value == "first" {
            entered_tx.send(()).map_err(|_| ListenerError::Disconnected)?;
            release_rx.recv().map_err(|_| ListenerError::Disconnected)?;
        }
        sink.lock().push((value, n.resulting_snapshot().to_vec()));
        Ok(())
    }));

    let first = {
        let list = Arc::clone(&list);
        thread::spawn(move || list.push("first".to_string()))
    };

    // "first" has committed and is parked inside its dispatch, lock released.
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    list.push("second".to_string()).unwrap();
    release_tx.send(()).unwrap();
    first.join().unwrap().unwrap();

    let order = order.lock();
    assert_eq!(
        *order,
        vec![
            ("second".to_string(), vec!["first".to_string(), "second".to_string()]),
            ("first".to_string(), vec!["first".to_string()]),
        ]
    );
}

#[test]
fn test_clear_on_empty_skips_lock() {
    let list = Arc::new(ObservableList::<u8>::new());
    let (held_tx, held_rx) = bounded::<()>(1);
    let (release_tx, release_rx) = bounded::<()>(1);

    // Hold shared access so any writer would have to wait.
    let reader = {
        let list = Arc::clone(&list);
        thread::spawn(move || {
            list.read(|_| {
                held_tx.send(()).unwrap();
                release_rx.recv().unwrap();
            })
        })
    };
    held_rx.recv_timeout(Duration::from_secs(5)).unwrap();

    let (done_tx, done_rx) = bounded(1);
    let clearer = {
        let list = Arc::clone(&list);
        thread::spawn(move || done_tx.send(list.clear().unwrap()).unwrap())
    };
    let cleared = done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(!cleared);

    release_tx.send(()).unwrap();
    reader.join().unwrap();
    clearer.join().unwrap();
}

#[test]
fn test_registry_changes_during_mutation() {
    let list = Arc::new(ObservableList::new());
    let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let churn = {
        let list = Arc::clone(&list);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut rounds = 0;
            while !stop.load(std::sync::atomic::Ordering::SeqCst) {
                let handle = ListenerHandle::from_fn(|_: &ChangeNotification<u64>| Ok(()));
                assert!(list.register(&handle));
                assert!(list.unregister(&handle));
                rounds += 1;
            }
            rounds
        })
    };

    let steady = logged(&list);
    for i in 0..500u64 {
        list.push(i).unwrap();
        if i % 2 == 1 {
            list.remove(0).unwrap();
        }
    }
    stop.store(true, std::sync::atomic::Ordering::SeqCst);
    churn.join().unwrap();

    // The steady listener saw every change regardless of the churn.
    assert_eq!(steady.lock().len(), 750);
    assert_eq!(list.len(), 250);
    assert_eq!(list.listener_count(), 1);
}

#[test]
fn test_readers_see_whole_mutations() {
    let list = Arc::new(ObservableList::new());
    let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let reader = {
        let list = Arc::clone(&list);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            while !stop.load(std::sync::atomic::Ordering::SeqCst) {
                // Batches of ten are added and removed atomically.
                let snapshot = list.snapshot();
                assert_eq!(snapshot.len() % 10, 0);
            }
        })
    };

    for round in 0..200u32 {
        list.extend((0..10).map(|i| round * 10 + i)).unwrap();
        if round % 3 == 0 {
            list.remove_range(0..10).unwrap();
        }
    }
    stop.store(true, std::sync::atomic::Ordering::SeqCst);
    reader.join().unwrap();
}

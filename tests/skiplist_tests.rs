// SkipList and MemTable integration tests

use corekv::memtable::{Entry, MemTable, SkipList};
use corekv::Options;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

fn keys_in_order(list: &SkipList) -> Vec<Vec<u8>> {
    list.iter().map(|entry| entry.key().to_vec()).collect()
}

/// Insert out of order, read back every payload, traverse in order
#[test]
fn test_fruit_scenario() {
    env_logger::try_init().ok();
    let list = SkipList::new();

    list.add(Entry::new(b"banana", b"yellow")).unwrap();
    list.add(Entry::new(b"apple", b"red")).unwrap();
    list.add(Entry::new(b"cherry", b"dark red")).unwrap();

    assert_eq!(list.search(b"apple").unwrap().value(), b"red");
    assert_eq!(list.search(b"banana").unwrap().value(), b"yellow");
    assert_eq!(list.search(b"cherry").unwrap().value(), b"dark red");
    assert!(list.search(b"durian").is_none());

    assert_eq!(
        keys_in_order(&list),
        vec![b"apple".to_vec(), b"banana".to_vec(), b"cherry".to_vec()]
    );
}

#[test]
fn test_latest_write_wins() {
    let list = SkipList::new();

    for round in 0..5 {
        for i in 0..100 {
            let key = format!("key{:03}", i);
            let value = format!("value{}_{}", i, round);
            list.add(Entry::new(key.as_bytes(), value.as_bytes())).unwrap();
        }
    }

    assert_eq!(list.len(), 100);
    for i in 0..100 {
        let key = format!("key{:03}", i);
        let expected = format!("value{}_4", i);
        assert_eq!(list.search(key.as_bytes()).unwrap().value(), expected.as_bytes());
    }
}

#[test]
fn test_binary_keys_sorted_bytewise() {
    let list = SkipList::new();

    let mut keys: Vec<Vec<u8>> = vec![
        vec![0xff],
        vec![0x00],
        vec![0x00, 0x00],
        vec![0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01],
        vec![0x80],
        vec![0xff; 16],
        vec![0x01, 0x02, 0x03],
    ];
    for key in &keys {
        list.add(Entry::new(key, b"")).unwrap();
    }

    keys.sort();
    assert_eq!(keys_in_order(&list), keys);
}

#[test]
fn test_size_tracks_inserts_and_updates() {
    let list = SkipList::new();

    list.add(Entry::new(b"key", b"12345")).unwrap();
    let after_insert = list.size();
    assert_eq!(after_insert, Entry::new(b"key", b"12345").size());

    list.add(Entry::new(b"key", b"1234567890")).unwrap();
    assert_eq!(list.size(), after_insert + 5);

    list.add(Entry::new(b"key", b"1")).unwrap();
    assert_eq!(list.size(), after_insert - 4);
}

/// Readers run alongside writers and must only ever see complete records
#[test]
fn test_concurrent_readers_and_writers() {
    let list = Arc::new(SkipList::new());
    let num_writers = 4;
    let num_readers = 4;
    let writes_per_thread = 500;

    let barrier = Arc::new(Barrier::new(num_writers + num_readers));
    let writers_done = Arc::new(AtomicBool::new(false));
    let hits = Arc::new(AtomicUsize::new(0));

    let mut writers = vec![];
    for thread_id in 0..num_writers {
        let list = Arc::clone(&list);
        let barrier = Arc::clone(&barrier);
        writers.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..writes_per_thread {
                let key = format!("thread_{}_key_{:04}", thread_id, i);
                let value = format!("value_for_{}", key);
                list.add(Entry::new(key.as_bytes(), value.as_bytes())).unwrap();
            }
        }));
    }

    let mut readers = vec![];
    for reader_id in 0..num_readers {
        let list = Arc::clone(&list);
        let barrier = Arc::clone(&barrier);
        let writers_done = Arc::clone(&writers_done);
        let hits = Arc::clone(&hits);
        readers.push(thread::spawn(move || {
            barrier.wait();
            let mut i = reader_id;
            while !writers_done.load(Ordering::Acquire) {
                let key = format!(
                    "thread_{}_key_{:04}",
                    i % num_writers,
                    i % writes_per_thread
                );
                if let Some(entry) = list.search(key.as_bytes()) {
                    assert_eq!(entry.key(), key.as_bytes());
                    assert_eq!(entry.value(), format!("value_for_{}", key).as_bytes());
                    hits.fetch_add(1, Ordering::Relaxed);
                }
                i += 7;
            }
        }));
    }

    for handle in writers {
        handle.join().unwrap();
    }
    writers_done.store(true, Ordering::Release);
    for handle in readers {
        handle.join().unwrap();
    }

    assert_eq!(list.len(), num_writers * writes_per_thread);
    let keys = keys_in_order(&list);
    assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    println!("Reader hits during writes: {}", hits.load(Ordering::Relaxed));
}

/// Concurrent writers to the same keys never create duplicates
#[test]
fn test_concurrent_overwrites_same_keys() {
    let list = Arc::new(SkipList::new());
    let mut handles = vec![];

    for thread_id in 0..8 {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            for i in 0..200 {
                let key = format!("shared_{:03}", i);
                let value = format!("writer_{}", thread_id);
                list.add(Entry::new(key.as_bytes(), value.as_bytes())).unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(list.len(), 200);
    for i in 0..200 {
        let key = format!("shared_{:03}", i);
        let value = list.search(key.as_bytes()).unwrap();
        assert!(value.value().starts_with(b"writer_"));
    }
}

#[test]
fn test_memtable_flush_cycle() {
    env_logger::try_init().ok();
    let memtable = MemTable::new(Options::default().memtable_size(4 * 1024)).unwrap();

    let mut written = 0;
    while !memtable.should_flush() {
        let key = format!("key{:06}", written);
        memtable.put(key.as_bytes(), &[b'x'; 100]).unwrap();
        written += 1;
    }

    assert_eq!(memtable.len(), written);
    assert!(memtable.approximate_size() >= 4 * 1024);

    let filter = memtable.build_filter();
    for entry in memtable.iter() {
        assert!(filter.may_contain_key(entry.key()));
    }
}

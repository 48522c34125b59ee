use std::{sync::Arc, thread};

use pkgname::{
    filters::{LanguageRule, standard_filters},
    sources,
    store::{NameStore, StoreConfig, StoreError},
};

fn build_store(candidates: &[&str], history_capacity: usize) -> NameStore {
    let mut config = StoreConfig::new(
        candidates.iter().map(|name| name.to_string()).collect(),
        standard_filters(&LanguageRule::default()),
    );
    config.history_capacity = history_capacity;
    NameStore::new(config).expect("store builds")
}

#[test]
fn concurrent_validations_are_all_recorded() {
    let store = Arc::new(build_store(&["ab", "abc", "abcdefghij"], 1_000));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..50 {
                    let good = format!("w{worker}n{i}");
                    let bad = format!("W{worker}N{i}");
                    assert!(store.validate(&good).accepted);
                    assert!(!store.validate(&bad).accepted);
                    assert!(store.corpus().contains(&store.generate()));
                    let _ = store.recent_history(10);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let history = store.recent_history(usize::MAX);
    assert_eq!(history.accepted.len(), 3 + 8 * 50);
    assert_eq!(history.rejected.len(), 8 * 50);

    let snapshot = store.metrics_snapshot();
    assert_eq!(snapshot.accepted, 400);
    assert_eq!(snapshot.rejected, 400);
    assert_eq!(snapshot.generated, 400);
}

#[test]
fn concurrent_writers_preserve_per_thread_order() {
    let store = Arc::new(build_store(&["abcdef", "abcdefg", "abcdefghij"], 500));

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..100 {
                    store.validate(&format!("t{worker}x{i:03}"));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let accepted = store.recent_history(500).accepted;
    for worker in 0..4 {
        let prefix = format!("t{worker}x");
        let mine: Vec<&String> = accepted
            .iter()
            .filter(|name| name.starts_with(&prefix))
            .collect();
        assert_eq!(mine.len(), 100);
        assert!(mine.windows(2).all(|pair| pair[0] < pair[1]));
    }
}

#[test]
fn history_is_bounded_under_load() {
    let store = build_store(&["ab", "abc"], 3);
    for name in ["a", "b", "c", "d"] {
        store.validate(name);
    }
    assert_eq!(store.recent_history(3).accepted, vec!["b", "c", "d"]);
    assert_eq!(store.recent_history(3), store.recent_history(3));
}

#[test]
fn sources_feed_the_store() {
    let path = std::env::temp_dir().join(format!("pkgname-it-{}.flatfile", std::process::id()));
    std::fs::write(&path, "mux\nnegroni\nBad\n\nrustacean\nhttprouter\n").expect("write source");

    let candidates = sources::load_names(&[&path]).expect("load");
    let store = NameStore::new(StoreConfig::new(
        candidates,
        standard_filters(&LanguageRule::default()),
    ))
    .expect("store");

    assert_eq!(store.corpus(), ["mux", "negroni", "httprouter"]);
    let history = store.recent_history(10);
    assert_eq!(history.rejected, vec!["Bad", "", "rustacean"]);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn store_refuses_to_start_without_names() {
    let result = NameStore::new(StoreConfig::new(
        vec!["Nope".into(), "no_way".into()],
        standard_filters(&LanguageRule::default()),
    ));
    assert!(matches!(result, Err(StoreError::EmptyCorpus)));
}

use std::thread;

use abstruse::prelude::*;

fn fact(subject: usize, object: usize) -> Term {
    Term::app(
        "knows",
        [
            Term::atom(format!("p{subject}")),
            Term::atom(format!("p{object}")),
        ],
    )
}

#[test]
fn writers_and_readers_share_one_index() {
    let shared: SharedIndex = SharedIndex::default();

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    shared.insert(fact(w, i)).unwrap();
                }
            })
        })
        .collect();
    for writer in writers {
        writer.join().unwrap();
    }
    assert_eq!(shared.len(), 100);

    let query = Term::app("knows", [Term::atom("p2"), Term::var()]);
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            let query = query.clone();
            thread::spawn(move || shared.retrieve_cloned(&query, RetrieveMode::Wildcard).len())
        })
        .collect();
    for reader in readers {
        assert_eq!(reader.join().unwrap(), 25);
    }
}

#[test]
fn extend_counts_new_values() {
    let shared = SharedIndex::new(IndexConfig::default());
    assert!(shared.is_empty());
    assert_eq!(shared.extend([fact(0, 1), fact(0, 2), fact(0, 1)]).unwrap(), 2);
    assert_eq!(shared.extend([fact(0, 2)]).unwrap(), 0);

    let index = shared.read();
    assert_eq!(index.retrieve_exact(&fact(0, 1)).count(), 1);
    assert_eq!(index.len(), 2);
}

#[test]
fn wraps_an_existing_index() {
    let mut index = AbstruseIndex::new();
    index.insert(Term::app("p", [Term::var()])).unwrap();

    let shared = SharedIndex::from(index);
    let found = shared.retrieve_cloned(&Term::app("p", [Term::atom("x")]), RetrieveMode::Exact);
    assert!(found.is_empty());
    assert_eq!(shared.len(), 1);
}

mod custom_error;
mod register_emissions;

use custom_error::CustomError;
use register_emissions::Emissions;
use rxlab::subjects::{BufSize, ReplaySubject};
use rxlab::{Observer, Subscribeable, Unsubscribeable};
use std::sync::Arc;

#[test]
fn replay_subject_emit_than_complete() {
    let emissions = Emissions::new();
    let (mut stx, mut srx) = ReplaySubject::emitter_receiver(BufSize::Bounded(3));

    // Emitting without any registered subscribers; values are still buffered.
    for i in 1..=5 {
        stx.next(i);
    }

    assert_eq!(srx.len(), 0);
    assert_eq!(srx.buffered(), vec![3, 4, 5]);

    // A subscriber attached after five emissions sees the last three first.
    srx.subscribe(emissions.subscriber()); // 1st

    assert_eq!(srx.len(), 1);
    assert_eq!(emissions.nexts(), vec![3, 4, 5]);

    stx.next(6);

    assert_eq!(emissions.nexts(), vec![3, 4, 5, 6]);
    assert_eq!(srx.buffered(), vec![4, 5, 6]);

    srx.subscribe(emissions.subscriber()); // 2nd
    stx.complete();

    assert_eq!(srx.len(), 0);
    assert_eq!(emissions.nexts().len(), 7);
    assert_eq!(emissions.completes(), 2);

    // Stored values are replayed even after completion, then the completion.
    srx.subscribe(emissions.subscriber()); // 3rd
    stx.next(7);

    assert_eq!(emissions.nexts(), vec![3, 4, 5, 6, 4, 5, 6, 4, 5, 6]);
    assert_eq!(emissions.completes(), 3);
    assert!(emissions.errors().is_empty());
}

#[test]
fn replay_subject_emit_than_error() {
    let emissions = Emissions::new();
    let (mut stx, mut srx) = ReplaySubject::emitter_receiver(BufSize::Unbounded);

    srx.subscribe(emissions.subscriber());
    srx.subscribe(emissions.subscriber());

    stx.next(1);
    stx.next(2);
    stx.error(Arc::new(CustomError("bus failed")));

    assert_eq!(srx.len(), 0);
    assert_eq!(emissions.nexts().len(), 4);
    assert_eq!(emissions.errors(), vec!["bus failed"; 2]);

    // A late subscriber receives the whole buffer and then the error.
    srx.subscribe(emissions.subscriber());

    assert_eq!(emissions.nexts(), vec![1, 1, 2, 2, 1, 2]);
    assert_eq!(emissions.errors().len(), 3);
    assert_eq!(emissions.completes(), 0);
}

#[test]
fn replay_subject_unsubscribe_single_observer() {
    let kept = Emissions::new();
    let dropped = Emissions::new();
    let (mut stx, mut srx) = ReplaySubject::emitter_receiver(BufSize::Bounded(2));

    srx.subscribe(kept.subscriber());
    let subscription = srx.subscribe(dropped.subscriber());
    stx.next("a");

    subscription.unsubscribe();
    stx.next("b");

    assert_eq!(srx.len(), 1);
    assert_eq!(kept.nexts(), vec!["a", "b"]);
    assert_eq!(dropped.nexts(), vec!["a"]);
}

#[test]
fn replay_subject_close_receiver() {
    let emissions = Emissions::new();
    let (mut stx, srx) = ReplaySubject::emitter_receiver(BufSize::Unbounded);
    let mut srx_c = srx.clone();

    srx_c.subscribe(emissions.subscriber());
    stx.next(1);

    srx.unsubscribe();
    stx.next(2);
    srx_c.subscribe(emissions.subscriber());

    assert_eq!(srx_c.len(), 0);
    assert_eq!(emissions.nexts(), vec![1]);
}

#[test]
fn replay_subject_emitter_as_subscriber() {
    let emissions = Emissions::new();
    let (mut upstream_tx, mut upstream_rx) = ReplaySubject::emitter_receiver(BufSize::Unbounded);
    let (mut downstream_tx, mut downstream_rx) =
        ReplaySubject::emitter_receiver(BufSize::Bounded(1));

    // Chain two subjects: everything emitted upstream flows downstream.
    upstream_rx.subscribe(downstream_tx.clone().into());
    upstream_tx.next(10);
    upstream_tx.next(20);

    downstream_rx.subscribe(emissions.subscriber());
    upstream_tx.complete();
    downstream_tx.next(30);

    assert_eq!(emissions.nexts(), vec![20]);
    assert_eq!(emissions.completes(), 1);
}

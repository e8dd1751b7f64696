use super::*;

use std::fmt;

use tokio::time::Duration;

use crate::subscription::subscribe::Unsubscribeable;

#[derive(Debug)]
struct SourceFailed;

impl fmt::Display for SourceFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source failed")
    }
}

impl Error for SourceFailed {}

fn emit_range(end: i32) -> Observable<i32> {
    Observable::new(move |mut o: Subscriber<_>| {
        for i in 1..=end {
            o.next(i);
        }
        o.complete();
        Subscription::empty()
    })
}

fn collecting_subscriber<T: Send + 'static>() -> (Subscriber<T>, Arc<Mutex<Vec<T>>>, Arc<Mutex<bool>>) {
    let values = Arc::new(Mutex::new(Vec::new()));
    let values_c = Arc::clone(&values);
    let completed = Arc::new(Mutex::new(false));
    let completed_c = Arc::clone(&completed);

    let s = Subscriber::new(
        move |v| values_c.lock().unwrap().push(v),
        |e| panic!("unexpected error: {}", e),
        move || *completed_c.lock().unwrap() = true,
    );
    (s, values, completed)
}

#[test]
fn map_then_filter_keeps_even_squares() {
    let (s, values, completed) = collecting_subscriber();

    emit_range(10)
        .map(|v| v * v)
        .filter(|v| v % 2 == 0)
        .subscribe(s);

    assert_eq!(*values.lock().unwrap(), vec![4, 16, 36, 64, 100]);
    assert!(*completed.lock().unwrap(), "filter did not forward completion");
}

#[test]
fn observable_is_restartable() {
    let mut observable = emit_range(3).map(|v| v + 1);

    for _ in 0..3 {
        let (s, values, _) = collecting_subscriber();
        observable.subscribe(s);
        assert_eq!(*values.lock().unwrap(), vec![2, 3, 4]);
    }
}

#[test]
fn catch_and_substitute_turns_error_into_last_value() {
    let (s, values, completed) = collecting_subscriber();

    Observable::new(|mut o: Subscriber<String>| {
        o.next("a".to_string());
        o.error(Arc::new(SourceFailed));
        o.next("after error".to_string());
        Subscription::empty()
    })
    .catch_and_substitute(|e| format!("caught: {}", e))
    .subscribe(s);

    assert_eq!(
        *values.lock().unwrap(),
        vec!["a".to_string(), "caught: source failed".to_string()]
    );
    assert!(*completed.lock().unwrap());
}

#[test]
fn catch_and_substitute_passes_through_clean_completion() {
    let (s, values, completed) = collecting_subscriber();

    emit_range(2).catch_and_substitute(|_| -1).subscribe(s);

    assert_eq!(*values.lock().unwrap(), vec![1, 2]);
    assert!(*completed.lock().unwrap());
}

#[tokio::test(start_paused = true)]
async fn delayed_sequence_emits_in_order() {
    let (s, values, completed) = collecting_subscriber();

    let subscription = delayed_sequence(vec![1, 2, 3], Duration::from_millis(500)).subscribe(s);
    subscription.join().await.unwrap();

    assert_eq!(*values.lock().unwrap(), vec![1, 2, 3]);
    assert!(*completed.lock().unwrap());
}

#[tokio::test(start_paused = true)]
async fn unsubscribe_stops_task_producer() {
    let (s, values, completed) = collecting_subscriber();

    let mut subscription =
        delayed_sequence((1..=10).collect(), Duration::from_millis(500)).subscribe(s);
    let handle = subscription.take_handle();

    tokio::time::sleep(Duration::from_millis(1250)).await;
    subscription.unsubscribe();
    handle.join().await.unwrap();

    assert_eq!(*values.lock().unwrap(), vec![1, 2]);
    assert!(!*completed.lock().unwrap());
}

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use rxlab::subscribe::Subscriber;

/// Shared record of every signal delivered to the subscribers it hands out.
pub struct Emissions<T> {
    nexts: Arc<Mutex<Vec<T>>>,
    completes: Arc<Mutex<usize>>,
    errors: Arc<Mutex<Vec<String>>>,
}

impl<T: Clone + Send + 'static> Emissions<T> {
    pub fn new() -> Self {
        Emissions {
            nexts: Arc::new(Mutex::new(Vec::with_capacity(16))),
            completes: Arc::new(Mutex::new(0)),
            errors: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A subscriber that records into this `Emissions`.
    pub fn subscriber(&self) -> Subscriber<T> {
        let nexts_c = Arc::clone(&self.nexts);
        let errors_c = Arc::clone(&self.errors);
        let completes_c = Arc::clone(&self.completes);

        Subscriber::new(
            move |v| {
                // Track next() calls.
                nexts_c.lock().unwrap().push(v);
            },
            move |e| {
                // Track error() calls.
                errors_c.lock().unwrap().push(e.to_string());
            },
            move || {
                // Track complete() calls.
                *completes_c.lock().unwrap() += 1;
            },
        )
    }

    pub fn nexts(&self) -> Vec<T> {
        self.nexts.lock().unwrap().clone()
    }

    pub fn completes(&self) -> usize {
        *self.completes.lock().unwrap()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

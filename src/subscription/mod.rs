//! Provides structures and traits related to subscription management.
//!
//! This module includes `Subscriber` for handling observed values, errors and
//! completions, as well as `Subscription` for controlling subscriptions to
//! observables and subjects and for awaiting asynchronous sources.
pub mod subscribe;

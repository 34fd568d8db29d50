//! Shared test helpers for `slotbook-core` integration tests.
//!
//! These helpers provide an in-memory store that enforces the same tenant
//! predicates and uniqueness rules as the SQLite adapters, plus a clock
//! pinned to a known instant.

#![allow(dead_code)]

pub mod clock;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use slotbook_core::{BookingPorts, BookingService, BookingSettings};

pub use clock::FixedClock;
pub use store::InMemoryStore;

/// Wire a service over one shared store.
pub fn service_over(store: &InMemoryStore, clock: &FixedClock) -> BookingService {
    service_with_timeout(store, clock, Duration::from_secs(2))
}

pub fn service_with_timeout(
    store: &InMemoryStore,
    clock: &FixedClock,
    request_timeout: Duration,
) -> BookingService {
    let store = Arc::new(store.clone());
    BookingService::new(
        BookingPorts {
            tenants: store.clone(),
            services: store.clone(),
            working_hours: store.clone(),
            bookings: store.clone(),
            contacts: store.clone(),
            notifier: store,
            clock: Arc::new(clock.clone()),
        },
        BookingSettings { default_timezone: chrono_tz::America::Sao_Paulo, request_timeout },
    )
}

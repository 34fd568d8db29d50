//! Booking lifecycle domain

pub mod service;

pub use service::*;

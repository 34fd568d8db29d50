//! Domain types and models

pub mod booking;
pub mod contact;
pub mod notification;
pub mod schedule;
pub mod service;
pub mod tenant;

pub use booking::{
    Booking, BookingStatus, BookingTransition, Cancellation, CancellationActor, ClientInfo,
    CreateBookingRequest,
};
pub use contact::Contact;
pub use notification::{
    NotificationOutboxEntry, NotificationRequest, NotificationTemplate, OutboxStatus,
};
pub use schedule::{weekday_index, WorkWindow, WorkingHours};
pub use service::{LocationMode, Service};
pub use tenant::{Tenant, TenantContext, TenantId, TenantOwned};

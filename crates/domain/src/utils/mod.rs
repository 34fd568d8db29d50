//! Pure parsing helpers shared by the core and the API layer.

pub mod phone;
pub mod temporal;

pub use phone::normalize_phone;
pub use temporal::{
    is_canonical_time, minutes_to_time, normalize_date, normalize_time, parse_canonical_date,
    time_to_minutes, try_normalize_date,
};

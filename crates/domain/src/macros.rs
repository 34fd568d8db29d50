//! Macro for implementing Display and FromStr for persisted status enums
//!
//! Booking status, location mode, cancellation actor and outbox status are all
//! stored as lowercase text columns. This macro keeps their string mapping in
//! one place so the repositories and the API layer agree on spelling.
//!
//! # Example
//!
//! ```rust
//! use slotbook_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum DeliveryState {
//!     Queued,
//!     Delivered,
//! }
//!
//! impl_domain_status_conversions!(DeliveryState {
//!     Queued => "queued",
//!     Delivered => "delivered",
//! });
//!
//! assert_eq!(DeliveryState::Queued.to_string(), "queued");
//! assert_eq!("DELIVERED".parse::<DeliveryState>(), Ok(DeliveryState::Delivered));
//! ```

/// Implements Display and FromStr traits for status enums
///
/// - Display writes the canonical lowercase string
/// - FromStr parses case-insensitively and trims surrounding whitespace
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum SlotState {
        Open,
        Held,
        Taken,
    }

    impl_domain_status_conversions!(SlotState {
        Open => "open",
        Held => "held",
        Taken => "taken",
    });

    #[test]
    fn display_uses_canonical_lowercase() {
        assert_eq!(SlotState::Open.to_string(), "open");
        assert_eq!(SlotState::Held.to_string(), "held");
        assert_eq!(SlotState::Taken.to_string(), "taken");
    }

    #[test]
    fn parsing_ignores_case_and_padding() {
        assert_eq!(SlotState::from_str("TAKEN").unwrap(), SlotState::Taken);
        assert_eq!(SlotState::from_str("  Held ").unwrap(), SlotState::Held);
    }

    #[test]
    fn unknown_value_names_the_enum() {
        let err = SlotState::from_str("closed").unwrap_err();
        assert!(err.contains("Invalid SlotState: closed"));
        assert!(SlotState::from_str("").is_err());
    }
}

//! Client phone normalization.
//!
//! The phone number is the de-duplication key for contacts and for the chat
//! bot's "my bookings" lookups. Clients type it in many shapes
//! (`+55 (11) 98765-4321`, `5511987654321`), so only the digits are kept.

/// Strip everything but ASCII digits.
pub fn normalize_phone(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

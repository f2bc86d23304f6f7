//! Human-readable identifier minting.
//!
//! Identifiers look like `CL-08051301`: a two-letter kind tag, a fixed
//! series literal and the counter value zero-padded to at least two digits.
//! The numeric part keeps growing past two digits (sequence 123 renders as
//! `123`).

/// Counter namespaces, as stored in the `counters` table.
pub const CLIENT_COUNTER: &str = "clientId";
pub const ADMIN_COUNTER: &str = "adminId";
pub const APPOINTMENT_COUNTER: &str = "appointmentId";

const SERIES: &str = "080513";

pub fn client_id(seq: i64) -> String {
    format!("CL-{SERIES}{seq:02}")
}

pub fn admin_id(seq: i64) -> String {
    format!("AD-{SERIES}{seq:02}")
}

pub fn appointment_id(seq: i64) -> String {
    format!("AP-{SERIES}{seq:02}")
}

//! Flight code canonicalisation.
//!
//! Roster cells carry flight numbers such as `JT111` with an optional
//! operational suffix letter (`JT111A`, `JT111Z`). Suffixes mark variants of
//! the same flight, so comparisons run on the prefix plus digit run only.

use std::sync::OnceLock;

use regex::Regex;

fn flight_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Z]{2})([0-9]+)[A-Z]?").expect("flight code pattern compiles")
    })
}

fn flight_prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{2}[0-9]+").expect("flight prefix pattern compiles"))
}

fn full_flight_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Z]{2}[0-9]+[A-Z]?$").expect("full flight pattern compiles")
    })
}

/// Returns the canonical form of a flight code.
///
/// The input is trimmed and uppercased. When it starts with two letters and a
/// digit run the result is exactly that prefix; otherwise the cleaned input is
/// returned unchanged.
pub fn normalize(code: &str) -> String {
    let cleaned = code.trim().to_uppercase();
    match flight_pattern().captures(&cleaned) {
        Some(caps) => format!("{}{}", &caps[1], &caps[2]),
        None => cleaned,
    }
}

/// True when `token` begins with two letters followed by digits.
///
/// Expects an already uppercased token.
pub(crate) fn starts_like_flight(token: &str) -> bool {
    flight_prefix_pattern().is_match(token.trim())
}

/// True when the whole token is a single flight code, suffix letter allowed.
pub(crate) fn is_flight_code(token: &str) -> bool {
    full_flight_pattern().is_match(token)
}

/// Splits a duty string into its legs, trimming each one.
pub(crate) fn legs(value: &str) -> impl Iterator<Item = &str> {
    value.split('/').map(str::trim)
}

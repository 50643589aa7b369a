use regex::Regex;
use std::sync::OnceLock;

/// Kenyan mobile numbers as typed into the login form
fn kenyan_phone() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:\+254|0)[17]\d{8}$").expect("static regex"))
}

pub fn is_valid_phone(phone: &str) -> bool {
    kenyan_phone().is_match(phone.trim())
}

/// Convert an accepted phone to the stored `2547XXXXXXXX` form.
/// Callers validate first; this only keeps the subscriber digits.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.trim().chars().filter(|c| c.is_ascii_digit()).collect();
    let tail = &digits[digits.len().saturating_sub(9)..];
    format!("254{}", tail)
}

//! Casing helpers for synthesized identifiers

/// Convert to PascalCase.
///
/// `_`, `-`, `.` and spaces are dropped and capitalize the next letter; a
/// letter following a digit is capitalized; other punctuation is dropped.
/// Existing capitals inside a word are kept.
pub fn to_pascal_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = true;

    for c in s.trim().chars() {
        if c.is_ascii_alphabetic() {
            if capitalize_next {
                result.push(c.to_ascii_uppercase());
            } else {
                result.push(c);
            }
            capitalize_next = false;
        } else if c.is_ascii_digit() {
            result.push(c);
            capitalize_next = true;
        } else {
            capitalize_next = matches!(c, '_' | '-' | '.' | ' ');
        }
    }

    result
}

pub fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

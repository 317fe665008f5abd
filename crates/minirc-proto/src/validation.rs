//! Identifier validation.

/// Check if a character can start a nickname: a letter or one of the
/// specials `[ ] \ ` _ ^ { | }` (0x5B-0x60, 0x7B-0x7D).
#[inline]
pub fn is_valid_nick_first_char(c: char) -> bool {
    c.is_ascii_alphabetic() || is_nick_special_char(c)
}

/// Check if a character is valid after the first: letters, digits,
/// specials, or `-`.
#[inline]
pub fn is_valid_nick_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || is_nick_special_char(c) || c == '-'
}

#[inline]
fn is_nick_special_char(c: char) -> bool {
    let code = c as u32;
    (0x5B..=0x60).contains(&code) || (0x7B..=0x7D).contains(&code)
}

/// Validate a nickname against the grammar
/// `^[][\`_^{|}A-Za-z][][\`_^{|}A-Za-z0-9-]*$`.
pub fn is_valid_nickname(nick: &str) -> bool {
    let mut chars = nick.chars();
    match chars.next() {
        Some(first) if is_valid_nick_first_char(first) => chars.all(is_valid_nick_char),
        _ => false,
    }
}

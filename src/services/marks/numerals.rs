/// Replaces Arabic-Indic (`٠`..`٩`) and Extended Arabic-Indic (`۰`..`۹`) digits
/// with ASCII digits and trims the result.
pub(crate) fn normalize_digits(text: &str) -> String {
    text.chars().map(ascii_digit).collect::<String>().trim().to_string()
}

fn ascii_digit(ch: char) -> char {
    let offset = match ch {
        '\u{0660}'..='\u{0669}' => ch as u32 - 0x0660,
        '\u{06F0}'..='\u{06F9}' => ch as u32 - 0x06F0,
        _ => return ch,
    };
    char::from_digit(offset, 10).unwrap_or(ch)
}

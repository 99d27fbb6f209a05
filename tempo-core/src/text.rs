/// Uppercase the first character and leave the rest untouched.
///
/// Uppercasing is Unicode-aware, so a single character may expand
/// (`ß` becomes `SS`).
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

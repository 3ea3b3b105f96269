//! Display and resource name derivation

/// Derive a human display from a code
///
/// Words are split on any non-alphanumeric character and before every
/// upper-case letter that does not start a word; each word gets an upper-case
/// first letter.
/// A code without any alphanumeric character is returned unchanged.
///
/// ```
/// use codelist_core::naming::humanize;
///
/// assert_eq!(humanize("blood-pressure"), "Blood Pressure");
/// assert_eq!(humanize("bloodPressure"), "Blood Pressure");
/// assert_eq!(humanize("HIV"), "H I V");
/// ```
pub fn humanize(code: &str) -> String {
    let words = split_words(code);
    if words.is_empty() {
        return code.to_string();
    }

    words
        .iter()
        .map(|word| capitalize(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Convert a sheet name to a computer-friendly PascalCase resource name
///
/// `observation-status` -> `ObservationStatus`
pub fn pascal_case(name: &str) -> String {
    split_words(name).iter().map(|w| capitalize(w)).collect()
}

fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

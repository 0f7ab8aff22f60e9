use std::num::NonZeroUsize;

/// Splits `text` into consecutive windows of `max_words` whitespace-separated
/// words, each re-joined with single spaces. The last window holds whatever
/// is left over. Word order is preserved exactly; original spacing is not.
pub fn chunk_section_text(text: &str, max_words: NonZeroUsize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(max_words.get())
        .map(|window| window.join(" "))
        .collect()
}

/// Edits tolerated when looking for `target`: longer labels absorb more OCR
/// noise, and a label is never allowed to match with all of it replaced.
pub fn budget(target: usize) -> usize {
    let edits = match target {
        n if n >= 7 => 3,
        n if n >= 5 => 2,
        _ => 1,
    };
    edits.min(target.saturating_sub(1))
}

/// Levenshtein distance over chars.
pub fn distance(a: &[char], b: &[char]) -> usize {
    let mut row = (0..=b.len()).collect::<Vec<usize>>();
    for (i, ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

/// Whether `needle` occurs in `haystack` up to its edit budget.
///
/// Slides windows of the needle's length, give or take the budget, over the
/// haystack. Windows never shrink below two characters, so a single shared
/// character is not a match.
pub fn fuzzy_contains(haystack: &str, needle: &str) -> bool {
    let needle = needle.chars().collect::<Vec<char>>();
    let haystack = haystack.chars().collect::<Vec<char>>();
    if needle.is_empty() || haystack.is_empty() {
        return false;
    }
    let edits = budget(needle.len());
    let shortest = needle.len().saturating_sub(edits).max(2).min(needle.len());
    let longest = needle.len() + edits;
    (shortest..=longest)
        .filter(|width| *width <= haystack.len())
        .any(|width| {
            haystack
                .windows(width)
                .any(|window| distance(window, &needle) <= edits)
        })
}

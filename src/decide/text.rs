use crate::capability::Rect;
use crate::capability::Recognition;

/// Boxes whose tops differ by at most this many pixels share a row.
pub const ROW_TOLERANCE: i32 = 7;
/// Largest difference between the tops of two boxes that may merge.
pub const MERGE_ROW: i32 = 10;
/// Largest horizontal gap between two boxes that may merge.
pub const MERGE_GAP: i32 = 35;

/// Trims and drops whitespace and punctuation, ASCII and CJK alike.
/// Full-width ASCII forms are folded to their half-width counterparts.
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            c => c,
        })
        .filter(|c| !c.is_whitespace() && !is_punctuation(*c))
        .collect()
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '，' | '。' | '、' | '；' | '：' | '？' | '！' | '…' | '—' | '·' | '「' | '」' | '『' | '』'
                | '《' | '》' | '〈' | '〉' | '（' | '）' | '【' | '】' | '“' | '”' | '‘' | '’'
        )
}

/// Sorts boxes top to bottom, then left to right within a row.
pub fn reading_order(mut items: Vec<Recognition>) -> Vec<Recognition> {
    items.sort_by_key(|r| (r.rect.y0, r.rect.x0));
    let mut rows: Vec<Vec<Recognition>> = Vec::new();
    for item in items {
        match rows.last_mut() {
            Some(row) if item.rect.y0 - row[0].rect.y0 <= ROW_TOLERANCE => row.push(item),
            _ => rows.push(vec![item]),
        }
    }
    rows.into_iter()
        .flat_map(|mut row| {
            row.sort_by_key(|r| r.rect.x0);
            row
        })
        .collect()
}

/// Joins boxes that continue each other on the same line.
/// Expects reading order.
pub fn merge(items: Vec<Recognition>) -> Vec<Recognition> {
    let mut merged: Vec<Recognition> = Vec::with_capacity(items.len());
    for item in items {
        match merged.last_mut() {
            Some(last)
                if (item.rect.y0 - last.rect.y0).abs() <= MERGE_ROW
                    && item.rect.x0 - last.rect.x1 <= MERGE_GAP
                    && item.rect.x0 >= last.rect.x0 =>
            {
                last.text.push_str(&item.text);
                last.rect = Rect::new(
                    last.rect.x0.min(item.rect.x0),
                    last.rect.x1.max(item.rect.x1),
                    last.rect.y0.min(item.rect.y0),
                    last.rect.y1.max(item.rect.y1),
                );
                last.confidence = last.confidence.min(item.confidence);
            }
            _ => merged.push(item),
        }
    }
    merged
}

/// Reading order, merged, normalized, empties dropped.
pub fn tidy(items: Vec<Recognition>) -> Vec<Recognition> {
    merge(reading_order(items))
        .into_iter()
        .map(|mut r| {
            r.text = normalize(&r.text);
            r
        })
        .filter(|r| !r.text.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(text: &str, x0: i32, x1: i32, y0: i32) -> Recognition {
        Recognition::new(text, Rect::new(x0, x1, y0, y0 + 20), 0.9)
    }

    #[test]
    fn strips_punctuation_and_space() {
        assert_eq!(normalize("  命运的 「巡猎」！ "), "命运的巡猎");
        assert_eq!(normalize("Ｅｖｅｎｔ: 1"), "Event1");
        assert_eq!(normalize("..."), "");
    }

    #[test]
    fn rows_then_columns() {
        let items = vec![at("c", 10, 40, 60), at("b", 200, 240, 14), at("a", 10, 40, 10)];
        let texts = reading_order(items)
            .into_iter()
            .map(|r| r.text)
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn merges_split_words_only() {
        let items = vec![at("存护", 10, 50, 10), at("命途", 70, 110, 12), at("远处", 300, 340, 10)];
        let texts = merge(reading_order(items))
            .into_iter()
            .map(|r| r.text)
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["存护命途", "远处"]);
    }

    #[test]
    fn tidy_drops_empty_boxes() {
        let items = vec![at("，", 10, 20, 10), at("  ", 200, 220, 80)];
        assert!(tidy(items).is_empty());
    }
}

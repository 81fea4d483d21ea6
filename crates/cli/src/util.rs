use unicode_width::UnicodeWidthStr;

/// Widest a console column may grow before cells are truncated.
pub(crate) const MAX_COLUMN_WIDTH: usize = 32;

/// Display width of a string, accounting for CJK double-width, emoji, etc.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `width` display columns, adding ".." if truncated.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        return s
            .chars()
            .find(|ch| unicode_width::UnicodeWidthChar::width(*ch).unwrap_or(0) <= width)
            .map(String::from)
            .unwrap_or_default();
    }

    let budget = width - 2;
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push_str("..");
    out
}

/// Pad (or truncate) to exactly `width` display columns, text to the left.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let t = truncate_display(s, width);
    let pad = width.saturating_sub(display_width(&t));
    format!("{}{}", t, " ".repeat(pad))
}

/// Pad (or truncate) to exactly `width` display columns, text to the right.
pub(crate) fn pad_left(s: &str, width: usize) -> String {
    let t = truncate_display(s, width);
    let pad = width.saturating_sub(display_width(&t));
    format!("{}{}", " ".repeat(pad), t)
}

/// Column alignment for [`render_grid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Right,
}

/// Render a header row, a rule, and body rows as aligned plain text.
pub(crate) fn render_grid(headers: &[String], align: &[Align], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(display_width(cell));
            }
        }
    }
    for w in &mut widths {
        *w = (*w).min(MAX_COLUMN_WIDTH);
    }

    let line = |cells: &[String]| -> String {
        let parts: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                match align.get(i).copied().unwrap_or(Align::Left) {
                    Align::Left => pad_right(cell, w),
                    Align::Right => pad_left(cell, w),
                }
            })
            .collect();
        parts.join("  ").trim_end().to_string()
    };

    let mut out = line(headers);
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_width_cjk() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(display_width("世界"), 4);
    }

    #[test]
    fn truncate_cuts() {
        assert_eq!(truncate_display("abc", 3), "abc");
        assert_eq!(truncate_display("abcdef", 5), "abc..");
        assert_eq!(truncate_display("abc", 2), "a");
        assert_eq!(truncate_display("", 0), "");
    }

    #[test]
    fn truncate_cjk_boundary() {
        let t = truncate_display("世界你好", 6);
        assert_eq!(t, "世界..");
        assert!(display_width(&t) <= 6);
    }

    #[test]
    fn pads_both_ways() {
        assert_eq!(pad_right("ab", 5), "ab   ");
        assert_eq!(pad_left("ab", 5), "   ab");
        assert_eq!(pad_left("地区", 5), " 地区");
        assert_eq!(pad_right("abcdef", 5), "abc..");
    }

    #[test]
    fn grid_aligns_cjk() {
        let headers = vec!["指标".to_string(), "A".to_string()];
        let rows = vec![
            vec!["收入".to_string(), "1".to_string()],
            vec!["x".to_string(), "100".to_string()],
        ];
        let out = render_grid(&headers, &[Align::Left, Align::Right], &rows);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "指标    A");
        assert_eq!(lines[1], "----  ---");
        assert_eq!(lines[2], "收入    1");
        assert_eq!(lines[3], "x     100");
    }

    proptest::proptest! {
        #[test]
        fn truncate_never_exceeds_width(s in "[a-z地区指标 ]{0,40}", width in 0usize..20) {
            let t = truncate_display(&s, width);
            proptest::prop_assert!(display_width(&t) <= width);
        }
    }
}

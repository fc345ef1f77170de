//! Plain-text rendering of a table page.

use flock_table::prelude::*;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Gap between columns.
const GAP: &str = "  ";

/// Renders the current page with a header row and a footer line.
///
/// Each column is as wide as its widest cell, capped at `max_width`.
#[must_use]
pub fn render_page<T>(table: &Table<T>, max_width: usize) -> String {
    let columns = table.visible_columns();
    let rows = table.rows();
    let (headers, cells) = render_cells(&rows, &columns);

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            cells
                .iter()
                .map(|row| row[i].width())
                .chain(std::iter::once(header.width()))
                .max()
                .unwrap_or(0)
                .min(max_width)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 3);
    lines.push(render_line(&headers, &widths));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join(GAP),
    );
    if cells.is_empty() {
        lines.push("(no matching rows)".to_string());
    }
    for row in &cells {
        lines.push(render_line(row, &widths));
    }
    lines.push(footer(table));
    lines.join("\n")
}

fn render_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| pad(&truncate_string(cell, width), width))
        .collect();
    padded.join(GAP).trim_end().to_string()
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{s}{}", " ".repeat(fill))
}

/// Describes the page position and row counts.
#[must_use]
pub fn footer<T>(table: &Table<T>) -> String {
    let count = table.row_count();
    let mut line = format!(
        "page {}/{}, {} of {} rows",
        table.page_index() + 1,
        table.page_count(),
        count.filtered,
        count.total
    );
    if let Some(sort) = table.state().active_sort() {
        line.push_str(&format!(", sorted by {} {}", sort.key, sort.direction));
    }
    line
}

/// Truncates a string to the given display width, adding an ellipsis if needed.
fn truncate_string(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Hymn {
        number: u32,
        title: &'static str,
    }

    fn table(page_size: usize) -> Table<Hymn> {
        let columns = vec![
            Column::new("number", "No.", |h: &Hymn| h.number.into()),
            Column::new("title", "Title", |h: &Hymn| h.title.into()),
        ];
        let rows = vec![
            Hymn { number: 1, title: "Holy, Holy, Holy" },
            Hymn { number: 2, title: "Amazing Grace" },
            Hymn { number: 3, title: "Be Thou My Vision" },
        ];
        let options = TableOptions::new()
            .page_size_options(vec![2, 10])
            .page_size(page_size)
            .strictness(Strictness::Strict);
        Table::configure(columns, rows, options).expect("table")
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello w…");
        assert_eq!(truncate_string("hello", 0), "");
        // Wide characters count double
        assert_eq!(truncate_string("日本語テキスト", 5), "日本…");
    }

    #[test]
    fn test_render_page_layout() {
        let t = table(2);
        let out = render_page(&t, 10);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "No.  Title");
        assert_eq!(lines[1], "---  ----------");
        assert_eq!(lines[2], "1    Holy, Hol…");
        assert_eq!(lines[3], "2    Amazing G…");
        assert_eq!(lines[4], "page 1/2, 3 of 3 rows");
    }

    #[test]
    fn test_render_empty_page() {
        let mut t = table(10);
        t.set_global_filter("nothing like this");
        let out = render_page(&t, 20);
        assert!(out.contains("(no matching rows)"));
        assert!(out.ends_with("page 1/1, 0 of 3 rows"));
    }

    #[test]
    fn test_footer_mentions_sort() {
        let mut t = table(10);
        t.set_sort("title", Some(SortDirection::Desc)).expect("sort");
        assert_eq!(footer(&t), "page 1/1, 3 of 3 rows, sorted by title desc");
    }
}

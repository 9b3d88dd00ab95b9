//! Grid-style table rendering for log previews
//!
//! Produces the `+---+` / `+===+` grid layout commonly used for console
//! previews of tabular data. Numeric cells are right-aligned, text cells
//! left-aligned, and long cells are truncated.

use std::fmt::Write;

use crate::model::{EnrichedRecord, VideoRecord, ENRICHED_COLUMNS, VIDEO_COLUMNS};

/// Number of rows shown by stage previews
pub const PREVIEW_ROWS: usize = 5;

const MAX_CELL_WIDTH: usize = 40;

/// A record that can be shown as a table row
pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

impl TableRow for VideoRecord {
    fn headers() -> &'static [&'static str] {
        &VIDEO_COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.video_id.clone(),
            self.trending_date.clone(),
            self.title.clone(),
            self.channel_title.clone(),
            self.category_id.to_string(),
            self.publish_time.clone(),
            self.views.to_string(),
            self.likes.to_string(),
            self.dislikes.to_string(),
            self.comment_count.to_string(),
        ]
    }
}

impl TableRow for EnrichedRecord {
    fn headers() -> &'static [&'static str] {
        &ENRICHED_COLUMNS
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.video_id.clone(),
            self.trending_date.clone(),
            self.title.clone(),
            self.channel_title.clone(),
            self.category_id.to_string(),
            self.publish_time.clone(),
            self.views.to_string(),
            self.likes.to_string(),
            self.dislikes.to_string(),
            self.comment_count.to_string(),
            self.category_name.clone().unwrap_or_default(),
        ]
    }
}

/// Render the first [`PREVIEW_ROWS`] records as a grid
pub fn preview<T: TableRow>(records: &[T]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .take(PREVIEW_ROWS)
        .map(TableRow::cells)
        .collect();
    format_grid(T::headers(), &rows)
}

/// Render headers and rows as a grid table
pub fn format_grid<H: AsRef<str>>(headers: &[H], rows: &[Vec<String>]) -> String {
    let headers: Vec<String> = headers.iter().map(|h| truncate(h.as_ref())).collect();
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|c| truncate(c)).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let numeric: Vec<bool> = (0..widths.len())
        .map(|i| {
            !rows.is_empty()
                && rows
                    .iter()
                    .all(|row| row.get(i).map_or(true, |c| c.is_empty() || is_number(c)))
        })
        .collect();

    let mut out = String::new();
    write_border(&mut out, &widths, '-');
    write_row(&mut out, &headers, &widths, &vec![false; widths.len()]);
    write_border(&mut out, &widths, '=');
    for row in &rows {
        write_row(&mut out, row, &widths, &numeric);
        write_border(&mut out, &widths, '-');
    }
    if rows.is_empty() {
        write_border(&mut out, &widths, '-');
    }
    out.truncate(out.trim_end().len());
    out
}

fn write_border(out: &mut String, widths: &[usize], fill: char) {
    out.push('+');
    for w in widths {
        let _ = write!(out, "{}+", fill.to_string().repeat(w + 2));
    }
    out.push('\n');
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize], right_align: &[bool]) {
    out.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(String::as_str).unwrap_or("");
        let _ = if right_align[i] {
            write!(out, " {:>width$} |", cell, width = w)
        } else {
            write!(out, " {:<width$} |", cell, width = w)
        };
    }
    out.push('\n');
}

fn truncate(cell: &str) -> String {
    let flat = cell.replace(['\n', '\r'], " ");
    if flat.chars().count() <= MAX_CELL_WIDTH {
        flat
    } else {
        let mut s: String = flat.chars().take(MAX_CELL_WIDTH - 3).collect();
        s.push_str("...");
        s
    }
}

fn is_number(cell: &str) -> bool {
    cell.parse::<f64>().is_ok()
}

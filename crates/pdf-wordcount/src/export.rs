//! CSV rendering of ranked rows.

use crate::aggregate::WordCountRow;

pub const CSV_HEADER: &str = "Word Variants,Count";
const CSV_SUFFIX: &str = "_word_count.csv";
const FALLBACK_STEM: &str = "document";

/// Header plus one line per row, separated by `\n`, without a trailing newline.
pub fn to_csv(rows: &[WordCountRow]) -> String {
    let mut out = String::from(CSV_HEADER);
    for row in rows {
        out.push('\n');
        out.push_str(&csv_escape(&row.variants));
        out.push(',');
        out.push_str(&row.count.to_string());
    }
    out
}

/// `report.pdf` becomes `report_word_count.csv`. Client-side directories are dropped.
pub fn csv_file_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let stem = match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    };
    let stem = if stem.trim().is_empty() {
        FALLBACK_STEM
    } else {
        stem
    };
    format!("{stem}{CSV_SUFFIX}")
}

fn csv_escape(s: &str) -> String {
    if s.contains('"') || s.contains(',') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

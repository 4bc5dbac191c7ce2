use sysdoc_core::models::{EntityKind, EntityRef};

use crate::normalize::{column_name, normalize_table_name};
use crate::patterns::{RE_CREATE_TABLE, RE_SEPARATOR_ROW, RE_TABLE_CAPTION, RE_TABLE_HEADING};

/// Header cells that mark the column holding column names.
const COLUMN_HEADERS: [&str; 6] = [
    "column",
    "field",
    "欄位",
    "column name",
    "field name",
    "欄位名稱",
];

/// Leading words of DDL lines that define constraints, not columns.
const CONSTRAINT_KEYWORDS: [&str; 8] = [
    "PRIMARY",
    "CONSTRAINT",
    "FOREIGN",
    "UNIQUE",
    "INDEX",
    "KEY",
    "CHECK",
    "FULLTEXT",
];

/// Table name and column definitions of a table chunk.
///
/// The name comes from a `Table: x` caption, else from the immediate heading
/// when it is a lone identifier. Columns need a known table and a header
/// cell literally naming the column column.
pub(crate) fn extract_table(text: &str, heading: Option<&str>, out: &mut Vec<EntityRef>) {
    let Some((table, raw_table)) = resolve_table_name(text, heading) else {
        return;
    };
    out.push(EntityRef::new(EntityKind::TableName, table.clone(), raw_table));

    let mut rows = text
        .lines()
        .filter(|line| !is_caption(line) && !is_separator(line))
        .filter_map(split_row);
    let Some(header) = rows.next() else {
        return;
    };
    let Some(column_index) = header
        .iter()
        .position(|cell| COLUMN_HEADERS.contains(&cell.to_lowercase().as_str()))
    else {
        return;
    };

    for row in rows {
        let Some(cell) = row.get(column_index) else {
            continue;
        };
        if let Some(canonical) = column_name(&table, cell) {
            out.push(EntityRef::new(EntityKind::Column, canonical, *cell));
        }
    }
}

/// `CREATE TABLE` statements inside code blocks.
pub(crate) fn extract_ddl(text: &str, out: &mut Vec<EntityRef>) {
    let Some(re) = RE_CREATE_TABLE.as_ref() else {
        return;
    };
    for caps in re.captures_iter(text) {
        let (Some(name), Some(body)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let table = normalize_table_name(name.as_str());
        if table.is_empty() {
            continue;
        }
        out.push(EntityRef::new(EntityKind::TableName, table.clone(), name.as_str()));

        for definition in split_top_level(body.as_str()) {
            let Some(first) = definition.split_whitespace().next() else {
                continue;
            };
            let raw = first.trim_matches(|c| matches!(c, '`' | '"' | '\'' | '[' | ']'));
            let starts_like_identifier = raw
                .chars()
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_');
            if !starts_like_identifier
                || CONSTRAINT_KEYWORDS.contains(&raw.to_ascii_uppercase().as_str())
            {
                continue;
            }
            if let Some(canonical) = column_name(&table, raw) {
                out.push(EntityRef::new(EntityKind::Column, canonical, raw));
            }
        }
    }
}

fn resolve_table_name<'a>(text: &'a str, heading: Option<&'a str>) -> Option<(String, &'a str)> {
    let from_caption = RE_TABLE_CAPTION
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());
    let from_heading = || {
        let heading = heading?;
        RE_TABLE_HEADING
            .as_ref()
            .and_then(|re| re.captures(heading))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    };
    let raw = from_caption.or_else(from_heading)?;
    let name = normalize_table_name(raw);
    (!name.is_empty()).then_some((name, raw))
}

fn is_caption(line: &str) -> bool {
    RE_TABLE_CAPTION
        .as_ref()
        .map(|re| re.is_match(line))
        .unwrap_or(false)
}

fn is_separator(line: &str) -> bool {
    RE_SEPARATOR_ROW
        .as_ref()
        .map(|re| re.is_match(line))
        .unwrap_or(false)
}

/// Cells of a pipe- or tab-delimited row. Border pipes yield no cells.
fn split_row(line: &str) -> Option<Vec<&str>> {
    let mut cells: Vec<&str> = if line.contains('|') {
        line.split('|').map(str::trim).collect()
    } else if line.contains('\t') {
        line.split('\t').map(str::trim).collect()
    } else {
        return None;
    };
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    (!cells.is_empty()).then_some(cells)
}

/// Split on commas that are not nested inside parentheses.
fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(body[start..idx].trim());
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(body[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}

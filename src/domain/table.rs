//! Column sorting for orchestrator listing output
//!
//! `docker ... ls` prints fixed-width columns: each column starts where its
//! header starts. Header names are separated by two or more spaces (single
//! spaces occur inside names such as `MANAGER STATUS`), while data cells may be
//! empty, so rows are sliced at the header offsets rather than split.

use std::str::FromStr;
use std::sync::OnceLock;

use itertools::Itertools;
use regex::Regex;

use crate::domain::DomainError;

/// Column used to order listing rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortColumn {
    /// 1-based column number
    Index(usize),
    /// Header name, matched case-insensitively
    Header(String),
}

impl Default for SortColumn {
    fn default() -> Self {
        SortColumn::Index(2)
    }
}

impl FromStr for SortColumn {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::InvalidSortColumn {
                column: s.to_string(),
                reason: "empty".into(),
            });
        }
        match s.parse::<usize>() {
            Ok(0) => Err(DomainError::InvalidSortColumn {
                column: s.to_string(),
                reason: "columns are numbered from 1".into(),
            }),
            Ok(n) => Ok(SortColumn::Index(n)),
            Err(_) => Ok(SortColumn::Header(s.to_string())),
        }
    }
}

fn header_cell() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\S+(?: \S+)*").expect("valid regex"))
}

/// Column layout taken from a header row: `(name, start)`, start in chars.
fn columns(header: &str) -> Vec<(&str, usize)> {
    header_cell()
        .find_iter(header)
        .map(|m| (m.as_str(), header[..m.start()].chars().count()))
        .collect()
}

/// Trimmed cell of `line` spanning chars `start..end` (`None`: to end of line).
fn cell(line: &str, start: usize, end: Option<usize>) -> String {
    let chars = line.chars().skip(start);
    let cell: String = match end {
        Some(end) => chars.take(end.saturating_sub(start)).collect(),
        None => chars.collect(),
    };
    cell.trim().to_string()
}

/// Sort the data rows of a listing by `column`, keeping the header first.
///
/// Rows lacking the column sort as empty. The sort is stable.
pub fn sort_table(output: &str, column: &SortColumn) -> Result<String, DomainError> {
    let mut lines = output.lines().filter(|l| !l.trim().is_empty());
    let Some(header) = lines.next() else {
        return Ok(String::new());
    };

    let layout = columns(header);
    let index = match column {
        SortColumn::Index(n) => n - 1,
        SortColumn::Header(name) => layout
            .iter()
            .position(|(h, _)| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| DomainError::InvalidSortColumn {
                column: name.clone(),
                reason: format!("no such header in: {}", header.trim()),
            })?,
    };
    let span = layout
        .get(index)
        .map(|&(_, start)| (start, layout.get(index + 1).map(|&(_, next)| next)));

    let rows = lines
        .map(|line| {
            let key = span
                .map(|(start, end)| cell(line, start, end))
                .unwrap_or_default();
            (key, line)
        })
        .sorted_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, line)| line);

    let mut out = String::from(header);
    out.push('\n');
    for row in rows {
        out.push_str(row);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NODES: &str = "\
ID                            HOSTNAME   STATUS    AVAILABILITY   MANAGER STATUS   ENGINE VERSION
k2x9 *                        zeta       Ready     Active         Leader           24.0.5
a7b1                          alpha      Ready     Active                          27.0.0
m3c4                          mu         Down      Drain                           25.0.1
";

    fn hosts(sorted: &str) -> Vec<String> {
        sorted
            .lines()
            .skip(1)
            .map(|l| cell(l, 30, Some(41)))
            .collect()
    }

    #[test]
    fn given_default_column_when_sort_then_orders_by_second_column() {
        let sorted = sort_table(NODES, &SortColumn::default()).unwrap();
        assert_eq!(hosts(&sorted), vec!["alpha", "mu", "zeta"]);
        assert!(sorted.starts_with("ID "));
    }

    #[test]
    fn given_header_name_with_space_when_sort_then_matches_header() {
        let sorted = sort_table(NODES, &"status".parse().unwrap()).unwrap();
        let first = sorted.lines().nth(1).unwrap();
        assert!(first.contains("mu"), "Down sorts before Ready: {first}");
    }

    #[test]
    fn given_worker_rows_with_empty_cell_when_sort_later_column_then_uses_own_cell() {
        let sorted = sort_table(NODES, &"engine version".parse().unwrap()).unwrap();
        assert_eq!(hosts(&sorted), vec!["zeta", "mu", "alpha"]);
    }

    #[test]
    fn given_empty_cells_when_sort_by_that_column_then_sort_first() {
        let sorted = sort_table(NODES, &"MANAGER STATUS".parse().unwrap()).unwrap();
        assert_eq!(hosts(&sorted), vec!["alpha", "mu", "zeta"]);
    }

    #[test]
    fn given_column_beyond_header_when_sort_then_order_kept() {
        let sorted = sort_table(NODES, &SortColumn::Index(9)).unwrap();
        assert_eq!(hosts(&sorted), vec!["zeta", "alpha", "mu"]);
    }

    #[test]
    fn given_unknown_header_when_sort_then_error() {
        let err = sort_table(NODES, &SortColumn::Header("uptime".into())).unwrap_err();
        assert!(matches!(err, DomainError::InvalidSortColumn { .. }));
    }

    #[test]
    fn given_zero_when_parse_sort_column_then_error() {
        assert!("0".parse::<SortColumn>().is_err());
        assert_eq!("3".parse::<SortColumn>().unwrap(), SortColumn::Index(3));
    }

    #[test]
    fn given_empty_output_when_sort_then_empty() {
        assert_eq!(sort_table("", &SortColumn::default()).unwrap(), "");
    }
}

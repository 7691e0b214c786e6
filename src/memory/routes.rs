//! Parser for the route contract table in `routes.md`.
//!
//! The table starts at a header row mentioning both `| Route` and `| Method`
//! and ends at the first line that does not start with `|`. Separator rows
//! and rows with fewer than four non-empty cells are ignored.

use serde::{Deserialize, Serialize};

/// One documented route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub route: String,
    pub method: String,
    pub auth: String,
    pub description: String,
    pub status: String,
}

impl RouteEntry {
    /// `"METHOD /path"`, as shown in memory summaries.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.route)
    }
}

/// Extract route rows from a markdown document.
pub fn parse_routes_table(markdown: &str) -> Vec<RouteEntry> {
    let mut routes = Vec::new();
    let mut in_table = false;

    for line in markdown.lines() {
        if line.contains("| Route") && line.contains("| Method") {
            in_table = true;
            continue;
        }
        if !in_table {
            continue;
        }
        if !line.starts_with('|') {
            in_table = false;
            continue;
        }
        if is_separator_row(line) {
            continue;
        }

        let cells: Vec<&str> = line
            .split('|')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        if cells.len() < 4 {
            continue;
        }

        routes.push(RouteEntry {
            route: cells[0].to_string(),
            method: cells[1].to_string(),
            auth: cells[2].to_string(),
            description: cells[3].to_string(),
            status: cells.get(4).copied().unwrap_or("active").to_string(),
        });
    }

    routes
}

/// `|---|---|` or `| :--- | ---: |`: every cell is dashes and colons only.
fn is_separator_row(line: &str) -> bool {
    if line.starts_with("|---") {
        return true;
    }
    let mut cells = line
        .split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .peekable();
    cells.peek().is_some() && cells.all(|c| c.chars().all(|ch| ch == '-' || ch == ':'))
}

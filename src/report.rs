//! Human-readable plan reports
//!
//! Tables are drawn in a borderless style: a rule of `=` above and below
//! the header and under the last row, columns padded to their widest cell.

use serde_json::{Map, Value};

use crate::project::ProjectResult;
use crate::rewrite::ReviewItem;

/// One table row: source file, `start:end` lines and a description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub file: String,
    pub lines: String,
    pub details: String,
}

impl Row {
    fn cells(&self) -> [&str; 3] {
        [&self.file, &self.lines, &self.details]
    }
}

const HEADERS: [&str; 3] = ["File", "Lines", "Details"];

/// Decisions of the plan, split into (safe, risky)
pub fn decision_rows(result: &ProjectResult) -> (Vec<Row>, Vec<Row>) {
    let mut safe = Vec::new();
    let mut risky = Vec::new();
    for (file, decision) in result.decisions() {
        let row = Row {
            file: file.path.clone(),
            lines: format!("{}:{}", decision.span.start_line, decision.span.end_line),
            details: format!("{} -> {}", decision.summary, decision.target),
        };
        if decision.risky {
            risky.push(row);
        } else {
            safe.push(row);
        }
    }
    (safe, risky)
}

pub fn error_rows(result: &ProjectResult) -> Vec<Row> {
    result
        .files
        .iter()
        .flat_map(|file| {
            file.errors.iter().map(|error| Row {
                file: file.path.clone(),
                lines: error
                    .span
                    .map(|span| format!("{}:{}", span.start_line, span.end_line))
                    .unwrap_or_default(),
                details: error.message.clone(),
            })
        })
        .collect()
}

pub fn review_rows(items: &[ReviewItem]) -> Vec<Row> {
    items
        .iter()
        .map(|item| Row {
            file: item.path.clone().unwrap_or_default(),
            lines: format!("{}:{}", item.line, item.line),
            details: format!("{} may need {}", item.text, item.suggestion),
        })
        .collect()
}

pub fn render_table(rows: &[Row]) -> String {
    let mut widths = HEADERS.map(str::len);
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule = widths.iter().map(|w| "=".repeat(w + 2)).collect::<Vec<_>>().join(" ");
    let line = |cells: [&str; 3]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!(" {cell:<width$} "))
            .collect();
        format!(" {}", padded.join(" ")).trim_end().to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 4);
    out.push(format!(" {rule}"));
    out.push(line(HEADERS));
    out.push(format!(" {rule}"));
    for row in rows {
        out.push(line(row.cells()));
    }
    out.push(format!(" {rule}"));
    out.join("\n") + "\n"
}

/// The full inspection report: decisions, risky decisions, then errors
pub fn render_plan(result: &ProjectResult) -> String {
    let (safe, risky) = decision_rows(result);
    let mut out = render_table(&safe);
    out.push_str("Risky conversions\n");
    if !risky.is_empty() {
        out.push_str(&render_table(&risky));
    }
    let errors = error_rows(result);
    if !errors.is_empty() {
        out.push_str("Errors\n");
        out.push_str(&render_table(&errors));
    }
    out
}

/// Old name → new name of every exclusive decision
pub fn names_changed(result: &ProjectResult) -> Value {
    let mut map = Map::new();
    for (_, decision) in result.decisions().filter(|(_, d)| d.exclusive) {
        for component in &decision.components {
            map.insert(
                component.original.to_string(),
                Value::String(component.new.to_string()),
            );
        }
    }
    Value::Object(map)
}

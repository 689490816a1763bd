use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// One table row. Marked rows get a `*` gutter.
pub struct Row {
    pub cells: Vec<String>,
    pub marked: bool,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self {
            cells,
            marked: false,
        }
    }

    pub fn marked(mut self, marked: bool) -> Self {
        self.marked = marked;
        self
    }
}

/// Render `rows` under `headers`, preceded by `title` when given. The gutter
/// column only appears when some row is marked.
pub fn print_table(title: Option<&str>, headers: &[&str], rows: &[Row]) {
    if let Some(title) = title {
        println!("{title}");
        println!();
    }
    for line in render_table(headers, rows) {
        println!("{line}");
    }
}

fn render_table(headers: &[&str], rows: &[Row]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.cells.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let gutter = rows.iter().any(|r| r.marked);
    let line = |mark: &str, cells: Vec<String>| {
        let body = cells.join("  ");
        let text = if gutter { format!("{mark} {body}") } else { body };
        text.trim_end().to_string()
    };
    let pad = |i: usize, cell: &str| {
        let w = widths.get(i).copied().unwrap_or(0);
        format!("{:width$}", cell, width = w)
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(
        " ",
        headers.iter().enumerate().map(|(i, h)| pad(i, h)).collect(),
    ));
    out.push(line(" ", widths.iter().map(|&w| "-".repeat(w)).collect()));
    for row in rows {
        out.push(line(
            if row.marked { "*" } else { " " },
            row.cells.iter().enumerate().map(|(i, c)| pad(i, c)).collect(),
        ));
    }
    out
}

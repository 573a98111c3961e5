/// Boxed plain-text table for log output.
///
/// Headers are upper-cased. Cells may span several lines; every cell is
/// padded to the widest line in its column. Nothing is truncated.
#[derive(Debug, Default)]
pub struct TextTable {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<I, S>(header: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            header: header.into_iter().map(|h| h.as_ref().to_uppercase()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = row.into_iter().map(Into::into).collect();
        row.resize(self.header.len(), String::new());
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self) -> String {
        let widths = self.column_widths();
        let rule = rule_line(&widths);

        let mut out = String::new();
        out.push_str(&rule);
        push_row_lines(&mut out, &self.header, &widths);
        out.push_str(&rule);
        for row in &self.rows {
            push_row_lines(&mut out, row, &widths);
        }
        if !self.rows.is_empty() {
            out.push_str(&rule);
        }
        // No trailing newline; callers place the table themselves.
        out.pop();
        out
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.header.iter().map(|h| display_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let w = cell.lines().map(display_width).max().unwrap_or(0);
                widths[i] = widths[i].max(w);
            }
        }
        widths
    }
}

fn display_width(s: &str) -> usize {
    s.chars().count()
}

fn rule_line(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for w in widths {
        line.push_str(&"-".repeat(w + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn push_row_lines(out: &mut String, cells: &[String], widths: &[usize]) {
    let split: Vec<Vec<&str>> = cells.iter().map(|c| c.lines().collect()).collect();
    let height = split.iter().map(Vec::len).max().unwrap_or(0).max(1);

    for line_no in 0..height {
        out.push('|');
        for (i, w) in widths.iter().enumerate() {
            let text = split[i].get(line_no).copied().unwrap_or("");
            out.push(' ');
            out.push_str(text);
            out.push_str(&" ".repeat(w - display_width(text)));
            out.push_str(" |");
        }
        out.push('\n');
    }
}

use shared::domain::{Column, Record, Sentiment, SortDirection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Link { href: String, label: String },
    Count(Option<i64>),
    Sentiment(Sentiment),
}

impl Cell {
    pub fn for_column(record: &Record, column: Column) -> Cell {
        match column {
            Column::Company => Cell::Text(record.company.clone()),
            Column::Website => Cell::Link {
                href: record.link_target(),
                label: record.website.clone(),
            },
            Column::NewsSentiment => Cell::Sentiment(record.sentiment()),
            count => Cell::Count(record.count(count)),
        }
    }

    pub fn text(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Link { label, .. } => label.clone(),
            Cell::Count(Some(n)) => n.to_string(),
            Cell::Count(None) => String::new(),
            Cell::Sentiment(sentiment) => sentiment.label().to_string(),
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            Cell::Text(text) => format!("<td>{}</td>", html_escape(text)),
            Cell::Link { href, label } => format!(
                r#"<td><a href="{}" target="_blank">{}</a></td>"#,
                html_escape(href),
                html_escape(label)
            ),
            Cell::Count(_) => format!(r#"<td class="number">{}</td>"#, self.text()),
            Cell::Sentiment(sentiment) => format!(
                r#"<td class="sentiment"><span class="{}">{}</span></td>"#,
                sentiment.css_class(),
                sentiment.label()
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<Cell>,
}

impl TableRow {
    pub fn from_record(record: &Record) -> Self {
        Self {
            cells: Column::ALL
                .into_iter()
                .map(|column| Cell::for_column(record, column))
                .collect(),
        }
    }

    pub fn cell(&self, column: Column) -> Option<&Cell> {
        let idx = Column::ALL.iter().position(|c| *c == column)?;
        self.cells.get(idx)
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from("<tr>");
        for cell in &self.cells {
            html.push_str(&cell.to_html());
        }
        html.push_str("</tr>");
        html
    }
}

/// The rendered rows of the table. Rebuilt wholesale on every render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableBody {
    rows: Vec<TableRow>,
}

impl TableBody {
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn push(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(self.rows.len() * 256);
        for row in &self.rows {
            html.push_str(&row.to_html());
            html.push('\n');
        }
        html
    }

    /// Fixed-width text grid with a header line, for terminals.
    pub fn to_text(&self) -> String {
        let grid: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.cells.iter().map(Cell::text).collect())
            .collect();

        let mut widths: Vec<usize> = Column::ALL.iter().map(|c| c.title().len()).collect();
        for line in &grid {
            for (width, text) in widths.iter_mut().zip(line) {
                *width = (*width).max(text.chars().count());
            }
        }

        let mut out = String::new();
        let header: Vec<String> = Column::ALL.iter().map(|c| c.title().to_string()).collect();
        push_text_line(&mut out, &header, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_text_line(&mut out, &rule, &widths);
        for line in &grid {
            push_text_line(&mut out, line, &widths);
        }
        out
    }
}

fn push_text_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(text, &width)| format!("{text:<width$}"))
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}

/// Header row whose links request the next direction for each column.
pub fn header_row_html(active: Option<(Column, SortDirection)>) -> String {
    let mut html = String::from("<tr>");
    for column in Column::ALL {
        let current = active.filter(|(c, _)| *c == column).map(|(_, d)| d);
        let next = SortDirection::toggled(current);
        let marker = match current {
            Some(SortDirection::Asc) => " ▲",
            Some(SortDirection::Desc) => " ▼",
            None => "",
        };
        html.push_str(&format!(
            r#"<th><a href="/?sort={column}&amp;dir={next}">{}{marker}</a></th>"#,
            column.title()
        ));
    }
    html.push_str("</tr>");
    html
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

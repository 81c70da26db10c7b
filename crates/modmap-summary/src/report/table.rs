//! 固定幅のプレーンテキスト表

/// 表のセル
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    /// 表の `float_precision` 桁で表示する
    Float(f64),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn na() -> Self {
        Cell::text("N/A")
    }

    /// 整数値の f64 は整数として扱う（混同行列用）
    pub fn number(v: f64) -> Self {
        if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            Cell::Int(v as i64)
        } else {
            Cell::Float(v)
        }
    }

    fn is_numeric(&self) -> bool {
        !matches!(self, Cell::Text(_))
    }

    fn render(&self, precision: usize) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) => format!("{v:.precision$}"),
        }
    }
}

/// 列ごとに幅を揃えた表。
///
/// 全セルが数値の列は右寄せ、それ以外は左寄せ。列間は空白2つ。
/// ヘッダ無しの場合は上下を罫線で囲む。
#[derive(Clone, Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
    float_precision: usize,
}

impl Table {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            float_precision: 2,
        }
    }

    pub fn without_headers() -> Self {
        Self::new(Vec::<String>::new())
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).chain(std::iter::once(self.headers.len())).max().unwrap_or(0)
    }

    pub fn render(&self) -> String {
        let columns = self.column_count();
        if columns == 0 {
            return String::new();
        }

        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                (0..columns)
                    .map(|c| row.get(c).map(|cell| cell.render(self.float_precision)).unwrap_or_default())
                    .collect()
            })
            .collect();
        let right_align: Vec<bool> = (0..columns)
            .map(|c| !self.rows.is_empty() && self.rows.iter().all(|row| row.get(c).is_some_and(Cell::is_numeric)))
            .collect();
        let widths: Vec<usize> = (0..columns)
            .map(|c| {
                let header = self.headers.get(c).map_or(0, |h| h.chars().count());
                rendered.iter().map(|row| row[c].chars().count()).chain(std::iter::once(header)).max().unwrap_or(0)
            })
            .collect();

        let format_line = |cells: &[String]| -> String {
            let parts: Vec<String> = cells
                .iter()
                .enumerate()
                .map(|(c, s)| {
                    let w = widths[c];
                    if right_align[c] { format!("{s:>w$}") } else { format!("{s:<w$}") }
                })
                .collect();
            parts.join("  ").trim_end().to_owned()
        };
        let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  ");

        let mut lines = Vec::with_capacity(rendered.len() + 3);
        if self.headers.is_empty() {
            lines.push(rule.clone());
        } else {
            let headers: Vec<String> =
                (0..columns).map(|c| self.headers.get(c).cloned().unwrap_or_default()).collect();
            lines.push(format_line(&headers));
        }
        lines.push(rule.clone());
        lines.extend(rendered.iter().map(|row| format_line(row)));
        if self.headers.is_empty() {
            lines.push(rule);
        }
        lines.join("\n")
    }
}

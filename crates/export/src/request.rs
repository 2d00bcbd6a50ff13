use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;

/// Turns a raw cell value into display text.
pub type ValueFormatter = Arc<dyn Fn(&Value) -> String + Send + Sync>;

#[derive(Clone)]
pub struct ExportColumn {
    pub key: String,
    pub header: String,
    /// Width in spreadsheet character units; also the relative width in PDF tables.
    pub width: Option<f64>,
    pub formatter: Option<ValueFormatter>,
}

impl ExportColumn {
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            width: None,
            formatter: None,
        }
    }

    pub fn width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn format_with<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&Value) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    /// Display text for this column's cell in `record`.
    pub fn cell(&self, record: &Value) -> String {
        let raw = record.get(&self.key).unwrap_or(&Value::Null);
        match &self.formatter {
            Some(format) => format(raw),
            None => cell_text(raw),
        }
    }
}

impl fmt::Debug for ExportColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportColumn")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("width", &self.width)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

/// Plain string coercion; missing and null are empty.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub base_name: String,
    pub sheet_name: Option<String>,
    pub title: Option<String>,
    pub columns: Vec<ExportColumn>,
    pub records: Vec<Value>,
    pub include_date_stamp: bool,
}

impl ExportRequest {
    pub fn new(
        base_name: impl Into<String>,
        columns: Vec<ExportColumn>,
        records: Vec<Value>,
    ) -> Self {
        Self {
            base_name: base_name.into(),
            sheet_name: None,
            title: None,
            columns,
            records,
            include_date_stamp: true,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }

    pub fn without_date_stamp(mut self) -> Self {
        self.include_date_stamp = false;
        self
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header.as_str()).collect()
    }

    /// `{base}[_{YYYY-MM-DD}].{ext}`
    pub fn file_name(&self, extension: &str, today: NaiveDate) -> String {
        if self.include_date_stamp {
            format!("{}_{}.{}", self.base_name, today.format("%Y-%m-%d"), extension)
        } else {
            format!("{}.{}", self.base_name, extension)
        }
    }
}

/// One row of display text per record, columns in request order.
pub fn project_rows(request: &ExportRequest) -> Vec<Vec<String>> {
    request
        .records
        .iter()
        .map(|record| request.columns.iter().map(|c| c.cell(record)).collect())
        .collect()
}

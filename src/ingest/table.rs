//! In-memory tabular data passed between pipeline stages.

/// One data row and the source line it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based line number of the row in the uploaded file.
    pub line: u64,
    /// Cell values, parallel to the owning table's headers.
    pub values: Vec<String>,
}

impl Record {
    pub fn new(line: u64, values: Vec<String>) -> Self {
        Self { line, values }
    }

    /// Returns the value at `index`, or `""` past the end.
    pub fn get(&self, index: usize) -> &str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }
}

/// An ordered sequence of rows sharing one header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTable {
    headers: Vec<String>,
    rows: Vec<Record>,
}

impl RecordTable {
    /// Creates an empty table with the given headers.
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Creates an empty table with the same headers as `self`.
    pub fn empty_like(&self) -> Self {
        Self {
            headers: self.headers.clone(),
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a row. The row must match the header width.
    pub fn push(&mut self, record: Record) {
        debug_assert_eq!(record.values.len(), self.headers.len());
        self.rows.push(record);
    }

    /// Index of the first header equal to `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Projects the table onto `columns`, in that order.
    ///
    /// Returns `None` when any requested column is absent. Duplicate headers
    /// resolve to their first occurrence.
    pub fn project(&self, columns: &[&str]) -> Option<RecordTable> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Option<Vec<usize>>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| {
                Record::new(
                    row.line,
                    indices.iter().map(|&i| row.get(i).to_string()).collect(),
                )
            })
            .collect();

        Some(RecordTable {
            headers: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }
}

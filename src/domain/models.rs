use serde::{Deserialize, Serialize};

/// A raw spreadsheet grid: ordered column labels and row-major cell text.
///
/// Each cell holds exactly what the user typed: empty text, a literal, or a
/// formula starting with `=`. Row and column order are significant, and the
/// grid is dense so a compute pass always produces an output of identical
/// shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::with_size(3, 3)
    }
}

impl Grid {
    /// Creates an empty grid with the given shape, columns labeled A, B, C, ...
    pub fn with_size(rows: usize, cols: usize) -> Self {
        Self {
            columns: (0..cols).map(Self::column_label).collect(),
            rows: vec![vec![String::new(); cols]; rows],
        }
    }

    /// Creates an empty grid with explicit column labels.
    pub fn with_columns(columns: Vec<String>, rows: usize) -> Self {
        let width = columns.len();
        Self {
            columns,
            rows: vec![vec![String::new(); width]; rows],
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Raw text of the cell, or empty text when the coordinate is out of range.
    pub fn get(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Overwrites the raw text of an in-range cell.
    pub fn set(&mut self, row: usize, col: usize, value: String) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = value;
        }
    }

    pub fn clear(&mut self, row: usize, col: usize) {
        self.set(row, col, String::new());
    }

    /// Position of a column by its label, if the grid has one with that name.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == label)
    }

    /// Spreadsheet-style label for a zero-based column index (A, B, ..., Z, AA, ...).
    pub fn column_label(col: usize) -> String {
        let mut result = String::new();
        let mut c = col;
        loop {
            result = char::from(b'A' + (c % 26) as u8).to_string() + &result;
            if c < 26 {
                break;
            }
            c = c / 26 - 1;
        }
        result
    }

    pub fn add_row(&mut self) {
        self.rows.push(vec![String::new(); self.columns.len()]);
    }

    /// Appends a column under the next generated label not already in use.
    pub fn add_column(&mut self) {
        let mut candidate = self.columns.len();
        let label = loop {
            let label = Self::column_label(candidate);
            if self.column_index(&label).is_none() {
                break label;
            }
            candidate += 1;
        };
        self.columns.push(label);
        for row in &mut self.rows {
            row.push(String::new());
        }
    }
}

/// A computed display value: the output of evaluating one cell.
///
/// Literal cells copy through as [`Value::Text`]; formula cells produce a
/// number, text, or boolean, or the `ERR` marker when evaluation fails.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
    Error,
}

impl Value {
    /// Numeric coercion: numbers are themselves, booleans are 1/0, text never
    /// coerces (references were already resolved to numbers by the time any
    /// expression is evaluated, so text here is a genuine string value).
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Bool(true) => Some(1.0),
            Value::Bool(false) => Some(0.0),
            _ => None,
        }
    }

    /// Truthiness: nonzero number, nonempty text, TRUE.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Error => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // f64's Display renders integer-valued floats without a
            // fractional part, so 2.0 shows as "2"
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bool(true) => write!(f, "TRUE"),
            Value::Bool(false) => write!(f, "FALSE"),
            Value::Error => write!(f, "ERR"),
        }
    }
}

/// The output of one compute pass: same shape as the source grid, one
/// [`Value`] per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedGrid {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ComputedGrid {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Display text of a cell, empty for out-of-range coordinates.
    pub fn display(&self, row: usize, col: usize) -> String {
        self.get(row, col).map(|v| v.to_string()).unwrap_or_default()
    }
}

//! Application state for the terminal grid editor.
//!
//! The state pairs the raw source grid with its most recent computed
//! counterpart. Every mutation of the source triggers a fresh compute pass;
//! the computed grid is never edited directly and never feeds back into
//! evaluation.

use crate::domain::{ComputedGrid, FormulaEvaluator, Grid};

/// Input mode of the application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMode {
    /// Navigating the grid
    Normal,
    /// Typing into the selected cell
    Editing,
    /// Help screen is open
    Help,
    /// Prompting for a workbook filename to save to
    SaveAs,
    /// Prompting for a workbook filename to load from
    LoadFile,
    /// Prompting for a CSV filename to export computed values to
    ExportCsv,
    /// Prompting for a CSV filename to import a raw grid from
    ImportCsv,
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Raw source grid (what the user typed)
    pub grid: Grid,
    /// Computed counterpart of `grid`, refreshed after every mutation
    pub computed: ComputedGrid,
    pub selected_row: usize,
    pub selected_col: usize,
    pub scroll_row: usize,
    pub scroll_col: usize,
    pub mode: AppMode,
    /// Cell input buffer (editing mode)
    pub input: String,
    /// Cursor position within the active input buffer
    pub cursor_position: usize,
    /// Workbook filename, once saved or loaded
    pub filename: Option<String>,
    /// Filename dialog input buffer
    pub filename_input: String,
    pub status_message: Option<String>,
    pub help_scroll: usize,
    /// When set, cells display their raw text instead of computed values
    pub show_raw: bool,
    pub viewport_rows: usize,
    pub viewport_cols: usize,
}

impl Default for App {
    fn default() -> Self {
        let grid = Grid::with_size(20, 8);
        let computed = FormulaEvaluator::new().evaluate_grid(&grid);
        Self {
            grid,
            computed,
            selected_row: 0,
            selected_col: 0,
            scroll_row: 0,
            scroll_col: 0,
            mode: AppMode::Normal,
            input: String::new(),
            cursor_position: 0,
            filename: None,
            filename_input: String::new(),
            status_message: None,
            help_scroll: 0,
            show_raw: false,
            viewport_rows: 20,
            viewport_cols: 8,
        }
    }
}

impl App {
    pub fn with_grid(grid: Grid) -> Self {
        let mut app = Self {
            grid,
            ..Self::default()
        };
        app.recompute();
        app
    }

    /// Runs a fresh compute pass over the source grid.
    pub fn recompute(&mut self) {
        self.computed = FormulaEvaluator::new().evaluate_grid(&self.grid);
    }

    /// Display text for a cell: computed value, or raw text in raw view.
    pub fn cell_display(&self, row: usize, col: usize) -> String {
        if self.show_raw {
            self.grid.get(row, col).to_string()
        } else {
            self.computed.display(row, col)
        }
    }

    pub fn toggle_raw_view(&mut self) {
        self.show_raw = !self.show_raw;
        self.status_message = Some(
            if self.show_raw {
                "Showing raw cell text".to_string()
            } else {
                "Showing computed values".to_string()
            },
        );
    }

    /// Switches to editing mode, seeding the buffer with the given text.
    ///
    /// The seed is the cell's raw text for a plain edit, or `=` when the user
    /// starts typing a formula directly.
    pub fn start_editing(&mut self, seed: String) {
        self.mode = AppMode::Editing;
        self.input = seed;
        self.cursor_position = self.input.len();
    }

    /// Commits the input buffer into the selected cell and recomputes.
    pub fn finish_editing(&mut self) {
        self.grid
            .set(self.selected_row, self.selected_col, self.input.clone());
        self.recompute();

        // Move down one cell after editing
        if self.selected_row + 1 < self.grid.row_count() {
            self.selected_row += 1;
        }

        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn cancel_editing(&mut self) {
        self.mode = AppMode::Normal;
        self.input.clear();
        self.cursor_position = 0;
    }

    pub fn clear_selected_cell(&mut self) {
        self.grid.clear(self.selected_row, self.selected_col);
        self.recompute();
    }

    pub fn add_row(&mut self) {
        self.grid.add_row();
        self.recompute();
        self.status_message = Some(format!("Added row {}", self.grid.row_count()));
    }

    pub fn add_column(&mut self) {
        self.grid.add_column();
        self.recompute();
        let label = self.grid.columns.last().cloned().unwrap_or_default();
        self.status_message = Some(format!("Added column {}", label));
    }

    /// Moves the selection by a row/column delta, clamped to the grid shape.
    pub fn move_selection(&mut self, row_delta: isize, col_delta: isize) {
        let rows = self.grid.row_count();
        let cols = self.grid.column_count();
        if rows == 0 || cols == 0 {
            return;
        }

        let row = self.selected_row.saturating_add_signed(row_delta);
        let col = self.selected_col.saturating_add_signed(col_delta);
        self.selected_row = row.min(rows - 1);
        self.selected_col = col.min(cols - 1);
        self.ensure_cursor_visible();
    }

    /// Scrolls the viewport so the selection stays visible.
    pub fn ensure_cursor_visible(&mut self) {
        if self.selected_row < self.scroll_row {
            self.scroll_row = self.selected_row;
        } else if self.selected_row >= self.scroll_row + self.viewport_rows {
            self.scroll_row = self.selected_row + 1 - self.viewport_rows;
        }

        if self.selected_col < self.scroll_col {
            self.scroll_col = self.selected_col;
        } else if self.selected_col >= self.scroll_col + self.viewport_cols {
            self.scroll_col = self.selected_col + 1 - self.viewport_cols;
        }
    }

    pub fn start_save_as(&mut self) {
        self.mode = AppMode::SaveAs;
        self.filename_input = self
            .filename
            .clone()
            .unwrap_or_else(|| "sheet.gridcalc".to_string());
        self.cursor_position = self.filename_input.len();
        self.status_message = None;
    }

    pub fn start_load_file(&mut self) {
        self.mode = AppMode::LoadFile;
        self.filename_input = self
            .filename
            .clone()
            .unwrap_or_else(|| "sheet.gridcalc".to_string());
        self.cursor_position = self.filename_input.len();
        self.status_message = None;
    }

    pub fn start_csv_export(&mut self) {
        self.mode = AppMode::ExportCsv;
        self.filename_input = "export.csv".to_string();
        self.cursor_position = self.filename_input.len();
        self.status_message = None;
    }

    pub fn start_csv_import(&mut self) {
        self.mode = AppMode::ImportCsv;
        self.filename_input = "data.csv".to_string();
        self.cursor_position = self.filename_input.len();
        self.status_message = None;
    }

    pub fn cancel_filename_input(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    /// The filename to act on: the dialog input, or a default when empty.
    pub fn effective_filename(&self, default: &str) -> String {
        if self.filename_input.is_empty() {
            default.to_string()
        } else {
            self.filename_input.clone()
        }
    }

    pub fn set_save_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.filename = Some(filename.clone());
                self.status_message = Some(format!("Saved to {}", filename));
            }
            Err(error) => {
                self.status_message = Some(format!("Save failed: {}", error));
            }
        }
        self.close_filename_dialog();
    }

    pub fn set_load_result(&mut self, result: Result<(Grid, String), String>) {
        match result {
            Ok((grid, filename)) => {
                self.grid = grid;
                self.recompute();
                self.filename = Some(filename.clone());
                self.reset_view();
                self.status_message = Some(format!("Loaded from {}", filename));
            }
            Err(error) => {
                self.status_message = Some(format!("Load failed: {}", error));
            }
        }
        self.close_filename_dialog();
    }

    pub fn set_csv_export_result(&mut self, result: Result<String, String>) {
        match result {
            Ok(filename) => {
                self.status_message = Some(format!("Exported computed values to {}", filename));
            }
            Err(error) => {
                self.status_message = Some(format!("Export failed: {}", error));
            }
        }
        self.close_filename_dialog();
    }

    pub fn set_csv_import_result(&mut self, result: Result<Grid, String>) {
        match result {
            Ok(grid) => {
                self.grid = grid;
                self.recompute();
                self.reset_view();
                // Imported CSV data is not a saved workbook, so the filename
                // stays as it was
                self.status_message = Some("CSV data imported".to_string());
            }
            Err(error) => {
                self.status_message = Some(format!("Import failed: {}", error));
            }
        }
        self.close_filename_dialog();
    }

    fn close_filename_dialog(&mut self) {
        self.mode = AppMode::Normal;
        self.filename_input.clear();
        self.cursor_position = 0;
    }

    fn reset_view(&mut self) {
        self.selected_row = 0;
        self.selected_col = 0;
        self.scroll_row = 0;
        self.scroll_col = 0;
    }
}

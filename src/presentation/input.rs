use crate::application::{App, AppMode};
use crate::infrastructure::{CsvStore, FileRepository};
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        match app.mode {
            AppMode::Normal => Self::handle_normal_mode(app, key, modifiers),
            AppMode::Editing => Self::handle_editing_mode(app, key),
            AppMode::Help => Self::handle_help_mode(app, key),
            AppMode::SaveAs | AppMode::LoadFile | AppMode::ExportCsv | AppMode::ImportCsv => {
                Self::handle_filename_mode(app, key)
            }
        }
    }

    fn handle_normal_mode(app: &mut App, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('s') => app.start_save_as(),
                KeyCode::Char('o') => app.start_load_file(),
                KeyCode::Char('e') => app.start_csv_export(),
                KeyCode::Char('i') => app.start_csv_import(),
                _ => {}
            }
            return;
        }

        app.status_message = None;

        match key {
            KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1, 0),
            KeyCode::Down | KeyCode::Char('j') => app.move_selection(1, 0),
            KeyCode::Left | KeyCode::Char('h') => app.move_selection(0, -1),
            KeyCode::Right | KeyCode::Char('l') => app.move_selection(0, 1),
            KeyCode::PageUp => app.move_selection(-(app.viewport_rows as isize), 0),
            KeyCode::PageDown => app.move_selection(app.viewport_rows as isize, 0),
            KeyCode::Home => app.move_selection(0, -(app.grid.column_count() as isize)),
            KeyCode::End => app.move_selection(0, app.grid.column_count() as isize),

            KeyCode::Enter | KeyCode::F(2) => {
                let raw = app.grid.get(app.selected_row, app.selected_col).to_string();
                app.start_editing(raw);
            }
            // Typing '=' jumps straight into a fresh formula
            KeyCode::Char('=') => app.start_editing("=".to_string()),

            KeyCode::Delete | KeyCode::Backspace => app.clear_selected_cell(),

            KeyCode::Char('v') => app.toggle_raw_view(),
            KeyCode::Char('r') => app.add_row(),
            KeyCode::Char('c') => app.add_column(),

            KeyCode::F(1) | KeyCode::Char('?') => {
                app.mode = AppMode::Help;
                app.help_scroll = 0;
            }

            _ => {}
        }
    }

    fn handle_editing_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => app.finish_editing(),
            KeyCode::Esc => app.cancel_editing(),
            _ => Self::edit_buffer(&mut app.input, &mut app.cursor_position, key),
        }
    }

    fn handle_filename_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Enter => Self::run_file_action(app),
            KeyCode::Esc => app.cancel_filename_input(),
            _ => Self::edit_buffer(&mut app.filename_input, &mut app.cursor_position, key),
        }
    }

    fn run_file_action(app: &mut App) {
        match app.mode {
            AppMode::SaveAs => {
                let filename = app.effective_filename("sheet.gridcalc");
                let result = FileRepository::save_grid(&app.grid, &filename);
                app.set_save_result(result);
            }
            AppMode::LoadFile => {
                let filename = app.effective_filename("sheet.gridcalc");
                let result = FileRepository::load_grid(&filename);
                app.set_load_result(result);
            }
            AppMode::ExportCsv => {
                let filename = app.effective_filename("export.csv");
                let result = CsvStore::export_computed(&app.computed, &filename);
                app.set_csv_export_result(result);
            }
            AppMode::ImportCsv => {
                let filename = app.effective_filename("data.csv");
                let result = CsvStore::import_grid(&filename);
                app.set_csv_import_result(result);
            }
            _ => {}
        }
    }

    fn handle_help_mode(app: &mut App, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                app.help_scroll = app.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.help_scroll += 1;
            }
            KeyCode::PageUp => {
                app.help_scroll = app.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                app.help_scroll += 5;
            }
            KeyCode::Home => {
                app.help_scroll = 0;
            }
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.mode = AppMode::Normal;
            }
            _ => {}
        }
    }

    /// Shared line-editing for the cell and filename buffers. The cursor is a
    /// byte offset kept on a character boundary.
    fn edit_buffer(buffer: &mut String, cursor: &mut usize, key: KeyCode) {
        match key {
            KeyCode::Char(c) => {
                buffer.insert(*cursor, c);
                *cursor += c.len_utf8();
            }
            KeyCode::Backspace => {
                if let Some((offset, _)) = buffer[..*cursor].char_indices().next_back() {
                    buffer.remove(offset);
                    *cursor = offset;
                }
            }
            KeyCode::Left => {
                if let Some((offset, _)) = buffer[..*cursor].char_indices().next_back() {
                    *cursor = offset;
                }
            }
            KeyCode::Right => {
                if let Some(ch) = buffer[*cursor..].chars().next() {
                    *cursor += ch.len_utf8();
                }
            }
            KeyCode::Home => {
                *cursor = 0;
            }
            KeyCode::End => {
                *cursor = buffer.len();
            }
            _ => {}
        }
    }
}

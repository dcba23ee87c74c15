use crate::application::{App, AppMode};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_grid(f, app, chunks[1]);
    render_status_bar(f, app, chunks[2]);

    if matches!(app.mode, AppMode::Help) {
        render_help_popup(f, app.help_scroll);
    }
}

fn selected_cell_name(app: &App) -> String {
    let label = app
        .grid
        .columns
        .get(app.selected_col)
        .cloned()
        .unwrap_or_default();
    format!("{}{}", label, app.selected_row + 1)
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let view = if app.show_raw { "raw" } else { "computed" };
    let header = Paragraph::new(format!(
        "gridcalc | Cell: {} | View: {}",
        selected_cell_name(app),
        view
    ))
    .style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

/// Width of a column, sized to its visible content.
fn column_width(app: &App, col: usize) -> usize {
    let mut width = app
        .grid
        .columns
        .get(col)
        .map(|label| label.chars().count())
        .unwrap_or(1);
    for row in 0..app.grid.row_count() {
        width = width.max(app.cell_display(row, col).chars().count());
    }
    width.clamp(3, 24)
}

fn render_grid(f: &mut Frame, app: &App, area: Rect) {
    let visible_rows = (area.height as usize).saturating_sub(3);

    let mut total_width = 4;
    let mut visible_cols = 0;
    let available_width = area.width as usize;

    for col in app.scroll_col..app.grid.column_count() {
        let col_width = column_width(app, col);
        if total_width + col_width + 1 > available_width {
            break;
        }
        total_width += col_width + 1;
        visible_cols += 1;
    }

    let mut headers = vec![Cell::from("")];
    for col in app.scroll_col..app.scroll_col + visible_cols {
        let header_style = if col == app.selected_col {
            Style::default().bg(Color::LightBlue).fg(Color::Black)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let label = app.grid.columns.get(col).cloned().unwrap_or_default();
        headers.push(Cell::from(label).style(header_style));
    }

    let mut rows = vec![Row::new(headers).height(1)];

    let last_row = (app.scroll_row + visible_rows).min(app.grid.row_count());
    for row in app.scroll_row..last_row {
        let row_number_style = if row == app.selected_row {
            Style::default().bg(Color::LightBlue).fg(Color::Black)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let mut cells = vec![Cell::from(format!("{}", row + 1)).style(row_number_style)];

        for col in app.scroll_col..app.scroll_col + visible_cols {
            let display = app.cell_display(row, col);
            let display = if display.is_empty() {
                " ".to_string()
            } else {
                display
            };

            let style = if row == app.selected_row && col == app.selected_col {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else if display == "ERR" {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            cells.push(Cell::from(display).style(style));
        }

        rows.push(Row::new(cells).height(1));
    }

    let mut widths = vec![Constraint::Length(4)];
    for col in app.scroll_col..app.scroll_col + visible_cols {
        widths.push(Constraint::Length(column_width(app, col) as u16));
    }
    let table = Table::new(rows, widths)
        .block(Block::default().borders(Borders::ALL).title("Grid"))
        .column_spacing(1);

    f.render_widget(table, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status_text = match app.mode {
        AppMode::Normal => {
            if let Some(ref status) = app.status_message {
                status.clone()
            } else {
                let raw = app.grid.get(app.selected_row, app.selected_col);
                format!(
                    "{} = {:?} | Enter: edit | v: view | r/c: add row/col | Ctrl+S/O: save/load | Ctrl+E/I: export/import CSV | ?: help | q: quit",
                    selected_cell_name(app),
                    raw
                )
            }
        }
        AppMode::Editing => format!("Editing: {} (Enter to commit, Esc to cancel)", app.input),
        AppMode::Help => {
            "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string()
        }
        AppMode::SaveAs => format!("Save as: {} (Enter to save, Esc to cancel)", app.filename_input),
        AppMode::LoadFile => format!(
            "Load file: {} (Enter to load, Esc to cancel)",
            app.filename_input
        ),
        AppMode::ExportCsv => format!(
            "Export computed CSV to: {} (Enter to export, Esc to cancel)",
            app.filename_input
        ),
        AppMode::ImportCsv => format!(
            "Import CSV from: {} (Enter to import, Esc to cancel)",
            app.filename_input
        ),
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(match app.mode {
            AppMode::Normal => Style::default(),
            AppMode::Editing => Style::default().fg(Color::Green),
            AppMode::Help => Style::default().fg(Color::Cyan),
            AppMode::SaveAs | AppMode::LoadFile => Style::default().fg(Color::Yellow),
            AppMode::ExportCsv | AppMode::ImportCsv => Style::default().fg(Color::Magenta),
        });
    f.render_widget(status, area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_text = get_help_text();
    let help_lines: Vec<&str> = help_text.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(
                    "gridcalc Formula Reference (Line {}/{})",
                    start_line + 1,
                    help_lines.len()
                ))
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

fn get_help_text() -> String {
    r#"GRIDCALC FORMULA REFERENCE

=== BASIC CONCEPTS ===
• A cell is plain text unless it starts with = (a formula)
• Cell references are a single uppercase column letter plus a row number (A1, B12)
• A reference to an empty, text, or out-of-range cell counts as 0
• References read the raw cells: a formula never sees another formula's result
• A formula that cannot be evaluated shows ERR in its own cell only

=== LITERALS ===
Numbers        42, 3.14
Strings        "hello" or 'hello'
Booleans       TRUE, FALSE

=== ARITHMETIC OPERATORS ===
+       Addition (also joins two strings)     =A1+B1, ="ab"+"cd"
-       Subtraction                           =10-3
*       Multiplication                        =4*3
/       Division (by zero is ERR)             =15/3
%       Remainder                             =10%3
** ^    Power                                 =2**3, =3^2

=== COMPARISON OPERATORS ===
<  <=  >  >=      Ordering                    =A1>5
=  ==             Equal                       =A1=10
<> !=             Not equal                   =A1<>0
Comparisons produce TRUE or FALSE

=== FUNCTIONS (names are case-sensitive) ===
SUM(...)          Sum of numbers              =SUM(A1,A2,A3)
AVERAGE(...)      Mean (0 when empty)         =AVERAGE(A1,B1)
MIN(...)          Smallest argument           =MIN(A1,B1,5)
MAX(...)          Largest argument            =MAX(A1,B1)
ROUND(v,digits)   Round to digits (default 0) =ROUND(3.14159,2)
IF(cond,a,b)      a when cond is truthy       =IF(A1>5,"big","small")
AND(...)          All arguments truthy        =AND(A1>0,B1>0)
OR(...)           Any argument truthy         =OR(A1=0,B1=0)
NOT(v)            Boolean negation            =NOT(A1>5)
LEN(v)            Length of display text      =LEN("hello")
CONCAT(...)       Join display text           =CONCAT("x=",A1)

Truthiness: nonzero number, nonempty string, TRUE

=== KEYS ===
Arrows / hjkl     Move selection
Enter / F2        Edit the selected cell
=                 Start a new formula in the selected cell
Delete/Backspace  Clear the selected cell
v                 Toggle raw text / computed view
r  /  c           Add a row / a column
Ctrl+S / Ctrl+O   Save / load workbook (JSON)
Ctrl+E            Export computed values to CSV
Ctrl+I            Import a raw grid from CSV (headers become column labels)
F1 or ?           This help
q                 Quit

CSV exports contain computed display values, not formulas."#
        .to_string()
}

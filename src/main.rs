//! gridcalc - Terminal Mini-Spreadsheet
//!
//! An interactive grid editor over a safe formula engine. Cells hold raw
//! text; every edit triggers a compute pass and the grid shows the computed
//! values, with `ERR` marking (only) the cells whose formulas failed.

use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
};

use gridcalc::application::{App, AppMode};
use gridcalc::infrastructure::{CsvStore, FileRepository};
use gridcalc::presentation::{InputHandler, render_ui};

#[derive(Parser)]
#[command(
    name = "gridcalc",
    about = "Terminal mini-spreadsheet with a safe formula engine"
)]
struct Cli {
    /// Workbook (.gridcalc JSON) or CSV grid to open at startup
    file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut app = match cli.file {
        Some(path) => open_file(&path)?,
        None => App::default(),
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Opens a startup file: CSV imports a raw grid, anything else loads as a
/// native JSON workbook.
fn open_file(path: &Path) -> Result<App, Box<dyn std::error::Error>> {
    let filename = path.to_string_lossy().into_owned();
    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        Ok(App::with_grid(CsvStore::import_grid(&filename)?))
    } else {
        let (grid, name) = FileRepository::load_grid(&filename)?;
        let mut app = App::with_grid(grid);
        app.filename = Some(name);
        Ok(app)
    }
}

/// Main event loop; runs until the user presses 'q' in normal mode.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                match key.code {
                    KeyCode::Char('q') if matches!(app.mode, AppMode::Normal) => return Ok(()),
                    _ => InputHandler::handle_key_event(app, key.code, key.modifiers),
                }
            }
        }
    }
}

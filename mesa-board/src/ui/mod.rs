//! Terminal UI
//!
//! Renders the table grid, the occupation form and notices, and translates
//! key events into controller calls. Synchronous event loop: every operation
//! completes inside the callback, nothing runs in the background.

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{prelude::*, widgets::*};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use crate::board::{BoardController, BoardTable, Notice, StatusStore, TableStatus};

/// Tables per grid row
const GRID_COLS: usize = 4;
/// Grid cell height in terminal rows
const CELL_HEIGHT: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormFocus {
    Nome,
    Obs,
}

struct App<S: StatusStore> {
    controller: BoardController<S>,
    export_dir: PathBuf,
    /// Grid cursor (index into the occupancy snapshot)
    cursor: usize,
    /// Occupancy snapshot refreshed before every draw
    rows: Vec<(BoardTable, TableStatus)>,
    nome_input: Input,
    obs_input: Input,
    focus: FormFocus,
    notice: Option<Notice>,
}

impl<S: StatusStore> App<S> {
    fn new(controller: BoardController<S>, export_dir: PathBuf) -> Self {
        Self {
            controller,
            export_dir,
            cursor: 0,
            rows: Vec::new(),
            nome_input: Input::default(),
            obs_input: Input::default(),
            focus: FormFocus::Nome,
            notice: None,
        }
    }

    fn refresh(&mut self) -> anyhow::Result<()> {
        self.rows = self.controller.occupancy()?;
        if !self.rows.is_empty() {
            self.cursor = self.cursor.min(self.rows.len() - 1);
        }
        Ok(())
    }

    fn modal_open(&self) -> bool {
        self.controller.selected().is_some()
    }

    fn open_form(&mut self) -> anyhow::Result<()> {
        let Some((table, _)) = self.rows.get(self.cursor) else {
            return Ok(());
        };
        let id = table.id.clone();
        self.controller.select(&id)?;

        if let Some(sel) = self.controller.selected() {
            self.nome_input = Input::new(sel.nome.clone());
            self.obs_input = Input::new(sel.obs.clone());
            self.focus = FormFocus::Nome;
        }
        Ok(())
    }

    /// Handle one key press. Returns `true` when the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
        // Notices behave like the original alert: gone at the next action
        self.notice = None;

        if self.modal_open() {
            self.handle_form_key(key)?;
            return Ok(false);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Char('e') => {
                self.controller.export(&self.export_dir)?;
                self.notice = self.controller.take_notice();
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.open_form()?,
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            KeyCode::Up => self.move_cursor(-(GRID_COLS as isize)),
            KeyCode::Down => self.move_cursor(GRID_COLS as isize),
            _ => {}
        }
        Ok(false)
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> anyhow::Result<()> {
        match key.code {
            KeyCode::Esc => self.controller.close(),
            KeyCode::Enter => {
                let nome = self.nome_input.value().to_string();
                let obs = self.obs_input.value().to_string();
                self.controller.submit(&nome, &obs)?;
                self.notice = self.controller.take_notice();
            }
            KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.controller.release()?;
                self.notice = self.controller.take_notice();
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => {
                self.focus = match self.focus {
                    FormFocus::Nome => FormFocus::Obs,
                    FormFocus::Obs => FormFocus::Nome,
                };
            }
            _ => {
                let input = match self.focus {
                    FormFocus::Nome => &mut self.nome_input,
                    FormFocus::Obs => &mut self.obs_input,
                };
                input.handle_event(&Event::Key(key));
            }
        }
        Ok(())
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let next = self.cursor as isize + delta;
        if next >= 0 && (next as usize) < self.rows.len() {
            self.cursor = next as usize;
        }
    }
}

/// Run the board UI until the user quits
pub fn run<S: StatusStore>(
    controller: BoardController<S>,
    export_dir: PathBuf,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(controller, export_dir);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<S: StatusStore>(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App<S>,
) -> anyhow::Result<()> {
    loop {
        app.refresh()?;
        terminal.draw(|f| draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()?
                && matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat)
                && app.handle_key(key)?
            {
                return Ok(());
            }
        }
    }
}

fn draw<S: StatusStore>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Grid
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_grid(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);

    if app.modal_open() {
        draw_form(f, app);
    }
}

fn draw_header<S: StatusStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let occupied = app.rows.iter().filter(|(_, s)| s.occupied).count();
    let title = Paragraph::new(Line::from(vec![
        Span::raw(" Painel de Mesas "),
        Span::styled(
            format!(" {occupied}/{} ocupadas ", app.rows.len()),
            Style::default().fg(Color::Yellow),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(title, area);
}

fn draw_grid<S: StatusStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    if app.rows.is_empty() {
        let empty = Paragraph::new("Nenhuma mesa no layout")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(empty, area);
        return;
    }

    let grid_rows = app.rows.len().div_ceil(GRID_COLS);
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CELL_HEIGHT); grid_rows])
        .split(area);

    for (row_idx, row_area) in row_areas.iter().enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, GRID_COLS as u32); GRID_COLS])
            .split(*row_area);

        for col_idx in 0..GRID_COLS {
            let idx = row_idx * GRID_COLS + col_idx;
            let Some((table, status)) = app.rows.get(idx) else {
                break;
            };
            f.render_widget(table_cell(table, status, idx == app.cursor), cells[col_idx]);
        }
    }
}

fn table_cell<'a>(table: &'a BoardTable, status: &'a TableStatus, selected: bool) -> Paragraph<'a> {
    let (label, style) = if status.occupied {
        ("OCUPADA", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
    } else {
        ("LIVRE", Style::default().fg(Color::Green))
    };

    let occupant = status
        .record
        .as_ref()
        .map(|r| r.nome.as_str())
        .unwrap_or("");

    let border_style = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::DIM)
    };

    Paragraph::new(vec![
        Line::from(Span::styled(label, style)),
        Line::from(Span::styled(occupant, Style::default().fg(Color::Cyan))),
    ])
    .block(
        Block::default()
            .title(format!(" {} ", table.display_name))
            .borders(Borders::ALL)
            .border_style(border_style),
    )
}

fn draw_footer<S: StatusStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let line = match &app.notice {
        Some(notice) => Line::from(Span::styled(
            notice.message(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        None if app.modal_open() => Line::from(Span::styled(
            "Tab alternar campo | Enter confirmar | Ctrl+L liberar | Esc fechar",
            Style::default().fg(Color::DarkGray),
        )),
        None => Line::from(Span::styled(
            "Setas mover | Enter abrir mesa | e exportar CSV | q sair",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

fn draw_form<S: StatusStore>(f: &mut Frame, app: &App<S>) {
    let Some(sel) = app.controller.selected() else {
        return;
    };

    let area = centered_rect(60, 12, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", sel.display_name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(block, area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Nome
            Constraint::Length(3), // Observações
            Constraint::Length(1), // Actions
        ])
        .split(area);

    draw_field(
        f,
        &app.nome_input,
        "Nome dos Ocupantes",
        app.focus == FormFocus::Nome,
        inner[0],
    );
    draw_field(
        f,
        &app.obs_input,
        "Observações",
        app.focus == FormFocus::Obs,
        inner[1],
    );

    let mut actions = vec![Span::styled(
        format!("[Enter] {}", app.controller.submit_label()),
        Style::default().fg(Color::Green),
    )];
    if app.controller.can_release() {
        actions.push(Span::raw("  "));
        actions.push(Span::styled(
            "[Ctrl+L] Liberar Mesa",
            Style::default().fg(Color::Red),
        ));
    }
    actions.push(Span::raw("  "));
    actions.push(Span::styled("[Esc] Fechar", Style::default().fg(Color::DarkGray)));
    f.render_widget(Paragraph::new(Line::from(actions)), inner[2]);
}

fn draw_field(f: &mut Frame, input: &Input, title: &str, focused: bool, area: Rect) {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };

    let width = area.width.max(3) - 3;
    let scroll = input.visual_scroll(width as usize);
    let field = Paragraph::new(input.value())
        .style(style)
        .scroll((0, scroll as u16))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(field, area);

    if focused {
        f.set_cursor_position((
            area.x + ((input.visual_cursor().max(scroll) - scroll) as u16) + 1,
            area.y + 1,
        ));
    }
}

fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{RedbStatusStore, TableRegistry};

    fn app() -> App<RedbStatusStore> {
        let controller = BoardController::new(
            TableRegistry::default_board(),
            RedbStatusStore::open_in_memory().unwrap(),
        );
        App::new(controller, PathBuf::from("."))
    }

    #[test]
    fn cursor_moves_within_grid_bounds() {
        let mut app = app();
        app.refresh().unwrap();

        app.move_cursor(-1);
        assert_eq!(app.cursor, 0);

        app.move_cursor(GRID_COLS as isize);
        assert_eq!(app.cursor, 4);

        app.move_cursor(GRID_COLS as isize);
        // Would land past the last mesa
        assert_eq!(app.cursor, 4);

        app.move_cursor(3);
        assert_eq!(app.cursor, 7);
        app.move_cursor(1);
        assert_eq!(app.cursor, 7);
    }

    #[test]
    fn open_form_targets_cursor_mesa() {
        let mut app = app();
        app.refresh().unwrap();
        app.cursor = 2;

        app.open_form().unwrap();

        assert_eq!(app.controller.selected().unwrap().id, "3");
        assert_eq!(app.nome_input.value(), "");
    }

    #[test]
    fn open_form_on_empty_board_is_a_no_op() {
        let controller = BoardController::new(
            TableRegistry::from_tables(vec![]).unwrap(),
            RedbStatusStore::open_in_memory().unwrap(),
        );
        let mut app = App::new(controller, PathBuf::from("."));
        app.refresh().unwrap();

        app.open_form().unwrap();
        assert!(!app.modal_open());
    }

    #[test]
    fn centered_rect_is_clamped_to_frame() {
        let r = centered_rect(100, 100, Rect::new(0, 0, 40, 10));
        assert_eq!(r, Rect::new(0, 0, 40, 10));

        let r = centered_rect(20, 6, Rect::new(0, 0, 40, 10));
        assert_eq!(r, Rect::new(10, 2, 20, 6));
    }
}

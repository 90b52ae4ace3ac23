use std::{
    fs::File,
    io::stdout,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use log::{info, trace};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use blockfall::board::CellState;
use blockfall::config::{Config, COLS, FRAME_PERIOD, ROWS, USAGE};
use blockfall::game::{Game, GameEvent, Phase};
use blockfall::input::{map_key, Command};
use blockfall::session::Stats;
use blockfall::shapes::{self, PieceProvider, RandomPieceProvider};

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";

fn cell_color(color: shapes::Color) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

// ============================================================================
// Score display
// ============================================================================

/// Numbers shown in the info panel, refreshed from `StatsChanged` events.
#[derive(Default)]
struct Hud {
    stats: Stats,
    final_score: u32,
}

impl Hud {
    fn apply(&mut self, event: &GameEvent) {
        match event {
            GameEvent::StatsChanged(stats) => self.stats = *stats,
            GameEvent::GameOver { score } => self.final_score = *score,
            _ => {}
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game, hud: &Hud) {
    let area = frame.size();

    match game.phase {
        Phase::Idle => render_home(frame, hud, area),
        Phase::Running => render_game(frame, game, hud, area),
        Phase::Paused => render_paused(frame, game, hud, area),
        Phase::GameOver => render_game_over(frame, game, hud, area),
    }
}

fn render_home(frame: &mut Frame, hud: &Hud, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("BLOCKFALL", Style::default().fg(Color::Magenta))),
        Line::from(""),
        Line::from(format!("High score: {}", hud.stats.high_score)),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to play",
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "←→ move  ↓ soft drop  ↑ rotate",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Space hard drop  P pause  H home",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Q/ESC quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Home ")
            .title_alignment(Alignment::Center),
    );

    frame.render_widget(paragraph, centered_rect(38, 14, area));
}

fn render_game(frame: &mut Frame, game: &Game, hud: &Hud, area: Rect) {
    let grid_display_width = (COLS as u16 * CELL_WIDTH) + 2;
    let grid_display_height = ROWS as u16 + 2;
    let preview_width = 12;
    let info_width = 14;
    let total_width = grid_display_width + preview_width + info_width + 4;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let game_row = vertical[0];

    // [Board][Next][Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(grid_display_width),
        Constraint::Length(preview_width),
        Constraint::Length(info_width),
    ])
    .split(game_row);

    render_grid(frame, game, horizontal[0]);
    render_preview(frame, game, horizontal[1]);
    render_info(frame, hud, horizontal[2]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→: Move | ↓: Soft drop | ↑: Rotate | Space: Drop | P: Pause | H: Home",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Blockfall ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let visual_grid = game.render_grid();

    let lines: Vec<Line> = visual_grid
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| match cell {
                    CellState::Empty => Span::raw(EMPTY_CHAR),
                    CellState::Filled(color) => {
                        Span::styled(BLOCK_CHAR, Style::default().fg(cell_color(*color)))
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_preview(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let piece = &game.next_piece;
    let style = Style::default().fg(cell_color(piece.color));

    let mut lines = vec![Line::from("")];
    for row in &piece.matrix {
        let mut spans = vec![Span::raw(" ")];
        for &filled in row {
            spans.push(if filled {
                Span::styled(BLOCK_CHAR, style)
            } else {
                Span::raw(EMPTY_CHAR)
            });
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_info(frame: &mut Frame, hud: &Hud, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let stats = hud.stats;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", stats.score)),
        Line::from(""),
        Line::from(Span::styled("Level", Style::default().fg(Color::Green))),
        Line::from(format!("{}", stats.level)),
        Line::from(""),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", stats.lines)),
        Line::from(""),
        Line::from(Span::styled("High", Style::default().fg(Color::Magenta))),
        Line::from(format!("{}", stats.high_score)),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, game: &Game, hud: &Hud, area: Rect) {
    render_game(frame, game, hud, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Final score: {}", hud.final_score)),
        Line::from(""),
        Line::from(Span::styled(
            "R: restart  H: home",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(paragraph, centered_rect(24, 9, area));
}

fn render_paused(frame: &mut Frame, game: &Game, hud: &Hud, area: Rect) {
    render_game(frame, game, hud, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled("PAUSED", Style::default().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            "Press P to resume",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press H for home",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Paused ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(paragraph, centered_rect(24, 8, area));
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Logging
// ============================================================================

fn init_logging(config: &Config) -> Result<()> {
    let rust_log_set = std::env::var_os("RUST_LOG").is_some();
    let Some(path) = config.log_destination(rust_log_set) else {
        return Ok(());
    };

    let file = File::create(&path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

// ============================================================================
// Main Loop
// ============================================================================

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::from_args(&args)?;
    if config.show_help {
        println!("{}", USAGE);
        return Ok(());
    }
    init_logging(&config)?;

    enable_raw_mode().context("failed to enable raw mode")?;
    stdout().execute(EnterAlternateScreen)?;

    let result = run(&config);

    // Always try to restore the terminal.
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);
    result
}

fn run(config: &Config) -> Result<()> {
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let provider: Box<dyn PieceProvider> = match config.seed {
        Some(seed) => {
            info!("using piece seed {}", seed);
            Box::new(RandomPieceProvider::seeded(seed))
        }
        None => Box::new(RandomPieceProvider::new()),
    };
    let mut game = Game::with_provider(provider);
    let mut hud = Hud::default();
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(|frame| render(frame, &game, &hud))?;

        // Block on input until the next display refresh is due.
        let timeout = if game.wants_frames() {
            FRAME_PERIOD
                .checked_sub(last_frame.elapsed())
                .unwrap_or(Duration::ZERO)
        } else {
            Duration::from_millis(250)
        };

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match map_key(key.code, game.phase) {
                        Some(Command::Quit) => break,
                        Some(Command::Start) => game.start(Instant::now()),
                        Some(Command::Restart) => game.restart(Instant::now()),
                        Some(Command::TogglePause) => game.toggle_pause(Instant::now()),
                        Some(Command::Home) => game.return_home(),
                        Some(Command::Play(action)) => game.apply(action),
                        None => {}
                    }
                }
            }
        }

        if game.wants_frames() && last_frame.elapsed() >= FRAME_PERIOD {
            last_frame = Instant::now();
            game.frame(last_frame);
        }

        for event in game.take_events() {
            trace!("{:?}", event);
            hud.apply(&event);
        }
    }

    Ok(())
}

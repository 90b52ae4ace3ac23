use std::time::{Duration, Instant};

use log::{debug, info, trace};

use crate::board::{Board, CellState};
use crate::config::{COLS, HARD_DROP_POINTS_PER_ROW, KICKS, ROWS, SOFT_DROP_POINTS};
use crate::session::{Session, Stats};
use crate::shapes::{create_piece, Piece, PieceProvider, RandomPieceProvider};

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Idle,
    Running,
    Paused,
    GameOver,
}

/// Player intents. All of them are ignored unless the game is running.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    Started,
    PieceMoved,
    PieceRotated,
    PieceLocked,
    LinesCleared(u32),
    LevelUp(u32),
    /// Score, level or lines changed; the display should refresh.
    StatsChanged(Stats),
    Paused,
    Resumed,
    ReturnedHome,
    GameOver { score: u32 },
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    pub board: Board,
    pub current_piece: Piece,
    pub next_piece: Piece,
    pub session: Session,
    pub high_score: u32,
    pub phase: Phase,
    drop_counter: Duration,
    last_frame: Option<Instant>,
    piece_provider: Box<dyn PieceProvider>,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new() -> Self {
        Self::with_provider(Box::new(RandomPieceProvider::new()))
    }

    /// A game sitting on the home screen, drawing pieces from `provider`.
    pub fn with_provider(mut provider: Box<dyn PieceProvider>) -> Self {
        let current_piece = create_piece(provider.as_mut());
        let next_piece = create_piece(provider.as_mut());

        Self {
            board: Board::new(),
            current_piece,
            next_piece,
            session: Session::new(),
            high_score: 0,
            phase: Phase::Idle,
            drop_counter: Duration::ZERO,
            last_frame: None,
            piece_provider: provider,
            events: Vec::new(),
        }
    }

    /// A running game with a prepared board and falling piece.
    pub fn with_board(board: Board, current_piece: Piece) -> Self {
        let mut game = Self::new();
        game.board = board;
        game.current_piece = current_piece;
        game.phase = Phase::Running;
        game
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Idle -> Running.
    pub fn start(&mut self, now: Instant) {
        if self.phase == Phase::Idle {
            self.reset(now);
        }
    }

    /// GameOver -> Running, with the same reset as `start`.
    pub fn restart(&mut self, now: Instant) {
        if self.phase == Phase::GameOver {
            self.reset(now);
        }
    }

    fn reset(&mut self, now: Instant) {
        self.board.clear();
        self.session = Session::new();
        self.current_piece = create_piece(self.piece_provider.as_mut());
        self.next_piece = create_piece(self.piece_provider.as_mut());
        self.drop_counter = Duration::ZERO;
        self.last_frame = Some(now);
        self.phase = Phase::Running;

        info!("game started (high score {})", self.high_score);
        self.events.push(GameEvent::Started);
        self.publish_stats();
    }

    /// Running <-> Paused. Resuming restarts the frame clock at `now`, so the
    /// time spent paused never counts toward gravity.
    pub fn toggle_pause(&mut self, now: Instant) {
        match self.phase {
            Phase::Running => {
                self.phase = Phase::Paused;
                info!("paused");
                self.events.push(GameEvent::Paused);
            }
            Phase::Paused => {
                self.phase = Phase::Running;
                self.last_frame = Some(now);
                info!("resumed");
                self.events.push(GameEvent::Resumed);
            }
            Phase::Idle | Phase::GameOver => {}
        }
    }

    /// Any phase -> Idle. The high score is kept.
    pub fn return_home(&mut self) {
        self.phase = Phase::Idle;
        self.last_frame = None;
        info!("returned home");
        self.events.push(GameEvent::ReturnedHome);
    }

    // ------------------------------------------------------------------------
    // Frame loop
    // ------------------------------------------------------------------------

    /// Whether the host should keep scheduling `frame` calls.
    pub fn wants_frames(&self) -> bool {
        self.phase == Phase::Running
    }

    /// Called by the host once per display refresh.
    pub fn frame(&mut self, now: Instant) {
        if self.phase != Phase::Running {
            return;
        }
        let delta = self
            .last_frame
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_frame = Some(now);
        self.advance(delta);
    }

    /// Accumulates `delta` and applies one gravity step once the drop interval is exceeded.
    pub fn advance(&mut self, delta: Duration) {
        if self.phase != Phase::Running {
            return;
        }
        self.drop_counter += delta;

        if self.drop_counter > self.session.drop_interval {
            if !self.board.collides(&self.current_piece, 0, 1) {
                self.current_piece.y += 1;
            } else {
                self.lock_and_spawn();
            }
            self.drop_counter = Duration::ZERO;
        }
    }

    pub fn drop_counter(&self) -> Duration {
        self.drop_counter
    }

    // ------------------------------------------------------------------------
    // Player actions
    // ------------------------------------------------------------------------

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::MoveLeft => {
                self.move_left();
            }
            Action::MoveRight => {
                self.move_right();
            }
            Action::SoftDrop => {
                self.soft_drop();
            }
            Action::Rotate => {
                self.rotate();
            }
            Action::HardDrop => self.hard_drop(),
        }
    }

    pub fn move_left(&mut self) -> bool {
        self.shift(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.shift(1, 0)
    }

    fn shift(&mut self, dx: i32, dy: i32) -> bool {
        if self.phase != Phase::Running || self.board.collides(&self.current_piece, dx, dy) {
            return false;
        }
        self.current_piece.x += dx;
        self.current_piece.y += dy;
        self.events.push(GameEvent::PieceMoved);
        true
    }

    /// One row down for a point. Never locks; gravity or a hard drop does that.
    pub fn soft_drop(&mut self) -> bool {
        if !self.shift(0, 1) {
            return false;
        }
        self.session.add_points(SOFT_DROP_POINTS);
        self.publish_stats();
        true
    }

    /// Rotates clockwise, trying each kick in order. On failure the piece is left untouched.
    pub fn rotate(&mut self) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        let rotated = self.current_piece.rotated_matrix();
        let previous = std::mem::replace(&mut self.current_piece.matrix, rotated);

        for kick in KICKS {
            if !self.board.collides(&self.current_piece, kick, 0) {
                self.current_piece.x += kick;
                self.events.push(GameEvent::PieceRotated);
                return true;
            }
        }

        trace!(
            "rotation of {:?} at x={} rejected by every kick",
            self.current_piece.kind,
            self.current_piece.x
        );
        self.current_piece.matrix = previous;
        false
    }

    /// Drops the piece as far as it goes, two points per row, and locks it.
    pub fn hard_drop(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        let mut rows = 0;
        while !self.board.collides(&self.current_piece, 0, 1) {
            self.current_piece.y += 1;
            rows += 1;
        }
        self.session.add_points(rows * HARD_DROP_POINTS_PER_ROW);

        self.lock_and_spawn();
        self.publish_stats();
        self.drop_counter = Duration::ZERO;
    }

    // ------------------------------------------------------------------------
    // Lock sequence
    // ------------------------------------------------------------------------

    fn lock_and_spawn(&mut self) {
        self.board.merge(&self.current_piece);
        debug!(
            "locked {:?} at ({}, {})",
            self.current_piece.kind, self.current_piece.x, self.current_piece.y
        );
        self.events.push(GameEvent::PieceLocked);

        self.clear_lines();
        self.spawn_next_piece();
    }

    /// Removes full rows and books the score, level and speed changes.
    pub fn clear_lines(&mut self) -> u32 {
        let cleared = self.board.clear_full_rows();
        let previous_level = self.session.level;

        if self.session.apply_line_clear(cleared) {
            debug!("cleared {} line(s), {} total", cleared, self.session.lines);
            self.events.push(GameEvent::LinesCleared(cleared));
            if self.session.level > previous_level {
                self.events.push(GameEvent::LevelUp(self.session.level));
            }
            self.publish_stats();
        }

        cleared
    }

    /// Promotes the queued piece and draws a new one. Game over when the
    /// promoted piece has no room at its spawn position.
    pub fn spawn_next_piece(&mut self) {
        let next = create_piece(self.piece_provider.as_mut());
        self.current_piece = std::mem::replace(&mut self.next_piece, next);

        if self.board.collides(&self.current_piece, 0, 0) {
            self.phase = Phase::GameOver;
            self.high_score = self.high_score.max(self.session.score);
            info!(
                "game over: score {}, level {}, lines {}",
                self.session.score, self.session.level, self.session.lines
            );
            self.events.push(GameEvent::GameOver {
                score: self.session.score,
            });
        }
    }

    fn publish_stats(&mut self) {
        self.high_score = self.high_score.max(self.session.score);
        self.events.push(GameEvent::StatsChanged(self.stats()));
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn stats(&self) -> Stats {
        Stats {
            score: self.session.score,
            level: self.session.level,
            lines: self.session.lines,
            high_score: self.high_score,
        }
    }

    /// Returns the board with the current piece overlaid
    pub fn render_grid(&self) -> Vec<Vec<CellState>> {
        let mut visual_grid = self.board.rows().to_vec();

        for block in self.current_piece.blocks() {
            if block.y >= 0 && block.y < ROWS as i32 && block.x >= 0 && block.x < COLS as i32 {
                visual_grid[block.y as usize][block.x as usize] =
                    CellState::Filled(self.current_piece.color);
            }
        }

        visual_grid
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

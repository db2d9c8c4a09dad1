//! Game state: board, falling piece, line clear, score, pause and game over.
//!
//! Every change goes through [`Session::apply`], one [`Command`] at a time. Timer ticks and key
//! presses are both commands, so the app loop only has to feed them in order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use tracing::{debug, info};

/// Board height in cells.
pub const BOARD_ROWS: usize = 20;
/// Board width in cells.
pub const BOARD_COLS: usize = 10;
/// Points awarded for every row removed by a clear.
pub const POINTS_PER_LINE: u32 = 100;

/// The seven shape templates. The discriminant is the template index and also picks the colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    I,
    O,
    T,
    L,
    J,
    Z,
    S,
}

impl ShapeKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::L, Self::J, Self::Z, Self::S];

    /// Template index 0..7, used for colour lookup.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Spawn orientation, row by row (1 = occupied).
    fn template(self) -> &'static [&'static [u8]] {
        match self {
            Self::I => &[&[1, 1, 1, 1]],
            Self::O => &[&[1, 1], &[1, 1]],
            Self::T => &[&[1, 1, 1], &[0, 1, 0]],
            Self::L => &[&[1, 1, 1], &[1, 0, 0]],
            Self::J => &[&[1, 1, 1], &[0, 0, 1]],
            Self::Z => &[&[1, 1, 0], &[0, 1, 1]],
            Self::S => &[&[0, 1, 1], &[1, 1, 0]],
        }
    }
}

/// Rectangular matrix of occupied / unoccupied sub-cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    rows: Vec<Vec<bool>>,
}

impl Shape {
    /// Build from 0/1 rows. All rows must have the same length.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].len() == w[1].len()));
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|&v| v != 0).collect())
                .collect(),
        }
    }

    pub fn of(kind: ShapeKind) -> Self {
        Self::from_rows(kind.template())
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Width of the first row; the matrix is rectangular.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    #[inline]
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// Occupied sub-cells as (row, col) offsets from the top-left corner.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &filled)| filled)
                .map(move |(c, _)| (r, c))
        })
    }

    /// Quarter turn clockwise: transpose, then reverse each new row.
    pub fn rotated(&self) -> Self {
        let h = self.height();
        let rows = (0..self.width())
            .map(|c| (0..h).rev().map(|r| self.rows[r][c]).collect())
            .collect();
        Self { rows }
    }
}

/// The falling piece. `row` / `col` locate the shape's top-left corner on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: ShapeKind,
    pub shape: Shape,
    pub row: i32,
    pub col: i32,
}

impl Piece {
    /// New piece at the top row, horizontally centred.
    pub fn spawn(kind: ShapeKind) -> Self {
        let shape = Shape::of(kind);
        let col = (BOARD_COLS / 2) as i32 - (shape.width() / 2) as i32;
        Self {
            kind,
            shape,
            row: 0,
            col,
        }
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            row: self.row + dy,
            col: self.col + dx,
            ..self.clone()
        }
    }

    pub fn rotated(&self) -> Self {
        Self {
            shape: self.shape.rotated(),
            ..self.clone()
        }
    }

    /// Absolute (row, col) of every occupied sub-cell. Rows may be negative.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .cells()
            .map(|(r, c)| (self.row + r as i32, self.col + c as i32))
    }

    /// True if the piece covers board cell (row, col).
    pub fn covers(&self, row: usize, col: usize) -> bool {
        let (r, c) = (row as i32 - self.row, col as i32 - self.col);
        r >= 0 && c >= 0 && self.shape.is_filled(r as usize, c as usize)
    }
}

/// Single board cell: empty, or a locked block remembering which shape left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Block(ShapeKind),
}

type Row = [Cell; BOARD_COLS];

const EMPTY_ROW: Row = [Cell::Empty; BOARD_COLS];

/// Fixed 20x10 grid. rows[0] is the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: VecDeque<Row>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            rows: std::iter::repeat_n(EMPTY_ROW, BOARD_ROWS).collect(),
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.rows.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Out-of-range writes are ignored.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = cell;
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().flatten().all(|c| *c == Cell::Empty)
    }

    /// True if the piece leaves the board sideways or through the floor, or overlaps a block.
    /// Cells above the top edge (negative row) are only checked against the side walls.
    pub fn collides(&self, piece: &Piece) -> bool {
        for (row, col) in piece.cells() {
            if col < 0 || col >= BOARD_COLS as i32 || row >= BOARD_ROWS as i32 {
                return true;
            }
            if row < 0 {
                continue;
            }
            if let Some(Cell::Block(_)) = self.get(row as usize, col as usize) {
                return true;
            }
        }
        false
    }

    /// Write the piece into the grid. Sub-cells above the top edge are dropped.
    pub fn merge(&mut self, piece: &Piece) {
        for (row, col) in piece.cells() {
            if row >= 0 && col >= 0 {
                debug_assert_eq!(self.get(row as usize, col as usize), Some(Cell::Empty));
                self.set(row as usize, col as usize, Cell::Block(piece.kind));
            }
        }
    }

    /// Remove every full row and refill from the top. Returns the number of rows removed.
    pub fn clear_full_rows(&mut self) -> u32 {
        let before = self.rows.len();
        self.rows.retain(|row| row.contains(&Cell::Empty));
        let cleared = before - self.rows.len();
        for _ in 0..cleared {
            self.rows.push_front(EMPTY_ROW);
        }
        cleared as u32
    }
}

/// Everything that can happen to a session: the four moves, the timer, and the two controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Left,
    Right,
    Down,
    Rotate,
    Tick,
    TogglePause,
    Reset,
}

/// Read-only view handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub board: &'a Board,
    pub piece: Option<&'a Piece>,
    pub score: u32,
    pub paused: bool,
    pub game_over: bool,
}

impl Snapshot<'_> {
    /// Board cell with the falling piece drawn over empty cells.
    pub fn display_cell(&self, row: usize, col: usize) -> Cell {
        match self.board.get(row, col) {
            Some(Cell::Block(kind)) => Cell::Block(kind),
            _ => match self.piece {
                Some(p) if p.covers(row, col) => Cell::Block(p.kind),
                _ => Cell::Empty,
            },
        }
    }
}

/// One game: board, current piece, score and the two flags.
#[derive(Debug, Clone)]
pub struct Session {
    board: Board,
    piece: Option<Piece>,
    score: u32,
    game_over: bool,
    paused: bool,
    rng: StdRng,
}

impl Session {
    /// New session seeded from the OS, with the first piece already falling.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Reproducible session: the same seed gives the same sequence of pieces.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        let mut session = Self {
            board: Board::new(),
            piece: None,
            score: 0,
            game_over: false,
            paused: false,
            rng,
        };
        session.spawn();
        session
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece(&self) -> Option<&Piece> {
        self.piece.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            board: &self.board,
            piece: self.piece.as_ref(),
            score: self.score,
            paused: self.paused,
            game_over: self.game_over,
        }
    }

    /// Run one command to completion. Moves and ticks are ignored while paused or after game
    /// over; pause and reset always go through.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Reset => self.reset(),
            Command::TogglePause => self.toggle_pause(),
            _ if self.paused || self.game_over => {}
            Command::Left => self.move_by(-1, 0),
            Command::Right => self.move_by(1, 0),
            Command::Down => self.move_by(0, 1),
            Command::Rotate => self.rotate(),
            Command::Tick => self.tick(),
        }
    }

    /// By-value form of [`Session::apply`].
    #[must_use]
    pub fn step(mut self, command: Command) -> Self {
        self.apply(command);
        self
    }

    /// Timer step: spawn if nothing is falling, otherwise drop one row.
    fn tick(&mut self) {
        if self.paused || self.game_over {
            return;
        }
        if self.piece.is_none() {
            self.spawn();
        } else {
            self.move_by(0, 1);
        }
    }

    /// Pick a random template and place it at the top. Ends the game if it does not fit.
    /// Only runs when nothing is falling and the session is live.
    fn spawn(&mut self) {
        if self.piece.is_some() || self.paused || self.game_over {
            return;
        }
        let kind = ShapeKind::ALL[self.rng.gen_range(0..ShapeKind::ALL.len())];
        self.spawn_kind(kind);
    }

    fn spawn_kind(&mut self, kind: ShapeKind) {
        let piece = Piece::spawn(kind);
        if self.board.collides(&piece) {
            info!(?kind, score = self.score, "spawn blocked, game over");
            self.piece = None;
            self.game_over = true;
        } else {
            debug!(?kind, col = piece.col, "spawned piece");
            self.piece = Some(piece);
        }
    }

    /// Translate the piece. A blocked downward step locks it; a blocked sideways step does nothing.
    fn move_by(&mut self, dx: i32, dy: i32) {
        let Some(piece) = self.piece.as_ref() else {
            return;
        };
        let candidate = piece.translated(dx, dy);
        if !self.board.collides(&candidate) {
            self.piece = Some(candidate);
        } else if dy > 0 {
            self.lock_piece();
        }
    }

    /// Rotate in place. No wall kicks: a rotation that would collide is dropped.
    fn rotate(&mut self) {
        let Some(piece) = self.piece.as_ref() else {
            return;
        };
        let candidate = piece.rotated();
        if !self.board.collides(&candidate) {
            self.piece = Some(candidate);
        }
    }

    /// Merge, clear, spawn.
    fn lock_piece(&mut self) {
        let Some(piece) = self.piece.take() else {
            return;
        };
        debug!(kind = ?piece.kind, row = piece.row, col = piece.col, "locking piece");
        self.board.merge(&piece);
        self.clear_lines();
        self.spawn();
    }

    /// Remove full rows and score them. Returns the number of rows removed.
    fn clear_lines(&mut self) -> u32 {
        let cleared = self.board.clear_full_rows();
        if cleared > 0 {
            self.score += cleared * POINTS_PER_LINE;
            info!(cleared, score = self.score, "cleared lines");
        }
        cleared
    }

    pub fn reset(&mut self) {
        info!(final_score = self.score, "reset");
        self.board = Board::new();
        self.piece = None;
        self.score = 0;
        self.game_over = false;
        self.paused = false;
        self.spawn();
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        debug!(paused = self.paused, "toggled pause");
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

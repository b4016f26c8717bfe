use std::collections::VecDeque;

use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use ratatui::style::Color;

use crate::games::{Action, Game, GameContext, Phase, Session};
use crate::input::{Channel, InputEvent, Subscription};
use crate::surface::Surface;

const COLS: usize = 10;
const ROWS: usize = 20;
const BASE_DROP_INTERVAL: u32 = 60;
const MIN_DROP_INTERVAL: u32 = 10;
/// Points for clearing 1..=4 rows at once.
const LINE_POINTS: [u32; 5] = [0, 100, 300, 500, 800];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    L,
    J,
    S,
    Z,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::L,
        PieceKind::J,
        PieceKind::S,
        PieceKind::Z,
    ];

    fn shape(&self) -> Shape {
        let rows: &[&[u8]] = match self {
            PieceKind::I => &[&[1, 1, 1, 1]],
            PieceKind::O => &[&[1, 1], &[1, 1]],
            PieceKind::T => &[&[0, 1, 0], &[1, 1, 1]],
            PieceKind::L => &[&[1, 0, 0], &[1, 1, 1]],
            PieceKind::J => &[&[0, 0, 1], &[1, 1, 1]],
            PieceKind::S => &[&[0, 1, 1], &[1, 1, 0]],
            PieceKind::Z => &[&[1, 1, 0], &[0, 1, 1]],
        };
        rows.iter().map(|r| r.iter().map(|&v| v == 1).collect()).collect()
    }

    fn color(&self) -> Color {
        match self {
            PieceKind::I => Color::Rgb(0, 255, 255),
            PieceKind::O => Color::Rgb(255, 255, 0),
            PieceKind::T => Color::Rgb(255, 0, 255),
            PieceKind::L => Color::Rgb(255, 127, 0),
            PieceKind::J => Color::Rgb(0, 0, 255),
            PieceKind::S => Color::Rgb(0, 255, 0),
            PieceKind::Z => Color::Rgb(255, 0, 0),
        }
    }
}

type Shape = Vec<Vec<bool>>;

/// Counter-clockwise quarter turn: transpose, then reverse the rows.
fn rotate(shape: &Shape) -> Shape {
    let width = shape[0].len();
    (0..width)
        .rev()
        .map(|c| shape.iter().map(|row| row[c]).collect())
        .collect()
}

/// 7-piece randomiser: every refill is a fresh shuffle of all kinds.
pub struct Bag {
    queue: VecDeque<PieceKind>,
}

impl Bag {
    pub fn new() -> Self {
        Self { queue: VecDeque::with_capacity(PieceKind::ALL.len()) }
    }

    fn refill(&mut self, rng: &mut StdRng) {
        let mut kinds = PieceKind::ALL;
        kinds.shuffle(rng);
        self.queue.extend(kinds);
    }

    pub fn draw(&mut self, rng: &mut StdRng) -> PieceKind {
        let kind = self.peek(rng);
        self.queue.pop_front();
        kind
    }

    pub fn peek(&mut self, rng: &mut StdRng) -> PieceKind {
        if self.queue.is_empty() {
            self.refill(rng);
        }
        self.queue[0]
    }
}

#[derive(Clone, Debug)]
struct Piece {
    kind: PieceKind,
    shape: Shape,
    x: i32,
    y: i32,
}

impl Piece {
    fn spawn(kind: PieceKind) -> Self {
        let shape = kind.shape();
        let x = (COLS / 2) as i32 - (shape[0].len() / 2) as i32;
        Self { kind, shape, x, y: 0 }
    }

    /// Grid coordinates of every filled cell at offset (x, y).
    fn cells_at<'a>(shape: &'a Shape, x: i32, y: i32) -> impl Iterator<Item = (i32, i32)> + 'a {
        shape.iter().enumerate().flat_map(move |(r, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, &filled)| filled)
                .map(move |(c, _)| (x + c as i32, y + r as i32))
        })
    }
}

type Board = Vec<Vec<Option<Color>>>;

pub struct Tetris {
    session: Session,
    board: Board,
    piece: Piece,
    next: PieceKind,
    bag: Bag,
    drop_counter: u32,
    drop_interval: u32,
    lines: u32,
    rng: StdRng,
    keys: Subscription,
}

impl Tetris {
    pub fn new(ctx: GameContext) -> Self {
        let mut rng = ctx.rng;
        let mut bag = Bag::new();
        let first = bag.draw(&mut rng);
        let next = bag.peek(&mut rng);
        Self {
            session: Session::new(ctx.size, Phase::Running, ctx.callbacks),
            board: vec![vec![None; COLS]; ROWS],
            piece: Piece::spawn(first),
            next,
            bag,
            drop_counter: 0,
            drop_interval: BASE_DROP_INTERVAL,
            lines: 0,
            rng,
            keys: ctx.hub.subscribe(Channel::Keyboard),
        }
    }

    fn collides(&self, shape: &Shape, x: i32, y: i32) -> bool {
        Piece::cells_at(shape, x, y).any(|(cx, cy)| {
            cx < 0
                || cy < 0
                || cx >= COLS as i32
                || cy >= ROWS as i32
                || self.board[cy as usize][cx as usize].is_some()
        })
    }

    fn shift(&mut self, dx: i32) {
        if !self.collides(&self.piece.shape, self.piece.x + dx, self.piece.y) {
            self.piece.x += dx;
        }
    }

    /// Rotate in place, else kicked one column left, else one right.
    fn rotate(&mut self) {
        let rotated = rotate(&self.piece.shape);
        for kick in [0, -1, 1] {
            if !self.collides(&rotated, self.piece.x + kick, self.piece.y) {
                self.piece.x += kick;
                self.piece.shape = rotated;
                return;
            }
        }
    }

    fn soft_drop(&mut self) {
        if !self.collides(&self.piece.shape, self.piece.x, self.piece.y + 1) {
            self.piece.y += 1;
        } else {
            self.lock();
        }
    }

    fn hard_drop(&mut self) {
        self.piece.y = self.ghost_y();
        self.lock();
    }

    /// Row the current piece would land on.
    fn ghost_y(&self) -> i32 {
        let mut y = self.piece.y;
        while !self.collides(&self.piece.shape, self.piece.x, y + 1) {
            y += 1;
        }
        y
    }

    fn lock(&mut self) {
        let color = self.piece.kind.color();
        // Cells above the top are dropped
        for (cx, cy) in Piece::cells_at(&self.piece.shape, self.piece.x, self.piece.y) {
            if cx >= 0 && cy >= 0 && (cx as usize) < COLS && (cy as usize) < ROWS {
                self.board[cy as usize][cx as usize] = Some(color);
            }
        }
        self.clear_lines();
        self.spawn();
    }

    /// Remove full rows, pad the top with empty ones, and score.
    fn clear_lines(&mut self) -> usize {
        self.board.retain(|row| row.iter().any(|c| c.is_none()));
        let cleared = ROWS - self.board.len();
        for _ in 0..cleared {
            self.board.insert(0, vec![None; COLS]);
        }
        if cleared > 0 {
            self.lines += cleared as u32;
            self.session.add_points(LINE_POINTS[cleared.min(4)]);
            // Two frames faster per 500 points
            let steps = self.session.score() / 500;
            self.drop_interval = BASE_DROP_INTERVAL.saturating_sub(steps * 2).max(MIN_DROP_INTERVAL);
            log::debug!("tetris: cleared {cleared} rows, interval now {}", self.drop_interval);
        }
        cleared
    }

    fn spawn(&mut self) {
        let kind = self.bag.draw(&mut self.rng);
        self.next = self.bag.peek(&mut self.rng);
        self.piece = Piece::spawn(kind);
        if self.collides(&self.piece.shape, self.piece.x, self.piece.y) {
            log::info!("tetris: stack topped out after {} lines", self.lines);
            self.session.end();
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left => self.shift(-1),
            KeyCode::Right => self.shift(1),
            KeyCode::Down => self.soft_drop(),
            KeyCode::Up => self.rotate(),
            KeyCode::Char(' ') => self.hard_drop(),
            _ => {}
        }
    }

    fn block_size(&self) -> f32 {
        (self.session.size.height / ROWS as u32) as f32
    }
}

impl Game for Tetris {
    fn update(&mut self) {
        // Keys; a locked piece can top out mid-batch
        for event in self.keys.drain() {
            if self.session.is_over() {
                break;
            }
            if let InputEvent::Key(key) = event {
                self.handle_key(key.code);
            }
        }
        if self.session.is_over() {
            return;
        }
        // Gravity
        self.drop_counter += 1;
        if self.drop_counter > self.drop_interval {
            self.soft_drop();
            self.drop_counter = 0;
        }
    }

    fn draw(&self, surface: &mut Surface) {
        let bs = self.block_size();
        let board_w = COLS as f32 * bs;
        let left = (self.session.size.w() - board_w) / 2.0;
        let height = self.session.size.h();

        // Well
        surface.fill_rect(left, 0.0, board_w, height, Color::Rgb(14, 14, 30));

        // Locked cells
        for (r, row) in self.board.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                if let Some(color) = cell {
                    surface.fill_rect(left + c as f32 * bs, r as f32 * bs, bs - 1.0, bs - 1.0, *color);
                }
            }
        }

        // Ghost, then the falling piece over it
        let ghost = self.ghost_y();
        for (cx, cy) in Piece::cells_at(&self.piece.shape, self.piece.x, ghost) {
            surface.stroke_rect(left + cx as f32 * bs, cy as f32 * bs, bs - 1.0, bs - 1.0, Color::Rgb(90, 90, 110));
        }
        let color = self.piece.kind.color();
        for (cx, cy) in Piece::cells_at(&self.piece.shape, self.piece.x, self.piece.y) {
            surface.fill_rect(left + cx as f32 * bs, cy as f32 * bs, bs - 1.0, bs - 1.0, color);
        }

        // Next piece, to the right of the well.
        let px = left + board_w + bs;
        surface.text(px + bs * 2.0, bs, "NEXT", Color::Rgb(120, 120, 140));
        let next = self.next.shape();
        for (cx, cy) in Piece::cells_at(&next, 0, 0) {
            surface.fill_rect(
                px + cx as f32 * bs,
                bs * 2.0 + cy as f32 * bs,
                bs - 1.0,
                bs - 1.0,
                self.next.color(),
            );
        }
    }

    fn action(&mut self, action: Action) {
        if self.session.is_over() {
            return;
        }
        match action {
            Action::Left => self.shift(-1),
            Action::Right => self.shift(1),
            Action::Down => self.soft_drop(),
            Action::Action | Action::Up => self.rotate(),
        }
    }

    fn cleanup(&mut self) {
        self.keys.release();
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::games::testing::*;
    use crate::input::InputHub;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn tetris(hub: &InputHub, rec: &Recorder, seed: u64) -> Tetris {
        Tetris::new(context(hub, rec, seed))
    }

    fn filled(board: &Board) -> usize {
        board.iter().flatten().filter(|c| c.is_some()).count()
    }

    #[test]
    fn bag_yields_permutations() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut bag = Bag::new();
        for _ in 0..10 {
            let round: HashSet<PieceKind> = (0..7).map(|_| bag.draw(&mut rng)).collect();
            assert_eq!(round.len(), 7);
        }
    }

    #[test]
    fn peek_matches_next_draw() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut bag = Bag::new();
        for _ in 0..20 {
            let seen = bag.peek(&mut rng);
            assert_eq!(bag.draw(&mut rng), seen);
        }
    }

    #[test]
    fn rotation_is_counter_clockwise() {
        let t = PieceKind::T.shape();
        let once = rotate(&t);
        assert_eq!(once, vec![vec![false, true], vec![true, true], vec![false, true]]);
        let full = rotate(&rotate(&rotate(&once)));
        assert_eq!(full, t);
    }

    #[test]
    fn spawn_is_centred() {
        let piece = Piece::spawn(PieceKind::I);
        assert_eq!((piece.x, piece.y), (3, 0));
        let piece = Piece::spawn(PieceKind::O);
        assert_eq!(piece.x, 4);
    }

    #[test]
    fn moves_stop_at_walls() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut t = tetris(&hub, &rec, 1);
        for _ in 0..20 {
            t.action(Action::Left);
        }
        assert_eq!(t.piece.x, 0);
        for _ in 0..20 {
            t.action(Action::Right);
        }
        let width = t.piece.shape[0].len() as i32;
        assert_eq!(t.piece.x + width, COLS as i32);
    }

    #[test]
    fn rotation_kicks_off_the_wall() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut t = tetris(&hub, &rec, 1);
        t.piece = Piece::spawn(PieceKind::I);
        t.piece.y = 5;
        t.rotate();
        assert_eq!(t.piece.shape.len(), 4);
        t.piece.x = COLS as i32 - 3;
        t.rotate();
        // Horizontal I overhangs the right wall in place; kicked one left.
        assert_eq!(t.piece.shape.len(), 1);
        assert_eq!(t.piece.x, COLS as i32 - 4);
    }

    #[test]
    fn rotation_is_rejected_when_boxed_in() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut t = tetris(&hub, &rec, 1);
        t.piece = Piece::spawn(PieceKind::I);
        t.piece.y = 10;
        for r in 0..ROWS {
            if r != 10 {
                t.board[r] = vec![Some(Color::Gray); COLS];
            }
        }
        let before = t.piece.shape.clone();
        t.rotate();
        assert_eq!(t.piece.shape, before);
    }

    #[test]
    fn gravity_waits_for_interval() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut t = tetris(&hub, &rec, 1);
        for _ in 0..BASE_DROP_INTERVAL {
            t.update();
        }
        assert_eq!(t.piece.y, 0);
        t.update();
        assert_eq!(t.piece.y, 1);
    }

    #[test]
    fn clearing_rows_scores_by_table() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut t = tetris(&hub, &rec, 1);
        for r in ROWS - 4..ROWS {
            t.board[r] = vec![Some(Color::Gray); COLS];
        }
        t.board[ROWS - 5][0] = Some(Color::Red);
        assert_eq!(t.clear_lines(), 4);
        assert_eq!(t.board.len(), ROWS);
        assert_eq!(t.board[ROWS - 1][0], Some(Color::Red));
        assert_eq!(filled(&t.board), 1);
        assert_eq!(rec.scores(), vec![800]);
        assert_eq!(t.drop_interval, 58);
    }

    #[test]
    fn each_clear_count_uses_its_points() {
        for (n, points) in [(1, 100), (2, 300), (3, 500)] {
            let hub = InputHub::new();
            let rec = Recorder::default();
            let mut t = tetris(&hub, &rec, 1);
            for r in ROWS - n..ROWS {
                t.board[r] = vec![Some(Color::Gray); COLS];
            }
            t.clear_lines();
            assert_eq!(rec.scores(), vec![points]);
        }
    }

    #[test]
    fn drop_interval_has_a_floor() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut t = tetris(&hub, &rec, 1);
        t.session.add_points(100_000);
        t.board[ROWS - 1] = vec![Some(Color::Gray); COLS];
        t.clear_lines();
        assert_eq!(t.drop_interval, MIN_DROP_INTERVAL);
    }

    #[test]
    fn hard_drop_locks_on_floor() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut t = tetris(&hub, &rec, 1);
        t.piece = Piece::spawn(PieceKind::O);
        let expected_next = t.next;
        t.hard_drop();
        assert_eq!(t.board[ROWS - 1][4], Some(PieceKind::O.color()));
        assert_eq!(t.board[ROWS - 2][5], Some(PieceKind::O.color()));
        assert_eq!(filled(&t.board), 4);
        assert_eq!(t.piece.kind, expected_next);
        assert_eq!(t.piece.y, 0);
    }

    #[test]
    fn ghost_matches_hard_drop() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut t = tetris(&hub, &rec, 5);
        t.board[ROWS - 1] = vec![Some(Color::Gray); COLS - 1]
            .into_iter()
            .chain([None])
            .collect();
        let ghost = t.ghost_y();
        let shape = t.piece.shape.clone();
        let x = t.piece.x;
        t.hard_drop();
        for (cx, cy) in Piece::cells_at(&shape, x, ghost) {
            assert!(t.board[cy as usize][cx as usize].is_some());
        }
    }

    #[test]
    fn blocked_spawn_ends_session() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut t = tetris(&hub, &rec, 1);
        for r in 0..2 {
            for c in 0..COLS {
                if c % 2 == 0 {
                    t.board[r][c] = Some(Color::Gray);
                }
            }
        }
        t.spawn();
        assert!(t.session.is_over());
        t.update();
        assert_eq!(rec.game_overs(), 1);
    }

    #[test]
    fn keys_drive_the_piece() {
        let hub = InputHub::new();
        let rec = Recorder::default();
        let mut t = tetris(&hub, &rec, 1);
        let x0 = t.piece.x;
        hub.publish(InputEvent::Key(crossterm::event::KeyEvent::from(KeyCode::Left)));
        t.update();
        assert_eq!(t.piece.x, x0 - 1);
        hub.publish(InputEvent::Key(crossterm::event::KeyEvent::from(KeyCode::Char(' '))));
        t.update();
        assert!(filled(&t.board) == 4 || t.session.is_over());
    }

    proptest! {
        #[test]
        fn play_never_leaves_cells_outside_or_changes_row_count(
            seed in any::<u64>(),
            moves in prop::collection::vec(0u8..6, 1..300),
        ) {
            let hub = InputHub::new();
            let rec = Recorder::default();
            let mut t = tetris(&hub, &rec, seed);
            for m in moves {
                if t.session.is_over() {
                    break;
                }
                match m {
                    0 => t.action(Action::Left),
                    1 => t.action(Action::Right),
                    2 => t.action(Action::Action),
                    3 => t.action(Action::Down),
                    4 => t.hard_drop(),
                    _ => t.update(),
                }
                prop_assert_eq!(t.board.len(), ROWS);
                prop_assert!(t.board.iter().all(|row| row.len() == COLS));
                if !t.session.is_over() {
                    prop_assert!(!t.collides(&t.piece.shape, t.piece.x, t.piece.y));
                }
            }
            prop_assert!(t.board.iter().all(|row| row.iter().any(|c| c.is_none())));
        }

        #[test]
        fn bag_rounds_stay_permutations(seed in any::<u64>(), rounds in 1usize..20) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut bag = Bag::new();
            let draws: Vec<PieceKind> = (0..rounds * 7).map(|_| bag.draw(&mut rng)).collect();
            for chunk in draws.chunks(7) {
                let set: HashSet<_> = chunk.iter().collect();
                prop_assert_eq!(set.len(), 7);
            }
        }
    }
}

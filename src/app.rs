use std::cell::RefCell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::layout::{Position, Rect};

use crate::driver::GameLoop;
use crate::games::{Action, ActiveGame, Callbacks, GameContext, GameId};
use crate::i18n::ArcadeText;
use crate::input::{InputEvent, InputHub};
use crate::surface::{self, Size, Surface};

/// Score and game-over flag as reported by the live title's callbacks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hud {
    pub score: u32,
    pub game_over: bool,
}

pub struct PadButton {
    pub label: &'static str,
    pub action: Action,
}

const fn pad(label: &'static str, action: Action) -> PadButton {
    PadButton { label, action }
}

const SNAKE_PAD: [PadButton; 4] = [
    pad("←", Action::Left),
    pad("↑", Action::Up),
    pad("→", Action::Right),
    pad("↓", Action::Down),
];
const PONG_PAD: [PadButton; 3] = [pad("↑", Action::Up), pad("●", Action::Action), pad("↓", Action::Down)];
const BREAKER_PAD: [PadButton; 3] = [pad("←", Action::Left), pad("●", Action::Action), pad("→", Action::Right)];
const INVADERS_PAD: [PadButton; 3] = [pad("←", Action::Left), pad("🔥", Action::Action), pad("→", Action::Right)];
const TETRIS_PAD: [PadButton; 4] = [
    pad("←", Action::Left),
    pad("↻", Action::Action),
    pad("→", Action::Right),
    pad("↓", Action::Down),
];

/// On-screen buttons for a title, left to right.
pub fn control_pad(id: GameId) -> &'static [PadButton] {
    match id {
        GameId::Snake => &SNAKE_PAD,
        GameId::Pong => &PONG_PAD,
        GameId::Breaker => &BREAKER_PAD,
        GameId::Invaders => &INVADERS_PAD,
        GameId::Tetris => &TETRIS_PAD,
    }
}

/// Clickable areas from the last rendered frame.
#[derive(Default)]
pub struct Regions {
    pub canvas: Rect,
    pub tiles: Vec<(Rect, GameId)>,
    pub pad: Vec<(Rect, Action)>,
    pub exit: Rect,
    pub retry: Rect,
}

pub struct App {
    pub should_quit: bool,
    pub regions: Regions,
    text: &'static ArcadeText,
    size: Size,
    hub: InputHub,
    hud: Rc<RefCell<Hud>>,
    selected: GameId,
    active: Option<GameLoop>,
    rng: StdRng,
}

impl App {
    pub fn new(text: &'static ArcadeText, size: Size, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            should_quit: false,
            regions: Regions::default(),
            text,
            size,
            hub: InputHub::new(),
            hud: Rc::default(),
            selected: GameId::Snake,
            active: None,
            rng,
        }
    }

    pub fn text(&self) -> &'static ArcadeText {
        self.text
    }

    pub fn selected(&self) -> GameId {
        self.selected
    }

    /// Title being played, `None` on the menu.
    pub fn active_game(&self) -> Option<GameId> {
        self.active.as_ref().map(GameLoop::id)
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.active.as_ref().map(GameLoop::surface)
    }

    pub fn score(&self) -> u32 {
        self.hud.borrow().score
    }

    pub fn is_game_over(&self) -> bool {
        self.hud.borrow().game_over
    }

    pub fn start_game(&mut self, id: GameId) {
        self.teardown();
        *self.hud.borrow_mut() = Hud::default();
        self.selected = id;

        let callbacks = self.callbacks(id);
        let rng = StdRng::seed_from_u64(self.rng.gen());
        let ctx = GameContext { size: self.size, hub: &self.hub, callbacks, text: self.text, rng };
        let game = ActiveGame::new(id, ctx);
        self.active = Some(GameLoop::new(game, self.size));
        log::info!("started {id:?}");
    }

    pub fn back_to_menu(&mut self) {
        if let Some(id) = self.active_game() {
            log::info!("left {id:?} with {} points", self.score());
        }
        self.teardown();
        *self.hud.borrow_mut() = Hud::default();
    }

    /// Fresh session of the title that was just played.
    pub fn retry(&mut self) {
        if let Some(id) = self.active_game() {
            self.start_game(id);
        }
    }

    pub fn next(&mut self) {
        self.selected = GameId::from_index(self.selected.index() + 1);
    }

    pub fn prev(&mut self) {
        let len = GameId::all().len();
        self.selected = GameId::from_index(self.selected.index() + len - 1);
    }

    /// Pointer pick on the carousel: first click selects, second starts.
    pub fn pick(&mut self, id: GameId) {
        if id == self.selected {
            self.start_game(id);
        } else {
            self.selected = id;
        }
    }

    fn teardown(&mut self) {
        if let Some(lp) = self.active.take() {
            lp.shutdown();
            log::debug!("{} input listeners after teardown", self.hub.listener_count());
        }
    }

    fn callbacks(&self, id: GameId) -> Callbacks {
        let score_hud = Rc::clone(&self.hud);
        let over_hud = Rc::clone(&self.hud);
        Callbacks::new(
            move |total| score_hud.borrow_mut().score = total,
            move |final_score| {
                let mut hud = over_hud.borrow_mut();
                hud.score = final_score;
                hud.game_over = true;
                log::info!("{id:?} over, final score {final_score}");
            },
        )
    }

    pub fn on_tick(&mut self) {
        let hud = &self.hud;
        if let Some(lp) = self.active.as_mut().filter(|lp| lp.is_running()) {
            lp.tick(|| hud.borrow().game_over);
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.active.is_none() {
            match key.code {
                KeyCode::Left => self.prev(),
                KeyCode::Right => self.next(),
                KeyCode::Enter | KeyCode::Char(' ') => self.start_game(self.selected),
                KeyCode::Char(c @ '1'..='5') => {
                    self.start_game(GameId::from_index(c as usize - '1' as usize));
                }
                KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.back_to_menu(),
            KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') if self.is_game_over() => {
                self.retry();
            }
            // A frozen game no longer drains its mailboxes.
            _ if self.is_game_over() => {}
            _ => {
                self.hub.publish(InputEvent::Key(key));
            }
        }
    }

    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        let pos = Position::new(mouse.column, mouse.row);
        let click = matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left));

        if self.active.is_none() {
            if click {
                let hit = self.regions.tiles.iter().find(|(r, _)| r.contains(pos)).map(|(_, id)| *id);
                if let Some(id) = hit {
                    self.pick(id);
                }
            }
            return;
        }

        if click {
            if self.regions.exit.contains(pos) {
                self.back_to_menu();
                return;
            }
            if self.is_game_over() {
                if self.regions.retry.contains(pos) {
                    self.retry();
                }
                return;
            }
            let pressed = self.regions.pad.iter().find(|(r, _)| r.contains(pos)).map(|(_, a)| *a);
            if let (Some(action), Some(lp)) = (pressed, self.active.as_mut()) {
                lp.action(action);
                return;
            }
        }

        if self.is_game_over() {
            return;
        }
        let tracks = click || matches!(mouse.kind, MouseEventKind::Moved | MouseEventKind::Drag(MouseButton::Left));
        if tracks {
            if let Some((x, y)) = surface::cell_to_logical(self.regions.canvas, self.size, mouse.column, mouse.row) {
                self.hub.publish(InputEvent::Pointer { x, y });
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn listeners(&self) -> usize {
        self.hub.listener_count()
    }
}

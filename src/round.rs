use crossterm::event::KeyCode;
use std::io::{self, Stdout};
use std::thread;
use std::time::{Duration, Instant};

use crate::board::{Board, CellKind, Dir, Pos};
use crate::input::InputManager;
use crate::render::Renderer;

const FRAME_MS: u64 = 33;
const MESSAGE_MS: u64 = 1200;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    Moved,
    Blocked,
    NeedKey,
    PickedKey,
    Escaped,
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Outcome {
    Escaped { seconds: f64 },
    GaveUp,
}

pub struct Round {
    board: Board,
    player: Pos,
    got_key: bool,
}

impl Round {
    pub fn new(board: Board, player: Pos) -> Self {
        Self {
            board,
            player,
            got_key: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self) -> Pos {
        self.player
    }

    pub fn got_key(&self) -> bool {
        self.got_key
    }

    pub fn try_move(&mut self, dir: Dir) -> MoveOutcome {
        let Some(target) = self.board.neighbor(self.player, dir) else {
            return MoveOutcome::Blocked;
        };
        match self.board.kind_at(target) {
            CellKind::Wall => MoveOutcome::Blocked,
            CellKind::Door if !self.got_key => MoveOutcome::NeedKey,
            CellKind::Door => {
                self.shift_to(target);
                MoveOutcome::Escaped
            }
            CellKind::Key => {
                // Lift the key off its floor tile before stepping onto it.
                self.board.cell_mut(target).recover();
                self.shift_to(target);
                self.got_key = true;
                MoveOutcome::PickedKey
            }
            CellKind::Floor => {
                self.shift_to(target);
                MoveOutcome::Moved
            }
            CellKind::Player => MoveOutcome::Blocked,
        }
    }

    fn shift_to(&mut self, target: Pos) {
        self.board.cell_mut(target).set_kind(CellKind::Player);
        self.board.cell_mut(self.player).recover();
        self.player = target;
    }
}

fn dir_for_key(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('w') => Some(Dir::Up),
        KeyCode::Down | KeyCode::Char('s') => Some(Dir::Down),
        KeyCode::Left | KeyCode::Char('a') => Some(Dir::Left),
        KeyCode::Right | KeyCode::Char('d') => Some(Dir::Right),
        _ => None,
    }
}

pub fn play(
    stdout: &mut Stdout,
    input: &InputManager,
    round: &mut Round,
    difficulty: u8,
) -> io::Result<Outcome> {
    let mut renderer = Renderer::new(round.board().size());
    let mut message: Option<(String, Instant)> = None;
    let start = Instant::now();

    loop {
        let expired = matches!(&message, Some((_, shown)) if shown.elapsed() >= Duration::from_millis(MESSAGE_MS));
        if expired {
            message = None;
        }
        let text = message.as_ref().map(|(m, _)| m.as_str());
        renderer.draw(stdout, round, difficulty, start.elapsed(), text)?;

        if let Some(code) = input.poll() {
            if code == KeyCode::Esc {
                return Ok(Outcome::GaveUp);
            }
            if let Some(dir) = dir_for_key(code) {
                match round.try_move(dir) {
                    MoveOutcome::Escaped => {
                        let seconds = start.elapsed().as_secs_f64();
                        return Ok(Outcome::Escaped {
                            seconds: (seconds * 100.0).round() / 100.0,
                        });
                    }
                    MoveOutcome::NeedKey => {
                        message = Some(("First pick up the key".to_string(), Instant::now()));
                    }
                    _ => {}
                }
            }
        }

        thread::sleep(Duration::from_millis(FRAME_MS));
    }
}

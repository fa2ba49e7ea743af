use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use std::io::{self, Stdout, Write};
use std::thread;
use std::time::Duration;

use crate::board::{CellKind, Pos};
use crate::round::Round;

const CELL_W: usize = 2;
const DEFAULT_TEXT_DELAY_MS: u64 = 15;

fn vision_radius(difficulty: u8) -> f64 {
    match difficulty {
        1 => 4.0,
        2 => 6.0,
        3 => 2.5,
        4 => 2.0,
        _ => 1.4,
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Hidden,
    Wall,
    Floor,
    Door,
    Key,
    Player,
}

#[derive(Clone, Copy, PartialEq)]
struct RenderCell {
    glyph: Glyph,
    color: Color,
}

pub struct Renderer {
    last: Vec<RenderCell>,
    last_hud: String,
    last_msg: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(size: usize) -> Self {
        Self {
            last: vec![
                RenderCell {
                    glyph: Glyph::Hidden,
                    color: Color::Reset,
                };
                size * size
            ],
            last_hud: String::new(),
            last_msg: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn draw(
        &mut self,
        stdout: &mut Stdout,
        round: &Round,
        difficulty: u8,
        elapsed: Duration,
        message: Option<&str>,
    ) -> io::Result<()> {
        let size = round.board().size();
        let needed_h = (size + 3) as u16;
        let needed_w = (size * CELL_W).max(60) as u16;

        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            stdout.queue(MoveTo(0, 0))?;
            stdout.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            );
            stdout.queue(Print(msg))?;
            stdout.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.needs_full {
            stdout.queue(Clear(ClearType::All))?;
        }

        let hud = format!(
            "Size: {}x{}  Difficulty: {}  Time: {:>6.1}s  (Esc to give up)",
            size,
            size,
            difficulty,
            elapsed.as_secs_f64()
        );
        if self.needs_full || hud != self.last_hud {
            stdout.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            stdout.queue(SetForegroundColor(Color::White))?;
            stdout.queue(Clear(ClearType::CurrentLine))?;
            stdout.queue(Print(&hud))?;
            stdout.queue(ResetColor)?;
            self.last_hud = hud;
        }

        for y in 0..size {
            for x in 0..size {
                let cell = cell_for(round, Pos { x, y }, difficulty);
                let idx = y * size + x;
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(stdout, x, y, cell)?;
                }
            }
        }

        let msg = message.unwrap_or("");
        if self.needs_full || msg != self.last_msg {
            stdout.queue(MoveTo(self.origin_x, self.origin_y + size as u16 + 1))?;
            stdout.queue(Clear(ClearType::CurrentLine))?;
            stdout.queue(SetForegroundColor(Color::Yellow))?;
            stdout.queue(Print(msg))?;
            stdout.queue(ResetColor)?;
            self.last_msg = msg.to_string();
        }

        self.needs_full = false;
        stdout.flush()?;
        Ok(())
    }

    fn draw_cell(&self, stdout: &mut Stdout, x: usize, y: usize, cell: RenderCell) -> io::Result<()> {
        let text = match cell.glyph {
            Glyph::Hidden => "  ",
            Glyph::Wall => "██",
            Glyph::Floor => "· ",
            Glyph::Door => "░░",
            Glyph::Key => "K ",
            Glyph::Player => "X ",
        };
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        stdout.queue(MoveTo(x_pos, y_pos))?;
        stdout.queue(SetForegroundColor(cell.color))?;
        stdout.queue(Print(text))?;
        let w = unicode_width::UnicodeWidthStr::width(text);
        for _ in w..CELL_W {
            stdout.queue(Print(' '))?;
        }
        stdout.queue(ResetColor)?;
        Ok(())
    }
}

fn cell_for(round: &Round, pos: Pos, difficulty: u8) -> RenderCell {
    let player = round.player();
    let dx = player.x as f64 - pos.x as f64;
    let dy = player.y as f64 - pos.y as f64;
    if (dx * dx + dy * dy).sqrt() >= vision_radius(difficulty) {
        return RenderCell {
            glyph: Glyph::Hidden,
            color: Color::Reset,
        };
    }
    match round.board().kind_at(pos) {
        CellKind::Wall => RenderCell {
            glyph: Glyph::Wall,
            color: Color::DarkBlue,
        },
        CellKind::Floor => RenderCell {
            glyph: Glyph::Floor,
            color: Color::DarkGrey,
        },
        CellKind::Door => RenderCell {
            glyph: Glyph::Door,
            color: Color::Cyan,
        },
        CellKind::Key => RenderCell {
            glyph: Glyph::Key,
            color: Color::Blue,
        },
        CellKind::Player => RenderCell {
            glyph: Glyph::Player,
            color: if round.got_key() {
                Color::Green
            } else {
                Color::Red
            },
        },
    }
}

// Typewriter-style text output for the menu screens.
pub struct Screen {
    stdout: Stdout,
    delay: Duration,
    row: u16,
    col: u16,
}

impl Screen {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            delay: Duration::from_millis(read_text_delay()),
            row: 0,
            col: 0,
        }
    }

    pub fn clear(&mut self) -> io::Result<()> {
        self.stdout.queue(Clear(ClearType::All))?;
        self.stdout.queue(MoveTo(0, 0))?;
        self.stdout.flush()?;
        self.row = 0;
        self.col = 0;
        Ok(())
    }

    pub fn header(&mut self, title: &str) -> io::Result<()> {
        self.clear()?;
        self.stdout.queue(Print(title))?;
        self.stdout.flush()?;
        self.row = 2;
        self.stdout.queue(MoveTo(0, self.row))?;
        Ok(())
    }

    pub fn animate(&mut self, text: &str) -> io::Result<()> {
        for ch in text.chars() {
            if ch == '\n' {
                self.row += 1;
                self.col = 0;
            } else {
                self.stdout.queue(Print(ch))?;
                self.col += 1;
            }
            self.stdout.queue(MoveTo(self.col, self.row))?;
            self.stdout.flush()?;
            thread::sleep(self.delay);
        }
        Ok(())
    }

    pub fn animate_timed(&mut self, text: &str, hold_ms: u64) -> io::Result<()> {
        self.animate(text)?;
        thread::sleep(Duration::from_millis(hold_ms));
        self.clear()
    }

    pub fn echo(&mut self, ch: char) -> io::Result<()> {
        self.stdout.queue(Print(ch))?;
        self.col += 1;
        self.stdout.flush()
    }

    pub fn unecho(&mut self) -> io::Result<()> {
        if self.col > 0 {
            self.col -= 1;
            self.stdout.queue(MoveTo(self.col, self.row))?;
            self.stdout.queue(Print(' '))?;
            self.stdout.queue(MoveTo(self.col, self.row))?;
            self.stdout.flush()?;
        }
        Ok(())
    }

    pub fn newline(&mut self) -> io::Result<()> {
        self.row += 1;
        self.col = 0;
        self.stdout.queue(MoveTo(self.col, self.row))?;
        self.stdout.flush()
    }
}

fn read_text_delay() -> u64 {
    std::env::var("ESCAPE_ROOM_TEXT_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TEXT_DELAY_MS)
}

use crossterm::cursor::{Hide, Show};
use crossterm::event::KeyCode;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use rand::Rng;
use std::io::{self, Stdout};

mod board;
mod input;
mod render;
mod round;
mod scoreboard;

use board::{Board, MAX_SIZE, MIN_SIZE};
use input::InputManager;
use render::Screen;
use round::{Outcome, Round};
use scoreboard::{RoundRecord, Scoreboard};

const MIN_DIFFICULTY: u8 = 1;
const MAX_DIFFICULTY: u8 = 5;

struct Settings {
    size: Option<usize>,
    difficulty: u8,
    tutorial_done: bool,
}

fn main() -> io::Result<()> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn run(stdout: &mut Stdout) -> io::Result<()> {
    let mut rng = rand::thread_rng();
    let input = InputManager::spawn();
    let mut screen = Screen::new();
    let mut scoreboard = Scoreboard::new();
    let mut settings = Settings {
        size: None,
        difficulty: MIN_DIFFICULTY,
        tutorial_done: false,
    };

    loop {
        screen.header("MENU")?;
        screen.animate("[P]lay\n[S]coreboard\n[T]utorial\n[O]ptions\n[Q]uit\n")?;
        let Some(code) = input.wait() else {
            return Ok(());
        };
        match code {
            KeyCode::Char('p') | KeyCode::Char('P') => {
                if !settings.tutorial_done {
                    screen.header("MENU")?;
                    screen.animate_timed("Please read the tutorial first", 1000)?;
                } else if settings.size.is_none() {
                    screen.header("MENU")?;
                    screen.animate_timed(
                        "Please set a size for your play area in the options tab",
                        1000,
                    )?;
                } else {
                    play_rounds(stdout, &input, &mut screen, &mut scoreboard, &settings, &mut rng)?;
                }
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                scoreboard_menu(&mut screen, &input, &scoreboard)?;
            }
            KeyCode::Char('t') | KeyCode::Char('T') => {
                tutorial(&mut screen, &input)?;
                settings.tutorial_done = true;
            }
            KeyCode::Char('o') | KeyCode::Char('O') => {
                options_menu(&mut screen, &input, &mut settings)?;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                screen.header("MENU")?;
                screen.animate_timed("Ok bye", 1500)?;
                return Ok(());
            }
            _ => {
                screen.header("MENU")?;
                screen.animate_timed("Invalid input please try again", 1000)?;
            }
        }
    }
}

fn play_rounds(
    stdout: &mut Stdout,
    input: &InputManager,
    screen: &mut Screen,
    scoreboard: &mut Scoreboard,
    settings: &Settings,
    rng: &mut impl Rng,
) -> io::Result<()> {
    let size = settings.size.expect("play is gated on a configured size");
    let difficulty = settings.difficulty;

    loop {
        let (board, player) = Board::generate(size, difficulty, rng);
        let mut round = Round::new(board, player);

        screen.clear()?;
        for count in ["3", "2", "1", "Go"] {
            screen.animate_timed(count, 700)?;
        }

        let outcome = round::play(stdout, input, &mut round, difficulty)?;
        screen.clear()?;
        match outcome {
            Outcome::Escaped { seconds } => {
                scoreboard.add(RoundRecord {
                    size,
                    difficulty,
                    seconds,
                });
                screen.animate_timed(
                    &format!("Congratulations you successfully escaped in {seconds} seconds"),
                    2000,
                )?;
            }
            Outcome::GaveUp => {
                screen.animate_timed("You didn't escape the room", 2000)?;
            }
        }

        loop {
            screen.animate("Start a new round?\n[Y]es, [N]o\n")?;
            match input.wait() {
                Some(KeyCode::Char('y')) | Some(KeyCode::Char('Y')) => {
                    screen.clear()?;
                    screen.animate_timed("Alright let's go", 500)?;
                    break;
                }
                Some(KeyCode::Char('n')) | Some(KeyCode::Char('N')) | None => {
                    screen.clear()?;
                    screen.animate_timed("Ok", 800)?;
                    return Ok(());
                }
                Some(_) => {
                    screen.clear()?;
                    screen.animate_timed("Please answer with [Y]es or [N]o", 1000)?;
                }
            }
        }
    }
}

enum NumberEntry {
    Value(u32),
    Invalid,
    Cancelled,
}

// Digits confirmed with Enter; Esc cancels. The terminal is in raw mode, so
// typed characters are echoed by hand.
fn prompt_number(screen: &mut Screen, input: &InputManager, prompt: &str) -> io::Result<NumberEntry> {
    screen.animate(prompt)?;
    let mut digits = String::new();
    loop {
        match input.wait() {
            None | Some(KeyCode::Esc) => return Ok(NumberEntry::Cancelled),
            Some(KeyCode::Enter) => {
                screen.newline()?;
                return Ok(match digits.parse() {
                    Ok(value) => NumberEntry::Value(value),
                    Err(_) => NumberEntry::Invalid,
                });
            }
            Some(KeyCode::Backspace) => {
                if digits.pop().is_some() {
                    screen.unecho()?;
                }
            }
            Some(KeyCode::Char(ch)) if ch.is_ascii_digit() && digits.len() < 3 => {
                digits.push(ch);
                screen.echo(ch)?;
            }
            Some(_) => {}
        }
    }
}

fn options_menu(screen: &mut Screen, input: &InputManager, settings: &mut Settings) -> io::Result<()> {
    loop {
        screen.header("OPTIONS")?;
        screen.animate("Set play [A]rea\nSet [D]ifficulty level\n[M]enu\n")?;
        match input.wait() {
            Some(KeyCode::Char('a')) | Some(KeyCode::Char('A')) => {
                set_area(screen, input, settings)?;
            }
            Some(KeyCode::Char('d')) | Some(KeyCode::Char('D')) => {
                set_difficulty(screen, input, settings)?;
            }
            Some(KeyCode::Char('m')) | Some(KeyCode::Char('M')) | None => {
                screen.clear()?;
                return Ok(());
            }
            Some(_) => {
                screen.header("OPTIONS")?;
                screen.animate_timed("Invalid input, please try again", 1000)?;
            }
        }
    }
}

fn set_area(screen: &mut Screen, input: &InputManager, settings: &mut Settings) -> io::Result<()> {
    loop {
        screen.header("SETTING PLAY AREA")?;
        let prompt = format!(
            "Set the side length of the square, {} to {}: ",
            MIN_SIZE, MAX_SIZE
        );
        match prompt_number(screen, input, &prompt)? {
            NumberEntry::Cancelled => return Ok(()),
            NumberEntry::Value(n) if (MIN_SIZE..=MAX_SIZE).contains(&(n as usize)) => {
                settings.size = Some(n as usize);
                screen.header("SETTING PLAY AREA")?;
                screen.animate_timed("Saved", 1000)?;
                return Ok(());
            }
            NumberEntry::Value(n) if (n as usize) < MIN_SIZE => {
                screen.animate_timed("Area must be bigger", 1500)?;
            }
            NumberEntry::Value(_) => {
                screen.animate_timed("Area must be smaller", 1500)?;
            }
            NumberEntry::Invalid => {
                screen.animate_timed("Set a valid number", 1500)?;
            }
        }
    }
}

fn set_difficulty(screen: &mut Screen, input: &InputManager, settings: &mut Settings) -> io::Result<()> {
    loop {
        screen.header("SETTING GAME DIFFICULTY")?;
        let prompt = format!(
            "Set the difficulty, {} to {}: ",
            MIN_DIFFICULTY, MAX_DIFFICULTY
        );
        match prompt_number(screen, input, &prompt)? {
            NumberEntry::Cancelled => return Ok(()),
            NumberEntry::Value(n) if n >= MIN_DIFFICULTY as u32 && n <= MAX_DIFFICULTY as u32 => {
                settings.difficulty = n as u8;
                screen.header("SETTING GAME DIFFICULTY")?;
                screen.animate_timed("Saved", 1000)?;
                return Ok(());
            }
            NumberEntry::Value(_) => {
                screen.animate_timed("Input is out of the range", 1500)?;
            }
            NumberEntry::Invalid => {
                screen.animate_timed("Set a valid number", 1500)?;
            }
        }
    }
}

fn scoreboard_menu(screen: &mut Screen, input: &InputManager, scoreboard: &Scoreboard) -> io::Result<()> {
    if scoreboard.is_empty() {
        screen.header("SCOREBOARD")?;
        screen.animate_timed("No rounds saved", 1000)?;
        return Ok(());
    }

    loop {
        screen.header("SCOREBOARD")?;
        screen.animate(
            "Show all rounds or filter by play area size or difficulty?\n\
             [A]ll\n[P]lay area\n[D]ifficulty\n[M]enu\n",
        )?;
        match input.wait() {
            Some(KeyCode::Char('a')) | Some(KeyCode::Char('A')) => {
                screen.header("SCOREBOARD")?;
                let lines: Vec<String> = scoreboard
                    .sorted()
                    .iter()
                    .enumerate()
                    .map(|(i, r)| {
                        format!(
                            "{}: {:.2} seconds on a {}x{} field and a difficulty level of {}\n",
                            i + 1,
                            r.seconds,
                            r.size,
                            r.size,
                            r.difficulty
                        )
                    })
                    .collect();
                show_lines(screen, input, &lines)?;
            }
            Some(KeyCode::Char('p')) | Some(KeyCode::Char('P')) => {
                screen.header("SCOREBOARD")?;
                if let NumberEntry::Value(n) =
                    prompt_number(screen, input, "Which play area size? ")?
                {
                    let rounds = scoreboard.by_size(n as usize);
                    if rounds.is_empty() {
                        screen.header("SCOREBOARD")?;
                        screen.animate_timed(
                            &format!(
                                "There are no rounds saved which were played on a {n}x{n} field"
                            ),
                            1500,
                        )?;
                    } else {
                        screen.header("SCOREBOARD")?;
                        screen.animate(&format!("Rounds played on a {n}x{n} field\n\n"))?;
                        let lines: Vec<String> = rounds
                            .iter()
                            .enumerate()
                            .map(|(i, r)| {
                                format!(
                                    "{}: {:.2} seconds on a difficulty level of {}\n",
                                    i + 1,
                                    r.seconds,
                                    r.difficulty
                                )
                            })
                            .collect();
                        show_lines(screen, input, &lines)?;
                    }
                }
            }
            Some(KeyCode::Char('d')) | Some(KeyCode::Char('D')) => {
                screen.header("SCOREBOARD")?;
                if let NumberEntry::Value(n) =
                    prompt_number(screen, input, "Which difficulty level? ")?
                {
                    let rounds = scoreboard.by_difficulty(n as u8);
                    if rounds.is_empty() {
                        screen.header("SCOREBOARD")?;
                        screen.animate_timed(
                            &format!(
                                "There are no rounds saved which were played on a difficulty level of {n}"
                            ),
                            1500,
                        )?;
                    } else {
                        screen.header("SCOREBOARD")?;
                        screen.animate(&format!("Rounds played on a difficulty level of {n}\n\n"))?;
                        let lines: Vec<String> = rounds
                            .iter()
                            .enumerate()
                            .map(|(i, r)| {
                                format!(
                                    "{}: {:.2} seconds on a {}x{} field\n",
                                    i + 1,
                                    r.seconds,
                                    r.size,
                                    r.size
                                )
                            })
                            .collect();
                        show_lines(screen, input, &lines)?;
                    }
                }
            }
            Some(KeyCode::Char('m')) | Some(KeyCode::Char('M')) | None => {
                screen.clear()?;
                return Ok(());
            }
            Some(_) => {
                screen.header("SCOREBOARD")?;
                screen.animate_timed("Invalid input", 1000)?;
            }
        }
    }
}

fn show_lines(screen: &mut Screen, input: &InputManager, lines: &[String]) -> io::Result<()> {
    for line in lines {
        screen.animate(line)?;
    }
    screen.animate("\nPress any key")?;
    input.wait();
    screen.clear()
}

fn tutorial(screen: &mut Screen, input: &InputManager) -> io::Result<()> {
    screen.header("TUTORIAL")?;
    screen.animate("Control the player (X) with w,a,s,d or the arrow keys\n")?;
    screen.animate("Find and grab the key (K) and escape through the door in the wall\n")?;
    screen.animate("Press Esc to end the round and get back to the menu\n\n")?;
    screen.animate(&format!(
        "Your play area is a square; pick any side length from {} to {} in the options tab\n",
        MIN_SIZE, MAX_SIZE
    ))?;
    screen.animate("You can also raise the difficulty level there; it defaults to the lowest\n")?;
    screen.animate(
        "Above difficulty 1 the room becomes a maze, and we recommend a play area bigger than 8\n\n",
    )?;
    screen.animate("Your time to escape is tracked and shown after each round\n")?;
    screen.animate("You can compare your times in the scoreboard tab\n")?;
    screen.animate("\nPress any key")?;
    input.wait();
    screen.clear()
}

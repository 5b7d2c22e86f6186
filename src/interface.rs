//! Text front end for the rules engine. [`Session::run`] is the main loop: it
//! reads one command per line from the input stream, forwards it to
//! [`Game`] and writes the response to the output stream.
//!
//! Promotion choices are requested on the same streams unless a fixed piece
//! was configured.

use std::io::{BufRead, Write};

use anyhow::{bail, Context};
use itertools::Itertools;
use tracing::{debug, warn};

use crate::chess::board::{Board, Played};
use crate::chess::core::{File, Player, Promotion, Rank, Square};
use crate::chess::game::{Game, PromotionChooser};
use crate::chess::moves::MoveRequest;
use crate::chess::scanner::Termination;
use crate::chess::selection::SelectOutcome;

const HELP: &str = "\
commands:
  select <square>       click on a square, e.g. `select e2`
  click <row> <column>  click by indices, row 0 is rank 8 and column 0 is file a
  move <move>           play a move, e.g. `move e2e4` or `move a7a8n`
  moves                 list legal moves of the side to move
  board                 print the board
  fen                   print the position
  position <fen>        load the position
  new                   start a new game
  status                print whose turn it is or how the game ended
  help                  print this message
  quit                  exit";

/// Asks for the promotion piece on the console, or always answers with the
/// configured piece.
pub struct Console<'a, R: BufRead, W: Write> {
    input: &'a mut R,
    output: &'a mut W,
    promotion: Option<Promotion>,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    /// Wraps the streams. With `promotion` set, no questions are asked.
    #[must_use]
    pub fn new(input: &'a mut R, output: &'a mut W, promotion: Option<Promotion>) -> Self {
        Self {
            input,
            output,
            promotion,
        }
    }

    /// Reads the next line, replacing invalid UTF-8. Returns `None` at the end
    /// of input.
    fn read_line(&mut self) -> anyhow::Result<Option<String>> {
        let mut line = Vec::new();
        match self
            .input
            .read_until(b'\n', &mut line)
            .context("reading input")?
        {
            0 => Ok(None),
            _ => Ok(Some(String::from_utf8_lossy(&line).into_owned())),
        }
    }
}

impl<R: BufRead, W: Write> PromotionChooser for Console<'_, R, W> {
    fn choose_promotion(&mut self, player: Player) -> anyhow::Result<Promotion> {
        if let Some(promotion) = self.promotion {
            return Ok(promotion);
        }
        loop {
            write!(self.output, "promote {player:?} pawn to (q/r/b/n): ")?;
            self.output.flush()?;
            let Some(answer) = self.read_line()? else {
                bail!("input closed before the promotion piece was chosen");
            };
            match Promotion::try_from(answer.trim()) {
                Ok(promotion) => return Ok(promotion),
                Err(e) => writeln!(self.output, "error: {e}")?,
            }
        }
    }
}

/// Line-based session over a single game.
pub struct Session<'a, R: BufRead, W: Write> {
    game: Game<Console<'a, R, W>>,
}

impl<'a, R: BufRead, W: Write> Session<'a, R, W> {
    /// Starts a session from the starting position.
    #[must_use]
    pub fn new(input: &'a mut R, output: &'a mut W, promotion: Option<Promotion>) -> Self {
        Self {
            game: Game::new(Console::new(input, output, promotion)),
        }
    }

    /// Starts a session from the serialized position.
    ///
    /// # Errors
    ///
    /// If the position can not be decoded.
    pub fn from_fen(
        fen: &str,
        input: &'a mut R,
        output: &'a mut W,
        promotion: Option<Promotion>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            game: Game::from_fen(fen, Console::new(input, output, promotion))?,
        })
    }

    #[allow(missing_docs)]
    #[must_use]
    pub const fn game(&self) -> &Game<Console<'a, R, W>> {
        &self.game
    }

    /// Executes commands until `quit` or the end of input. Command errors are
    /// reported as `error: <message>` and do not stop the loop.
    ///
    /// # Errors
    ///
    /// If reading the input or writing the output fails.
    pub fn run(&mut self) -> anyhow::Result<()> {
        while let Some(line) = self.game.chooser_mut().read_line()? {
            let command = line.trim();
            if command.is_empty() {
                continue;
            }
            if command == "quit" {
                debug!("quit");
                break;
            }
            if let Err(e) = self.execute(command) {
                warn!(command, error = %e, "command rejected");
                writeln!(self.output(), "error: {e:#}")?;
            }
        }
        Ok(())
    }

    fn output(&mut self) -> &mut W {
        self.game.chooser_mut().output
    }

    fn execute(&mut self, command: &str) -> anyhow::Result<()> {
        let (name, arguments) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(name, rest)| (name, rest.trim()));
        match name {
            "select" => {
                let square = Square::try_from(arguments)?;
                let outcome = self.game.select_square(square)?;
                self.report(outcome)
            },
            "click" => {
                let Some((row, column)) = arguments.split_whitespace().collect_tuple() else {
                    bail!("expected `click <row> <column>`, got '{arguments}'");
                };
                let row = row
                    .parse::<usize>()
                    .with_context(|| format!("row should be a number, got '{row}'"))?;
                let column = column
                    .parse::<usize>()
                    .with_context(|| format!("column should be a number, got '{column}'"))?;
                let outcome = self.game.select(row, column)?;
                self.report(outcome)
            },
            "move" => {
                let played = self.game.play(MoveRequest::try_from(arguments)?)?;
                self.report_played(played)
            },
            "moves" => {
                let moves = self
                    .game
                    .legal_moves()
                    .iter()
                    .map(ToString::to_string)
                    .sorted()
                    .join(" ");
                writeln!(self.output(), "{moves}")?;
                Ok(())
            },
            "board" => {
                let rendered = render(self.game.board());
                writeln!(self.output(), "{rendered}")?;
                Ok(())
            },
            "fen" => {
                let fen = self.game.board().to_string();
                writeln!(self.output(), "{fen}")?;
                Ok(())
            },
            "position" => {
                self.game.load(arguments)?;
                writeln!(self.output(), "ok")?;
                Ok(())
            },
            "new" => {
                self.game.reset_to_starting_position();
                writeln!(self.output(), "ok")?;
                Ok(())
            },
            "status" => {
                let status = status(&self.game);
                writeln!(self.output(), "{status}")?;
                Ok(())
            },
            "help" => {
                writeln!(self.output(), "{HELP}")?;
                Ok(())
            },
            _ => bail!("unknown command '{name}', try `help`"),
        }
    }

    fn report(&mut self, outcome: SelectOutcome) -> anyhow::Result<()> {
        match outcome {
            SelectOutcome::Selected(square) => {
                let destinations = self
                    .game
                    .board()
                    .selection()
                    .highlighted()
                    .iter()
                    .map(|mv| mv.to().to_string())
                    .sorted()
                    .join(" ");
                writeln!(self.output(), "selected {square}: {destinations}")?;
            },
            SelectOutcome::Ignored => writeln!(self.output(), "ignored")?,
            SelectOutcome::Cleared => writeln!(self.output(), "cleared")?,
            SelectOutcome::Moved(played) => self.report_played(played)?,
        }
        Ok(())
    }

    fn report_played(&mut self, played: Played) -> anyhow::Result<()> {
        match played.promotion {
            Some(promotion) => writeln!(self.output(), "played {}{promotion}", played.mv)?,
            None => writeln!(self.output(), "played {}", played.mv)?,
        }
        if played.terminal.is_some() {
            let status = status(&self.game);
            writeln!(self.output(), "game over: {status}")?;
        }
        Ok(())
    }
}

fn status<C: PromotionChooser>(game: &Game<C>) -> String {
    match (game.terminal(), game.winner()) {
        (Some(Termination::Checkmate), Some(winner)) => format!("checkmate, {winner:?} wins"),
        (Some(termination), _) => format!("{termination}, draw"),
        (None, _) => {
            let player = game.side_to_move();
            let in_check = game
                .board()
                .king_square(player)
                .is_some_and(|king| game.board().is_attacked_king(king));
            if in_check {
                format!("{player:?} to move, in check")
            } else {
                format!("{player:?} to move")
            }
        },
    }
}

/// Draws the board with rank 8 on top. The selected piece is wrapped in
/// brackets, highlighted destinations are marked with `*` and an attacked king
/// with `!`.
fn render(board: &Board) -> String {
    let mut lines = Vec::new();
    for rank in Rank::iter().rev() {
        let row = File::iter()
            .map(|file| {
                let square = Square::new(file, rank);
                let symbol = board
                    .piece_at(square)
                    .map_or_else(|| ".".to_string(), |piece| piece.to_string());
                if board.is_selected(square) {
                    format!("[{symbol}]")
                } else if board.is_highlighted(square) {
                    format!("*{symbol} ")
                } else if board.is_attacked_king(square) {
                    format!("!{symbol} ")
                } else {
                    format!(" {symbol} ")
                }
            })
            .join("");
        lines.push(format!("{rank} {row}"));
    }
    lines.push(format!(
        "  {}",
        File::iter().map(|file| format!(" {file} ")).join("")
    ));
    lines.join("\n")
}

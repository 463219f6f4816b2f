// SPDX-License-Identifier: MIT
//
// mcx: a headless driver for the Emacs emulation engine.
//
// Wires one in-memory editor (mcx-core) to an emulator (mcx-emacs) and
// feeds it a script read from stdin, one step per line:
//
//   C-u | M-<digit> | M-- | C-g     prefix argument and quit
//   <digit>                         digit after C-u (typed when no prefix)
//   type <text>                     type each character
//   select L:C L:C [L:C L:C]...     mouse selection(s), anchor then active
//   cursor L:C [L:C]...             keyboard carets
//   print                           dump the buffer
//   ring                            list the kill ring
//   <command> [args]...             run a registered command
//
// Positions are 1-indexed like an editor's status line. Messages the
// engine shows go to stderr; the final buffer goes to stdout.

use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use mcx_core::buffer::Buffer;
use mcx_core::host::SelectionChangeKind;
use mcx_core::memory::{MemoryClipboard, MemoryEditor};
use mcx_core::position::{Position, Selection};
use mcx_emacs::options::{OptionError, parse_set_arg};
use mcx_emacs::{Emulator, EmulatorError, Options};

const SCRATCH: &str = "*scratch*";

#[derive(Debug, Error)]
enum DriverError {
    #[error("bad position {0:?} (expected LINE:COL)")]
    Position(String),

    #[error("{0} expects {1}")]
    Arity(&'static str, &'static str),

    #[error(transparent)]
    Engine(#[from] EmulatorError),
}

/// What a script line asked the driver to do besides driving the engine.
#[derive(Debug, PartialEq, Eq)]
enum Output {
    Nothing,
    Text(String),
}

// ─── Driver ─────────────────────────────────────────────────────────────────

struct Driver {
    emacs: Emulator<MemoryEditor>,
    /// Messages already echoed to stderr.
    shown: usize,
}

impl Driver {
    fn new(buffer: Buffer, options: Options) -> Self {
        let emacs = Emulator::standalone(
            MemoryEditor::with_buffer(buffer),
            Rc::new(MemoryClipboard::default()),
            options,
        );
        Self { emacs, shown: 0 }
    }

    const fn editor(&self) -> &MemoryEditor {
        self.emacs.editor()
    }

    /// Run one script line.
    fn step(&mut self, line: &str) -> Result<Output, DriverError> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(Output::Nothing);
        };
        debug!(line, "step");

        match head {
            "C-u" => self.emacs.universal_argument(),
            "M--" => self.emacs.negative_argument(),
            "C-g" => self.emacs.cancel(),
            _ if head.len() == 3 && head.starts_with("M-") => match digit(&head[2..]) {
                Some(d) => self.emacs.digit_argument(d),
                None => self.run(head, words)?,
            },
            _ if digit(head).is_some() => {
                let d = digit(head).unwrap_or_default();
                self.emacs.subsequent_argument_digit(d)?;
            }
            "type" => {
                let text = line.trim_start().strip_prefix("type").unwrap_or_default();
                let text = text.strip_prefix(' ').unwrap_or(text);
                if text.is_empty() {
                    return Err(DriverError::Arity("type", "some text"));
                }
                for ch in text.chars() {
                    self.emacs.type_char(ch)?;
                }
            }
            "select" => {
                let points = words.map(parse_position).collect::<Result<Vec<_>, _>>()?;
                if points.is_empty() || points.len() % 2 != 0 {
                    return Err(DriverError::Arity("select", "pairs of positions"));
                }
                let selections = points
                    .chunks(2)
                    .map(|pair| Selection::new(pair[0], pair[1]))
                    .collect();
                self.user_select(selections, SelectionChangeKind::Mouse);
            }
            "cursor" => {
                let carets = words
                    .map(|w| parse_position(w).map(Selection::caret))
                    .collect::<Result<Vec<_>, _>>()?;
                if carets.is_empty() {
                    return Err(DriverError::Arity("cursor", "at least one position"));
                }
                self.user_select(carets, SelectionChangeKind::Keyboard);
            }
            "print" => return Ok(Output::Text(self.editor().contents())),
            "ring" => return Ok(Output::Text(self.ring_listing())),
            _ => self.run(head, words)?,
        }
        Ok(Output::Nothing)
    }

    fn run<'a>(
        &mut self,
        command: &str,
        args: impl Iterator<Item = &'a str>,
    ) -> Result<(), DriverError> {
        let args: Vec<&str> = args.collect();
        self.emacs.run_command(command, &args)?;
        Ok(())
    }

    fn user_select(&mut self, selections: Vec<Selection>, kind: SelectionChangeKind) {
        self.emacs.editor_mut().select_as_user(selections, kind);
        self.emacs.process_notifications();
    }

    fn ring_listing(&self) -> String {
        let Some(ring) = self.emacs.kill_ring() else {
            return "(kill ring disabled)".to_string();
        };
        ring.borrow()
            .labels()
            .into_iter()
            .map(|(index, label)| format!("{index}: {label}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Messages shown since the last call.
    fn drain_messages(&mut self) -> Vec<String> {
        let messages = self.emacs.editor().messages();
        let total = messages.len();
        let fresh = messages[self.shown.min(total)..].to_vec();
        self.shown = total;
        fresh
    }
}

fn digit(word: &str) -> Option<u8> {
    match word.as_bytes() {
        [b @ b'0'..=b'9'] => Some(b - b'0'),
        _ => None,
    }
}

/// `LINE:COL`, both 1-indexed.
fn parse_position(word: &str) -> Result<Position, DriverError> {
    let bad = || DriverError::Position(word.to_string());
    let (line, col) = word.split_once(':').ok_or_else(bad)?;
    let line: usize = line.parse().map_err(|_| bad())?;
    let col: usize = col.parse().map_err(|_| bad())?;
    if line == 0 || col == 0 {
        return Err(bad());
    }
    Ok(Position::new(line - 1, col - 1))
}

// ─── Command line ───────────────────────────────────────────────────────────

struct Args {
    options: Options,
    file: Option<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut options = Options::default();
    let mut file = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--set" => {
                let directive = args.next().ok_or("--set needs a directive")?;
                if let Some(value) = options
                    .apply(&parse_set_arg(&directive))
                    .map_err(|e: OptionError| e.to_string())?
                {
                    eprintln!("{value}");
                }
            }
            "-h" | "--help" => return Err(usage()),
            _ if arg.starts_with('-') => return Err(format!("unknown flag {arg}\n{}", usage())),
            _ if file.is_some() => return Err(usage()),
            _ => file = Some(arg),
        }
    }
    Ok(Args { options, file })
}

fn usage() -> String {
    "usage: mcx [--set DIRECTIVE]... [FILE]".to_string()
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("MCX_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = parse_args(env::args().skip(1)).unwrap_or_else(|e| {
        eprintln!("mcx: {e}");
        process::exit(1);
    });

    let (buffer, document) = match &args.file {
        Some(path) => {
            let buffer = Buffer::from_file(Path::new(path)).unwrap_or_else(|e| {
                eprintln!("mcx: {path}: {e}");
                process::exit(1);
            });
            (buffer, path.clone())
        }
        None => (Buffer::new(), SCRATCH.to_string()),
    };
    info!(%document, "starting");

    let mut driver = Driver::new(buffer, args.options);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in io::stdin().lock().lines() {
        let line = line.unwrap_or_else(|e| {
            eprintln!("mcx: {e}");
            process::exit(1);
        });
        let result = driver.step(&line);
        for message in driver.drain_messages() {
            eprintln!("{message}");
        }
        match result {
            Ok(Output::Text(text)) => {
                let _ = writeln!(out, "{text}");
            }
            Ok(Output::Nothing) => {}
            Err(e) => eprintln!("mcx: {e}"),
        }
    }

    let _ = write!(out, "{}", driver.editor().contents());
    let _ = out.flush();
}

// ─── Tests ──────────────────────────────────────────────────────────────────

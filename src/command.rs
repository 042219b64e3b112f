use crate::set::SplaySet;
use log::{debug, trace};
use std::fmt;
use std::io::{BufRead, Write};
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    Insert(i64),
    Erase(i64),
    Contains(i64),
    Sum(i64, i64),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Response {
    Found,
    NotFound,
    Sum(i128),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,
    #[error("unknown operation {0:?}")]
    UnknownOp(String),
    #[error("operation {op:?} takes {expected} argument(s), got {got}")]
    WrongArity {
        op: char,
        expected: usize,
        got: usize,
    },
    #[error("bad integer {token:?}: {source}")]
    BadInteger {
        token: String,
        source: ParseIntError,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("input is empty, expected a command count")]
    MissingCount,
    #[error("bad command count {0:?}")]
    BadCount(String),
    #[error("line {line}: {source}")]
    Parse { line: usize, source: ParseError },
    #[error("expected {expected} commands, input ended after {got}")]
    Truncated { expected: usize, got: usize },
}

fn parse_int(token: &str) -> Result<i64, ParseError> {
    token.parse().map_err(|source| ParseError::BadInteger {
        token: token.to_owned(),
        source,
    })
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, ParseError> {
        let mut tokens = s.split_whitespace();
        let op = tokens.next().ok_or(ParseError::Empty)?;
        let args: Vec<&str> = tokens.collect();
        let (op, expected) = match op {
            "+" => ('+', 1),
            "-" => ('-', 1),
            "?" => ('?', 1),
            "s" => ('s', 2),
            other => return Err(ParseError::UnknownOp(other.to_owned())),
        };
        if args.len() != expected {
            return Err(ParseError::WrongArity {
                op,
                expected,
                got: args.len(),
            });
        }
        let first = parse_int(args[0])?;
        Ok(match op {
            '+' => Command::Insert(first),
            '-' => Command::Erase(first),
            '?' => Command::Contains(first),
            _ => Command::Sum(first, parse_int(args[1])?),
        })
    }
}

impl Command {
    /// Runs the command against `set`. Only queries produce a response.
    pub fn apply(&self, set: &mut SplaySet) -> Option<Response> {
        match *self {
            Command::Insert(x) => {
                set.insert(x);
                None
            }
            Command::Erase(x) => {
                set.erase(x);
                None
            }
            Command::Contains(x) => Some(if set.contains(x) {
                Response::Found
            } else {
                Response::NotFound
            }),
            Command::Sum(l, r) => Some(Response::Sum(set.range_sum(l, r))),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Found => f.write_str("Found"),
            Response::NotFound => f.write_str("Not found"),
            Response::Sum(sum) => write!(f, "{sum}"),
        }
    }
}

/// Reads a command count followed by that many commands from `r`, and writes one line per query
/// to `w`. Blank lines are skipped. Returns the number of commands executed.
pub fn run<R: BufRead, W: Write>(r: R, mut w: W) -> Result<usize, Error> {
    let mut lines = r
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !matches!(line, Ok(l) if l.trim().is_empty()));

    let expected = match lines.next() {
        Some((_, line)) => {
            let line = line?;
            line.trim()
                .parse::<usize>()
                .map_err(|_| Error::BadCount(line.trim().to_owned()))?
        }
        None => return Err(Error::MissingCount),
    };
    debug!("running {expected} commands");

    let mut set = SplaySet::new();
    for done in 0..expected {
        let Some((line_no, line)) = lines.next() else {
            return Err(Error::Truncated {
                expected,
                got: done,
            });
        };
        let command: Command = line?
            .parse()
            .map_err(|source| Error::Parse {
                line: line_no,
                source,
            })?;
        trace!("line {line_no}: {command:?}");
        if let Some(response) = command.apply(&mut set) {
            writeln!(w, "{response}")?;
        }
    }
    w.flush()?;
    debug!("finished {expected} commands, {} keys remain", set.len());
    Ok(expected)
}

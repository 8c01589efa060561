use std::fmt::{self, Display, Write as _};

use owo_colors::OwoColorize;
use thiserror::Error;

use crate::span::Pos;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A host-facing error. [`crate::vm::Vm::interpret`] reports the three-way
/// [`crate::vm::Status`] instead; this enum is for APIs that want a value.
#[derive(Debug, Error)]
pub enum Error {
  #[error("{}", render_emit_errors(.0))]
  Compile(Vec<EmitError>),
  #[error("{0}")]
  Runtime(String),
}

fn render_emit_errors(errors: &[EmitError]) -> String {
  let mut out = String::new();
  for (i, error) in errors.iter().enumerate() {
    if i > 0 {
      out.push('\n');
    }
    let _ = write!(out, "{error}");
  }
  out
}

/// What the diagnostic points at.
#[derive(Debug)]
pub enum ErrorContext {
  AtEnd,
  At(String),
  None,
}

/// One compile diagnostic, in the shape
/// `Error in '<path>' at row:<r> col:<c> at '<lexeme>': <message>`.
#[derive(Debug)]
pub struct EmitError {
  pub path: String,
  pub pos: Pos,
  pub context: ErrorContext,
  pub message: String,
}

impl Display for EmitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Error in '{}' at {}", self.path, self.pos)?;
    match &self.context {
      ErrorContext::AtEnd => write!(f, " at end")?,
      ErrorContext::At(lexeme) => write!(f, " at '{lexeme}'")?,
      ErrorContext::None => {}
    }
    write!(f, ": {}", self.message)
  }
}

impl EmitError {
  /// The colored form written to stderr.
  pub fn styled(&self) -> String {
    let mut out = String::new();
    let _ = write!(
      out,
      "{} in '{}' at {}",
      "Error".red().bold(),
      self.path.cyan(),
      self.pos
    );
    match &self.context {
      ErrorContext::AtEnd => {
        let _ = write!(out, " at end");
      }
      ErrorContext::At(lexeme) => {
        let _ = write!(out, " at '{}'", lexeme.yellow());
      }
      ErrorContext::None => {}
    }
    let _ = write!(out, ": {}", self.message);
    out
  }
}

#![allow(non_camel_case_types)]

use std::borrow::Borrow;
use std::fmt;
use std::mem::discriminant;

use logos::Logos;

use crate::span::{LineIndex, Pos, Span};

#[derive(Clone, Debug)]
pub struct Token {
  pub kind: TokenKind,
  pub span: Span,
  pub pos: Pos,
}

impl Token {
  pub fn is(&self, kind: impl Borrow<TokenKind>) -> bool {
    discriminant(&self.kind) == discriminant(kind.borrow())
  }
}

pub struct Lexer<'src> {
  src: &'src str,
  inner: logos::Lexer<'src, TokenKind>,
  lines: LineIndex,
  previous: Token,
  current: Token,
  eof: Token,
}

impl<'src> Lexer<'src> {
  pub fn new(src: &'src str) -> Self {
    let lines = LineIndex::new(src);
    let end = src.len();
    let eof = Token {
      kind: TokenKind::Tok_Eof,
      span: (end..end).into(),
      pos: lines.pos(end),
    };

    let mut lex = Self {
      src,
      inner: TokenKind::lexer(src),
      lines,
      previous: eof.clone(),
      current: eof.clone(),
      eof,
    };
    lex.bump();

    lex
  }

  #[inline]
  pub fn previous(&self) -> &Token {
    &self.previous
  }

  #[inline]
  pub fn current(&self) -> &Token {
    &self.current
  }

  #[inline]
  pub fn lexeme(&self, token: &Token) -> &'src str {
    &self.src[token.span.range()]
  }

  #[inline]
  pub fn bump(&mut self) {
    std::mem::swap(&mut self.previous, &mut self.current);

    self.current = self.next_token().unwrap_or_else(|| self.eof.clone());
  }

  fn next_token(&mut self) -> Option<Token> {
    let lexer = &mut self.inner;
    while let Some(kind) = lexer.next() {
      let span = Span::from(lexer.span());

      match kind {
        TokenKind::_Tok_Whitespace | TokenKind::_Tok_Comment => continue,
        kind => {
          return Some(Token {
            kind,
            span,
            pos: self.lines.pos(span.start),
          })
        }
      }
    }

    None
  }
}

// When adding a token, also give it a `name` below.
#[derive(Clone, Copy, Debug, Logos, PartialEq, Eq)]
pub enum TokenKind {
  // Keywords
  #[token("assert")]
  Kw_Assert,
  #[token("break")]
  Kw_Break,
  #[token("class")]
  Kw_Class,
  #[token("continue")]
  Kw_Continue,
  #[token("else")]
  Kw_Else,
  #[token("for")]
  Kw_For,
  #[token("func")]
  Kw_Func,
  #[token("if")]
  Kw_If,
  #[token("let")]
  Kw_Let,
  #[token("operator")]
  Kw_Operator,
  #[token("return")]
  Kw_Return,
  #[token("self")]
  Kw_Self,
  #[token("super")]
  Kw_Super,
  #[token("unary")]
  Kw_Unary,
  #[token("while")]
  Kw_While,

  // Brackets
  #[token("(")]
  Brk_ParenL,
  #[token(")")]
  Brk_ParenR,
  #[token("{")]
  Brk_CurlyL,
  #[token("}")]
  Brk_CurlyR,
  #[token("[")]
  Brk_SquareL,
  #[token("]")]
  Brk_SquareR,

  // Misc characters
  #[token(",")]
  Tok_Comma,
  #[token(";")]
  Tok_Semicolon,
  #[token(":")]
  Tok_Colon,
  #[token("::")]
  Op_Access,
  #[token(".")]
  Op_Dot,
  #[token("..")]
  Op_Spread,

  // Operators
  #[token("=")]
  Op_Equal,
  #[token("==")]
  Op_EqualEqual,
  #[token("!=")]
  Op_BangEqual,
  #[token("+")]
  Op_Plus,
  #[token("-")]
  Op_Minus,
  #[token("*")]
  Op_Star,
  #[token("/")]
  Op_Slash,
  #[token("%")]
  Op_Percent,
  #[token("&")]
  Op_Amp,
  #[token("&&")]
  Op_AmpAmp,
  #[token("|")]
  Op_Pipe,
  #[token("||")]
  Op_PipePipe,
  #[token("^")]
  Op_Caret,
  #[token("~")]
  Op_Tilde,
  #[token("!")]
  Op_Bang,
  #[token("<")]
  Op_Less,
  #[token("<=")]
  Op_LessEqual,
  #[token("<<")]
  Op_ShiftL,
  #[token(">")]
  Op_More,
  #[token(">=")]
  Op_MoreEqual,
  #[token(">>")]
  Op_ShiftR,

  // Literals
  #[token("true")]
  Lit_True,
  #[token("false")]
  Lit_False,
  #[token("nil")]
  Lit_Nil,
  #[regex("[0-9]+", priority = 2)]
  Lit_Number,
  /// Digits, `.`, digits. No leading or trailing `.`.
  #[regex(r"[0-9]+\.[0-9]+")]
  Lit_Float,
  #[regex(r#""([^"\\\n]|\\.)*""#)]
  Lit_String,
  /// A `"` that never finds its closing quote on the same line.
  #[regex(r#""([^"\\\n]|\\.)*"#)]
  Tok_UnterminatedString,
  #[regex("[a-zA-Z_][a-zA-Z0-9_]*")]
  Lit_Ident,

  #[doc(hidden)]
  #[regex(r"[ \t\r\n]+")]
  _Tok_Whitespace,
  #[doc(hidden)]
  #[regex(r"--[^\n]*")]
  _Tok_Comment,

  #[error]
  Tok_Error,
  Tok_Eof,
}

impl TokenKind {
  pub fn name(&self) -> &'static str {
    match self {
      TokenKind::Kw_Assert => "assert",
      TokenKind::Kw_Break => "break",
      TokenKind::Kw_Class => "class",
      TokenKind::Kw_Continue => "continue",
      TokenKind::Kw_Else => "else",
      TokenKind::Kw_For => "for",
      TokenKind::Kw_Func => "func",
      TokenKind::Kw_If => "if",
      TokenKind::Kw_Let => "let",
      TokenKind::Kw_Operator => "operator",
      TokenKind::Kw_Return => "return",
      TokenKind::Kw_Self => "self",
      TokenKind::Kw_Super => "super",
      TokenKind::Kw_Unary => "unary",
      TokenKind::Kw_While => "while",
      TokenKind::Brk_ParenL => "(",
      TokenKind::Brk_ParenR => ")",
      TokenKind::Brk_CurlyL => "{",
      TokenKind::Brk_CurlyR => "}",
      TokenKind::Brk_SquareL => "[",
      TokenKind::Brk_SquareR => "]",
      TokenKind::Tok_Comma => ",",
      TokenKind::Tok_Semicolon => ";",
      TokenKind::Tok_Colon => ":",
      TokenKind::Op_Access => "::",
      TokenKind::Op_Dot => ".",
      TokenKind::Op_Spread => "..",
      TokenKind::Op_Equal => "=",
      TokenKind::Op_EqualEqual => "==",
      TokenKind::Op_BangEqual => "!=",
      TokenKind::Op_Plus => "+",
      TokenKind::Op_Minus => "-",
      TokenKind::Op_Star => "*",
      TokenKind::Op_Slash => "/",
      TokenKind::Op_Percent => "%",
      TokenKind::Op_Amp => "&",
      TokenKind::Op_AmpAmp => "&&",
      TokenKind::Op_Pipe => "|",
      TokenKind::Op_PipePipe => "||",
      TokenKind::Op_Caret => "^",
      TokenKind::Op_Tilde => "~",
      TokenKind::Op_Bang => "!",
      TokenKind::Op_Less => "<",
      TokenKind::Op_LessEqual => "<=",
      TokenKind::Op_ShiftL => "<<",
      TokenKind::Op_More => ">",
      TokenKind::Op_MoreEqual => ">=",
      TokenKind::Op_ShiftR => ">>",
      TokenKind::Lit_True => "true",
      TokenKind::Lit_False => "false",
      TokenKind::Lit_Nil => "nil",
      TokenKind::Lit_Number => "number",
      TokenKind::Lit_Float => "float",
      TokenKind::Lit_String => "string",
      TokenKind::Tok_UnterminatedString => "<unterminated string>",
      TokenKind::Lit_Ident => "identifier",
      TokenKind::_Tok_Whitespace => "<whitespace>",
      TokenKind::_Tok_Comment => "<comment>",
      TokenKind::Tok_Error => "<error>",
      TokenKind::Tok_Eof => "<eof>",
    }
  }
}

pub struct Tokens<'src>(pub Lexer<'src>);

impl<'src> Iterator for Tokens<'src> {
  type Item = (&'src str, Token);

  fn next(&mut self) -> Option<Self::Item> {
    let token = self.0.current().clone();
    self.0.bump();
    if !token.is(TokenKind::Tok_Eof) {
      Some((self.0.lexeme(&token), token))
    } else {
      None
    }
  }
}

pub struct DebugToken<'src>(pub Token, pub &'src str);
impl<'src> fmt::Debug for DebugToken<'src> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let kind = self.0.kind;
    let pos = self.0.pos;
    let lexeme = self.1;
    write!(f, "({kind:?} `{lexeme}` @{pos})")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(src: &str) -> Vec<TokenKind> {
    Tokens(Lexer::new(src)).map(|(_, t)| t.kind).collect()
  }

  #[test]
  fn keywords_and_idents() {
    use TokenKind::*;
    assert_eq!(
      kinds("let forx for func funcs operator"),
      vec![Kw_Let, Lit_Ident, Kw_For, Kw_Func, Lit_Ident, Kw_Operator]
    );
  }

  #[test]
  fn two_char_operators() {
    use TokenKind::*;
    assert_eq!(
      kinds(".. :: << >> <= >= == != && || . : < >"),
      vec![
        Op_Spread, Op_Access, Op_ShiftL, Op_ShiftR, Op_LessEqual, Op_MoreEqual, Op_EqualEqual,
        Op_BangEqual, Op_AmpAmp, Op_PipePipe, Op_Dot, Tok_Colon, Op_Less, Op_More,
      ]
    );
  }

  #[test]
  fn numbers() {
    use TokenKind::*;
    assert_eq!(kinds("12 3.25 7"), vec![Lit_Number, Lit_Float, Lit_Number]);
    // no leading/trailing-dot floats; `1.` scans as number then dot
    assert_eq!(kinds("1."), vec![Lit_Number, Op_Dot]);
    assert_eq!(kinds(".5"), vec![Op_Dot, Lit_Number]);
  }

  #[test]
  fn strings() {
    use TokenKind::*;
    assert_eq!(kinds(r#""hi" "a\"b""#), vec![Lit_String, Lit_String]);
    assert_eq!(kinds("\"oops\nlet"), vec![Tok_UnterminatedString, Kw_Let]);
    assert_eq!(kinds("\"oops"), vec![Tok_UnterminatedString]);
  }

  #[test]
  fn comments_are_skipped() {
    use TokenKind::*;
    assert_eq!(kinds("1 -- comment\n2"), vec![Lit_Number, Lit_Number]);
  }

  #[test]
  fn positions_are_one_based() {
    let lexer = Lexer::new("let x\nlet y");
    let tokens: Vec<_> = Tokens(lexer).map(|(_, t)| t.pos).collect();
    assert_eq!(tokens[0], Pos { row: 1, col: 1 });
    assert_eq!(tokens[1], Pos { row: 1, col: 5 });
    assert_eq!(tokens[2], Pos { row: 2, col: 1 });
    assert_eq!(tokens[3], Pos { row: 2, col: 5 });
  }

  #[test]
  fn minus_minus_is_comment_not_operators() {
    use TokenKind::*;
    assert_eq!(kinds("a --b\n- c"), vec![Lit_Ident, Op_Minus, Lit_Ident]);
  }
}

//! Declarations and statements.

use std::rc::Rc;

use super::{ClassState, Emitter, FuncKind, LoopState};
use crate::bytecode::{Constant, Opcode};
use crate::syntax::lexer::TokenKind;

impl<'src> Emitter<'src> {
  pub(crate) fn declaration(&mut self) {
    if self.match_(TokenKind::Kw_Class) {
      self.class_declaration();
    } else if self.match_(TokenKind::Kw_Func) {
      self.func_declaration();
    } else if self.match_(TokenKind::Kw_Let) {
      self.var_declaration();
    } else {
      self.statement();
    }

    if self.panicking() {
      self.synchronize();
    }
  }

  fn statement(&mut self) {
    if self.match_(TokenKind::Kw_Assert) {
      self.assert_statement();
    } else if self.match_(TokenKind::Kw_Break) {
      self.break_statement();
    } else if self.match_(TokenKind::Kw_Continue) {
      self.continue_statement();
    } else if self.match_(TokenKind::Kw_For) {
      self.for_statement();
    } else if self.match_(TokenKind::Kw_If) {
      self.if_statement();
    } else if self.match_(TokenKind::Kw_Return) {
      self.return_statement();
    } else if self.match_(TokenKind::Kw_While) {
      self.while_statement();
    } else if self.match_(TokenKind::Brk_CurlyL) {
      self.begin_scope();
      self.block();
      self.end_scope();
    } else {
      self.expression_statement();
    }
  }

  fn expression_statement(&mut self) {
    self.expression();
    self.consume(TokenKind::Tok_Semicolon, "Expected ';' after expression");
    self.emit_op(Opcode::Pop);
  }

  fn var_declaration(&mut self) {
    let global = self.parse_variable("Expected variable name");

    if self.match_(TokenKind::Op_Equal) {
      self.expression();
    } else {
      self.emit_op(Opcode::Nil);
    }

    self.consume(
      TokenKind::Tok_Semicolon,
      "Expected ';' after variable declaration",
    );
    self.define_variable(global);
  }

  fn func_declaration(&mut self) {
    let global = self.parse_variable("Expected function name");
    let name = self.previous_lexeme().to_string();
    self.mark_initialized();
    self.function(FuncKind::Function, Some(name));
    self.define_variable(global);
  }

  /// Compiles a function body into its own chunk, then emits `CLOSURE` plus
  /// the `(is_local, index)` capture pairs in the enclosing chunk. `name` is
  /// `None` for anonymous function expressions.
  pub(crate) fn function(&mut self, kind: FuncKind, name: Option<String>) {
    let pos = self.previous.pos;

    self.push_func(kind, name, pos);
    self.begin_scope();

    self.consume(TokenKind::Brk_ParenL, "Expected '(' after function name");
    if !self.check(TokenKind::Brk_ParenR) {
      loop {
        self.state_mut().arity += 1;
        if self.state().arity > u8::MAX as usize {
          self.error_at_current("Can't have more than 255 parameters");
        }
        let constant = self.parse_variable("Expected parameter name");
        self.define_variable(constant);

        if self.match_(TokenKind::Brk_SquareL) {
          self.consume(
            TokenKind::Brk_SquareR,
            "Expected ']' after '[' in argument list",
          );
          self.state_mut().has_varargs = true;
          break;
        }

        if !self.match_(TokenKind::Tok_Comma) {
          break;
        }
      }
    }

    self.consume(TokenKind::Brk_ParenR, "Expected ')' after parameters");
    self.consume(TokenKind::Brk_CurlyL, "Expected '{' after function body");
    self.block();

    let (script, upvalues) = self.pop_func();
    let index = self.make_constant(Constant::Function(Rc::new(script)));
    self.emit_var_op(Opcode::Closure, index);

    for upvalue in upvalues {
      self.emit_byte(upvalue.is_local as u8);
      self.emit_byte(upvalue.index);
    }
  }

  fn method(&mut self) {
    let (name, func_name) = if self.match_(TokenKind::Kw_Operator) {
      let (name, func_name) = self.op_overload();
      (name, Some(func_name))
    } else {
      self.consume(TokenKind::Kw_Func, "Expected method declaration");
      self.consume(TokenKind::Lit_Ident, "Expected method name");
      let name = self.previous_lexeme().to_string();
      (name.clone(), Some(name))
    };

    let constant = self.ident_constant(&name);

    let kind = if name == "init" {
      FuncKind::Initializer
    } else {
      FuncKind::Method
    };

    self.function(kind, func_name);
    self.emit_var_op(Opcode::Method, constant);
  }

  /// Parses the symbol after `operator` and yields the well-known method
  /// table name plus the display name of the compiled function.
  fn op_overload(&mut self) -> (String, String) {
    if let Some(name) = overload_name(self.current.kind) {
      let symbol = self.current.kind.name();
      self.advance();
      return (name.to_string(), format!("operator {symbol}"));
    }

    if self.match_(TokenKind::Brk_SquareL) {
      if self.match_(TokenKind::Tok_Colon) {
        self.consume(TokenKind::Brk_SquareR, "Expected ']' after ':' symbol");
        if self.match_(TokenKind::Op_Equal) {
          return ("__set_slice__".to_string(), "operator [:]=".to_string());
        }
        return ("__get_slice__".to_string(), "operator [:]".to_string());
      }
      self.consume(TokenKind::Brk_SquareR, "Expected ']' after '[' symbol");
      if self.match_(TokenKind::Op_Equal) {
        return ("__set_index__".to_string(), "operator []=".to_string());
      }
      return ("__get_index__".to_string(), "operator []".to_string());
    }

    if self.match_(TokenKind::Kw_Unary) {
      self.consume(TokenKind::Op_Minus, "Expected '-' after 'unary'");
      return ("__neg__".to_string(), "operator unary-".to_string());
    }

    self.error("Expected operator symbol after 'operator'");
    ("invalid operator".to_string(), "invalid operator".to_string())
  }

  fn class_declaration(&mut self) {
    self.consume(TokenKind::Lit_Ident, "Expected class name");
    let class_name = self.previous_lexeme().to_string();
    let name_constant = self.ident_constant(&class_name);
    self.declare_variable();

    self.emit_var_op(Opcode::Class, name_constant);
    self.define_variable(name_constant);

    self.classes.push(ClassState {
      has_superclass: false,
    });

    if self.match_(TokenKind::Tok_Colon) {
      self.consume(TokenKind::Lit_Ident, "Expected superclass name");
      let superclass_name = self.previous_lexeme().to_string();
      self.named_variable(&superclass_name, false);

      if class_name == superclass_name {
        self.error("A class can't inherit from itself");
      }

      self.begin_scope();
      self.add_local("super".to_string());
      self.define_variable(0);

      self.named_variable(&class_name, false);
      self.emit_op(Opcode::Inherit);
      self.classes.last_mut().unwrap().has_superclass = true;
    }

    self.named_variable(&class_name, false);
    self.consume(TokenKind::Brk_CurlyL, "Expected '{' before class body");
    while !self.check(TokenKind::Brk_CurlyR) && !self.check(TokenKind::Tok_Eof) {
      self.method();
    }
    self.consume(TokenKind::Brk_CurlyR, "Expected '}' after class body");
    self.emit_op(Opcode::Pop);

    if self.classes.last().unwrap().has_superclass {
      self.end_scope();
    }

    self.classes.pop();
  }

  /// `assert expr;` or `assert expr, msg;`. The opcode is followed by the
  /// statement's row, column, and a constant naming the source path, each as
  /// three bytes, so the runtime can report the location.
  fn assert_statement(&mut self) {
    let pos = self.previous.pos;

    self.expression();

    if self.match_(TokenKind::Tok_Comma) {
      self.expression();
      self.emit_op(Opcode::AssertMsg);
    } else {
      self.emit_op(Opcode::Assert);
    }

    self.emit_u24(pos.row as usize);
    self.emit_u24(pos.col as usize);

    let path = self.path.clone();
    let constant = self.make_constant(Constant::String(path.into()));
    if constant > 0xff_ffff {
      self.error("Too many constants in one chunk");
    }
    self.emit_u24(constant);

    self.consume(
      TokenKind::Tok_Semicolon,
      "Expected ';' after assert statement",
    );
  }

  fn break_statement(&mut self) {
    if self.state().loops.is_empty() {
      self.error("Can't use 'break' outside of loop");
      return;
    }

    self.consume(TokenKind::Tok_Semicolon, "Expected ';' after 'break'");
    let base = self.state().loops.last().unwrap().locals;
    self.emit_scope_unwind(base);
    let jump = self.emit_jump(Opcode::Jump);
    self.state_mut().loops.last_mut().unwrap().breaks.push(jump);
  }

  fn continue_statement(&mut self) {
    let (start, base) = match self.state().loops.last() {
      Some(loop_) => (loop_.start, loop_.body_locals),
      None => {
        self.error("Can't use 'continue' outside of loop");
        return;
      }
    };

    self.consume(TokenKind::Tok_Semicolon, "Expected ';' after 'continue'");
    self.emit_scope_unwind(base);
    self.emit_loop(start);
  }

  /// Clauses map to: initializer, condition + exit jump, body, increment,
  /// loop-back, with the body reached through an initial jump trampoline.
  ///
  /// A loop variable declared in the initializer is copied into a fresh
  /// slot at the start of every iteration and copied back (closing any
  /// capture of it) in a per-iteration epilogue, so a closure made in the
  /// body observes that iteration's value.
  fn for_statement(&mut self) {
    self.begin_scope();
    self.consume(TokenKind::Brk_ParenL, "Expected '(' after 'for'");

    let locals_before = self.state().locals.len();
    if self.match_(TokenKind::Tok_Semicolon) {
      // no initializer
    } else if self.match_(TokenKind::Kw_Let) {
      self.var_declaration();
    } else {
      self.expression_statement();
    }
    let shadow = if self.state().locals.len() > locals_before {
      Some(self.state().locals.last().unwrap().name.clone())
    } else {
      None
    };

    let cond_start = self.chunk_len();
    let mut exit_jump = None;
    if !self.match_(TokenKind::Tok_Semicolon) {
      self.expression();
      self.consume(TokenKind::Tok_Semicolon, "Expected ';' after loop condition");
      exit_jump = Some(self.emit_jump(Opcode::JumpIfFalse));
      self.emit_op(Opcode::Pop);
    }

    let no_increment = self.match_(TokenKind::Brk_ParenR);
    let locals = self.state().locals.len();

    let loop_start = if !no_increment || shadow.is_some() {
      let body_jump = self.emit_jump(Opcode::Jump);
      let iter_start = self.chunk_len();
      self.state_mut().loops.push(LoopState {
        start: iter_start,
        breaks: Vec::new(),
        locals,
        body_locals: locals,
      });

      if shadow.is_some() {
        // copy the iteration value back into the loop variable, then close
        // it out of the iteration slot
        let slot = locals - 1;
        self.emit_var_op(Opcode::SetLocal, slot);
        self.emit_op(Opcode::CloseUpvalue);
      }

      if !no_increment {
        self.expression();
        self.emit_op(Opcode::Pop);
        self.consume(TokenKind::Brk_ParenR, "Expected ')' after for clause");
      }

      self.emit_loop(cond_start);
      self.patch_jump(body_jump);
      iter_start
    } else {
      self.state_mut().loops.push(LoopState {
        start: cond_start,
        breaks: Vec::new(),
        locals,
        body_locals: locals,
      });
      cond_start
    };

    if let Some(name) = &shadow {
      let slot = locals - 1;
      self.emit_var_op(Opcode::GetLocal, slot);
      self.state_mut().scope_depth += 1;
      self.add_local(name.clone());
      self.mark_initialized();
      self.state_mut().loops.last_mut().unwrap().body_locals = self.state().locals.len();
    }

    self.statement();
    self.emit_loop(loop_start);

    if shadow.is_some() {
      // the epilogue pops the iteration slot at runtime; drop it from the
      // compiler's view without emitting anything
      self.state_mut().locals.pop();
      self.state_mut().scope_depth -= 1;
    }

    if let Some(exit_jump) = exit_jump {
      self.patch_jump(exit_jump);
      self.emit_op(Opcode::Pop);
    }

    let loop_ = self.state_mut().loops.pop().unwrap();
    for offset in loop_.breaks {
      self.patch_jump(offset);
    }

    self.end_scope();
  }

  fn if_statement(&mut self) {
    self.consume(TokenKind::Brk_ParenL, "Expected '(' after 'if'");
    self.expression();
    self.consume(TokenKind::Brk_ParenR, "Expected ')' after condition");

    let then_jump = self.emit_jump(Opcode::JumpIfFalse);
    self.emit_op(Opcode::Pop);
    self.statement();

    let else_jump = self.emit_jump(Opcode::Jump);
    self.patch_jump(then_jump);
    self.emit_op(Opcode::Pop);

    if self.match_(TokenKind::Kw_Else) {
      self.statement();
    }

    self.patch_jump(else_jump);
  }

  fn return_statement(&mut self) {
    if self.state().kind == FuncKind::Script {
      self.error("Can't return from top-level code");
    }

    if self.match_(TokenKind::Tok_Semicolon) {
      self.emit_return();
    } else {
      if self.state().kind == FuncKind::Initializer {
        self.error("Can't return a value from an initializer");
      }

      self.expression();
      self.consume(TokenKind::Tok_Semicolon, "Expected ';' after return value");
      self.emit_op(Opcode::Return);
    }
  }

  fn while_statement(&mut self) {
    let loop_start = self.chunk_len();
    self.consume(TokenKind::Brk_ParenL, "Expected '(' after 'while'");
    self.expression();
    self.consume(TokenKind::Brk_ParenR, "Expected ')' after condition");

    let locals = self.state().locals.len();
    self.state_mut().loops.push(LoopState {
      start: loop_start,
      breaks: Vec::new(),
      locals,
      body_locals: locals,
    });

    let exit_jump = self.emit_jump(Opcode::JumpIfFalse);
    self.emit_op(Opcode::Pop);

    self.statement();
    self.emit_loop(loop_start);

    self.patch_jump(exit_jump);
    self.emit_op(Opcode::Pop);

    let loop_ = self.state_mut().loops.pop().unwrap();
    for offset in loop_.breaks {
      self.patch_jump(offset);
    }
  }

  pub(crate) fn block(&mut self) {
    while !self.check(TokenKind::Brk_CurlyR) && !self.check(TokenKind::Tok_Eof) {
      self.declaration();
    }

    self.consume(TokenKind::Brk_CurlyR, "Expected '}' after block");
  }
}

/// The `__op__` method table name for an overloadable operator symbol.
fn overload_name(kind: TokenKind) -> Option<&'static str> {
  use TokenKind::*;
  Some(match kind {
    Op_EqualEqual => "__eq__",
    Op_More => "__gt__",
    Op_MoreEqual => "__ge__",
    Op_Less => "__lt__",
    Op_LessEqual => "__le__",
    Op_Plus => "__add__",
    Op_Minus => "__sub__",
    Op_Star => "__mul__",
    Op_Slash => "__div__",
    Op_Percent => "__mod__",
    Op_Caret => "__xor__",
    Op_Pipe => "__bit_or__",
    Op_Amp => "__bit_and__",
    Op_Tilde => "__bit_not__",
    Op_Bang => "__log_not__",
    _ => return None,
  })
}

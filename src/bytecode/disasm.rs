//! Chunk disassembly, mostly for tests and debugging.
//!
//! The decoder accepts both the one-byte and the 24-bit operand form of every
//! operand-carrying opcode.

use std::fmt::Write;

use super::chunk::{Chunk, Constant as ChunkConstant};
use super::opcode::Opcode;

fn read_u16(code: &[u8], offset: usize) -> u16 {
  code[offset] as u16 | (code[offset + 1] as u16) << 8
}

fn read_u24(code: &[u8], offset: usize) -> usize {
  code[offset] as usize | (code[offset + 1] as usize) << 8 | (code[offset + 2] as usize) << 16
}

pub fn disassemble(chunk: &Chunk, name: &str) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "== {name} ==");
  let mut offset = 0;
  while offset < chunk.code().len() {
    offset = disassemble_instruction(chunk, offset, &mut out);
  }
  out
}

pub fn disassemble_instruction(chunk: &Chunk, offset: usize, out: &mut String) -> usize {
  use Opcode::*;

  let _ = write!(out, "{offset:04} ");
  let code = chunk.code();
  let op = match Opcode::from_byte(code[offset]) {
    Some(op) => op,
    None => {
      let _ = writeln!(out, "illegal 0x{:02x}", code[offset]);
      return offset + 1;
    }
  };

  let constant = |index: usize| -> String {
    match chunk.constants().get(index) {
      Some(c) => format!("{c}"),
      None => "<out of range>".to_string(),
    }
  };

  match op {
    Constant | DefineGlobal | GetGlobal | SetGlobal | GetSuper | GetProperty | SetProperty
    | Class | Method => {
      let index = code[offset + 1] as usize;
      let _ = writeln!(out, "{:<18} [{index}] ; {}", op.name(), constant(index));
      offset + 2
    }
    ConstantLong | DefineGlobalLong | GetGlobalLong | SetGlobalLong | GetSuperLong
    | GetPropertyLong | SetPropertyLong | ClassLong | MethodLong => {
      let index = read_u24(code, offset + 1);
      let _ = writeln!(out, "{:<18} [{index}] ; {}", op.name(), constant(index));
      offset + 4
    }
    GetLocal | SetLocal | GetUpvalue | SetUpvalue | Vector | List => {
      let index = code[offset + 1];
      let _ = writeln!(out, "{:<18} {index}", op.name());
      offset + 2
    }
    GetLocalLong | SetLocalLong | GetUpvalueLong | SetUpvalueLong | VectorLong | ListLong => {
      let index = read_u24(code, offset + 1);
      let _ = writeln!(out, "{:<18} {index}", op.name());
      offset + 4
    }
    Invoke | SuperInvoke => {
      let index = code[offset + 1] as usize;
      let argc = code[offset + 2];
      let _ = writeln!(out, "{:<18} [{index}] ({argc} args) ; {}", op.name(), constant(index));
      offset + 3
    }
    InvokeLong | SuperInvokeLong => {
      let index = read_u24(code, offset + 1);
      let argc = code[offset + 4];
      let _ = writeln!(out, "{:<18} [{index}] ({argc} args) ; {}", op.name(), constant(index));
      offset + 5
    }
    Closure | ClosureLong => {
      let (index, mut next) = if op == Closure {
        (code[offset + 1] as usize, offset + 2)
      } else {
        (read_u24(code, offset + 1), offset + 4)
      };
      let _ = writeln!(out, "{:<18} [{index}] ; {}", op.name(), constant(index));
      let upvalue_count = match chunk.constants().get(index) {
        Some(ChunkConstant::Function(func)) => func.upvalue_count,
        _ => 0,
      };
      for _ in 0..upvalue_count {
        let is_local = code[next];
        let slot = code[next + 1];
        let kind = if is_local == 1 { "local" } else { "upvalue" };
        let _ = writeln!(out, "{next:04}    | {kind} {slot}");
        next += 2;
      }
      next
    }
    Assert | AssertMsg => {
      let row = read_u24(code, offset + 1);
      let col = read_u24(code, offset + 4);
      let path = read_u24(code, offset + 7);
      let _ = writeln!(out, "{:<18} row:{row} col:{col} in {}", op.name(), constant(path));
      offset + 10
    }
    Call => {
      let argc = code[offset + 1];
      let _ = writeln!(out, "{:<18} ({argc} args)", op.name());
      offset + 2
    }
    Jump | JumpIfFalse => {
      let jump = read_u16(code, offset + 1) as usize;
      let _ = writeln!(out, "{:<18} {offset} -> {}", op.name(), offset + 3 + jump);
      offset + 3
    }
    Loop => {
      let jump = read_u16(code, offset + 1) as usize;
      let _ = writeln!(out, "{:<18} {offset} -> {}", op.name(), offset + 3 - jump);
      offset + 3
    }
    GetIndex | SetIndex | True | False | Nil | Pop | Spread | Range | Add | Sub | Mul | Div
    | Mod | BitAnd | BitOr | Xor | Eq | Gt | Ge | Lt | Le | Neg | LogNot | BitNot
    | CloseUpvalue | Inherit | Return => {
      let _ = writeln!(out, "{}", op.name());
      offset + 1
    }
  }
}

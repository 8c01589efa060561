//! Xylia: a small dynamic scripting language.
//!
//! The crate is the language core: a single-pass bytecode compiler
//! ([`emit`]), a stack-based virtual machine ([`vm`]) with a precise
//! mark-and-sweep collector ([`gc`]), and the builtin registry the VM
//! consults as a global fallback. The launcher, line editor, and the rest of
//! the standard library live with the host; they talk to the core through
//! [`Vm::interpret`], [`Vm::register_builtin`], and [`SourceLoader`].
//!
//! ```
//! use xylia::{Status, Vm};
//!
//! let mut vm = Vm::builder().with_output(Vec::<u8>::new()).build();
//! let status = vm.interpret(r#"println("hello");"#, "hello.xyl");
//! assert_eq!(status, Status::Ok);
//! let out = vm.output::<Vec<u8>>().unwrap();
//! assert_eq!(std::str::from_utf8(out).unwrap(), "hello\n");
//! ```

#![recursion_limit = "256"]

mod builtins;
pub mod bytecode;
mod emit;
pub mod error;
mod gc;
pub mod object;
pub mod span;
pub mod syntax;
pub mod value;
pub mod vm;

pub use error::{EmitError, Error, Result};
pub use gc::{Handle, Heap};
pub use object::BuiltinFn;
pub use value::Value;
pub use vm::{FsLoader, MemoryLoader, Output, Signal, SourceLoader, Status, Vm, VmBuilder};

/// Checks that `source` parses and compiles, without running it.
pub fn check(source: &str, path: &str) -> Result<(), Vec<EmitError>> {
  emit::emit(source, path)?;
  Ok(())
}

#[cfg(test)]
mod tests;

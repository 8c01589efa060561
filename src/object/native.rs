use crate::value::Value;
use crate::vm::Vm;

/// A host function. Arguments are passed as a copied slice of the stack; the
/// originals stay on the stack for the duration of the call, so they remain
/// GC roots.
pub type BuiltinFn = fn(&mut Vm, &[Value]) -> Value;

pub struct Builtin {
  pub function: BuiltinFn,
}

impl Builtin {
  pub fn new(function: BuiltinFn) -> Self {
    Self { function }
  }
}

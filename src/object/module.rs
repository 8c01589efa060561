use std::rc::Rc;

use crate::gc::Handle;
use crate::object::{FunctionScript, Table};

/// The compiler's output for one source file.
pub struct ModuleScript {
  pub name: String,
  pub root: Rc<FunctionScript>,
}

/// A loaded module: its own globals table and a one-shot `init` closure.
/// Imports of the same logical path return the cached module.
pub struct Module {
  pub name: Handle,
  pub globals: Table,
  pub init: Option<Handle>,
}

impl Module {
  pub fn new(name: Handle) -> Self {
    Self {
      name,
      globals: Table::new(),
      init: None,
    }
  }
}

//! `typeof`, `isinstance`, `exit`, `argv`, and the module import protocol.

use super::{check_arity, expect_string, Arity};
use crate::emit;
use crate::object::Object;
use crate::value::Value;
use crate::vm::{Signal, Vm};

const SOURCE_EXT: &str = ".xyl";

pub(crate) fn type_of(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "typeof", Arity::Exact(1), args.len()) {
    return Value::Nil;
  }
  let kind = vm.heap.kind_name(args[0]);
  let s = vm.intern(kind);
  Value::Obj(s)
}

pub(crate) fn isinstance(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "isinstance", Arity::Exact(2), args.len()) {
    return Value::Nil;
  }

  let instance = match args[0].as_obj() {
    Some(h) => match vm.heap.get(h) {
      Object::Instance(i) => Some(i.class),
      _ => None,
    },
    None => None,
  };
  let Some(class_of_instance) = instance else {
    let kind = vm.heap.kind_name(args[0]);
    vm.runtime_error(format!(
      "Expected argument 1 in 'isinstance' to be 'instance' but got '{kind}'"
    ));
    return Value::Nil;
  };

  let class = match args[1].as_obj() {
    Some(h) if matches!(vm.heap.get(h), Object::Class(_)) => Some(h),
    _ => None,
  };
  let Some(class) = class else {
    let kind = vm.heap.kind_name(args[1]);
    vm.runtime_error(format!(
      "Expected argument 2 in 'isinstance' to be 'class' but got '{kind}'"
    ));
    return Value::Nil;
  };

  Value::Bool(class_of_instance == class)
}

pub(crate) fn exit(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "exit", Arity::AtMost(1), args.len()) {
    return Value::Nil;
  }

  if args.len() == 1 {
    let Value::Number(code) = args[0] else {
      let kind = vm.heap.kind_name(args[0]);
      vm.runtime_error(format!(
        "Expected argument 1 in 'exit' to be 'number' but got '{kind}'"
      ));
      return Value::Nil;
    };
    vm.set_signal(Signal::Halt, code as i32);
  } else {
    vm.set_signal(Signal::Halt, -1);
  }

  Value::Nil
}

pub(crate) fn argv(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "argv", Arity::Exact(0), args.len()) {
    return Value::Nil;
  }
  match vm.args {
    Some(list) => Value::Obj(list),
    None => Value::Nil,
  }
}

/// `import(path)`: returns the cached module for the logical path, or
/// compiles and loads it. A bare name resolves to `$XYL_HOME/lib/<name>.xyl`;
/// a path ending in the source extension is read as-is. The module's init
/// closure runs in a frame flagged `is_module`, so its return value is
/// discarded and the module stays where the caller stored it.
pub(crate) fn import(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "import", Arity::Exact(1), args.len()) {
    return Value::Nil;
  }
  let Some(path) = expect_string(vm, "import", args, 0) else {
    return Value::Nil;
  };

  let hash = vm.str_hash(path);
  if let Some(module) = vm.module_lookup.get(path, hash) {
    return module;
  }

  let logical = vm.heap.string(path).as_str().to_string();
  let physical = if logical.ends_with(SOURCE_EXT) {
    logical.clone()
  } else {
    let home = match std::env::var("XYL_HOME") {
      Ok(home) => home,
      Err(_) => {
        vm.runtime_error("Could not find $XYL_HOME env variable");
        return Value::Nil;
      }
    };
    format!("{home}/lib/{logical}{SOURCE_EXT}")
  };

  let Some(source) = vm.read_source(&physical) else {
    vm.runtime_error(format!("Could not open file '{physical}'"));
    return Value::Nil;
  };

  let script = match emit::emit(&source, &logical) {
    Ok(script) => script,
    Err(errors) => {
      for error in &errors {
        eprintln!("{}", error.styled());
      }
      vm.runtime_error(format!("Failed to compile module '{logical}'"));
      return Value::Nil;
    }
  };

  let module = vm.instantiate(&script);
  vm.push(Value::Obj(module));
  vm.module_lookup.set(path, hash, Value::Obj(module));
  vm.pop();

  let init = vm.heap.module(module).init.expect("module init closure");
  vm.push_frame(init, 0, true);

  Value::Obj(module)
}

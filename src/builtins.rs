//! The standard builtin registry. Builtins are host functions consulted as a
//! global fallback; [`register_all`] installs the standard set at VM init.

mod cast;
mod io;
mod seq;
mod test;
mod util;

use crate::gc::Handle;
use crate::object::Object;
use crate::value::Value;
use crate::vm::Vm;

pub(crate) fn register_all(vm: &mut Vm) {
  vm.register_builtin("print", io::print);
  vm.register_builtin("println", io::println);
  vm.register_builtin("printf", io::printf);
  vm.register_builtin("input", io::input);

  vm.register_builtin("open", io::open);
  vm.register_builtin("close", io::close);
  vm.register_builtin("read", io::read);
  vm.register_builtin("write", io::write);

  vm.register_builtin("len", seq::len);
  vm.register_builtin("append", seq::append);
  vm.register_builtin("pop", seq::pop);
  vm.register_builtin("insert", seq::insert);
  vm.register_builtin("remove", seq::remove);
  vm.register_builtin("slice", seq::slice);

  vm.register_builtin("typeof", util::type_of);
  vm.register_builtin("isinstance", util::isinstance);
  vm.register_builtin("exit", util::exit);
  vm.register_builtin("argv", util::argv);

  vm.register_builtin("import", util::import);

  vm.register_builtin("string", cast::string);
  vm.register_builtin("number", cast::number);
  vm.register_builtin("float", cast::float);
  vm.register_builtin("bool", cast::bool_);
  vm.register_builtin("vector", cast::vector);
  vm.register_builtin("list", cast::list);

  vm.register_builtin("case_failed", test::case_failed);

  vm.register_builtin("assert_true", test::assert_true);
  vm.register_builtin("assert_false", test::assert_false);
  vm.register_builtin("assert_eq", test::assert_eq);
  vm.register_builtin("assert_neq", test::assert_neq);
}

pub(crate) enum Arity {
  Exact(usize),
  AtLeast(usize),
  AtMost(usize),
}

pub(crate) fn check_arity(vm: &mut Vm, name: &str, arity: Arity, argc: usize) -> bool {
  let (ok, expected, quantifier) = match arity {
    Arity::Exact(n) => (argc == n, n, ""),
    Arity::AtLeast(n) => (argc >= n, n, "at least "),
    Arity::AtMost(n) => (argc <= n, n, "at most "),
  };
  if !ok {
    let noun = if expected == 1 {
      "argument"
    } else {
      "arguments"
    };
    vm.runtime_error(format!(
      "Expected {quantifier}{expected} {noun} in '{name}' but got {argc}"
    ));
  }
  ok
}

fn type_error(vm: &mut Vm, name: &str, index: usize, want: &str, got: Value) {
  let got = vm.heap.kind_name(got);
  vm.runtime_error(format!(
    "Expected argument {} in '{name}' to be '{want}' but got '{got}'",
    index + 1
  ));
}

pub(crate) fn expect_string(vm: &mut Vm, name: &str, args: &[Value], index: usize) -> Option<Handle> {
  match args[index] {
    Value::Obj(h) if matches!(vm.heap.get(h), Object::String(_)) => Some(h),
    v => {
      type_error(vm, name, index, "string", v);
      None
    }
  }
}

pub(crate) fn expect_vector(vm: &mut Vm, name: &str, args: &[Value], index: usize) -> Option<Handle> {
  match args[index] {
    Value::Obj(h) if matches!(vm.heap.get(h), Object::Vector(_)) => Some(h),
    v => {
      type_error(vm, name, index, "vector", v);
      None
    }
  }
}

pub(crate) fn expect_file(vm: &mut Vm, name: &str, args: &[Value], index: usize) -> Option<Handle> {
  match args[index] {
    Value::Obj(h) if matches!(vm.heap.get(h), Object::File(_)) => Some(h),
    v => {
      type_error(vm, name, index, "file", v);
      None
    }
  }
}

pub(crate) fn expect_number(vm: &mut Vm, name: &str, args: &[Value], index: usize) -> Option<i64> {
  match args[index] {
    Value::Number(n) => Some(n),
    v => {
      type_error(vm, name, index, "number", v);
      None
    }
  }
}

pub(crate) fn expect_bool(vm: &mut Vm, name: &str, args: &[Value], index: usize) -> Option<bool> {
  match args[index] {
    Value::Bool(b) => Some(b),
    v => {
      type_error(vm, name, index, "bool", v);
      None
    }
  }
}

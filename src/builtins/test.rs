//! Testing builtins. Failures raise the sticky `TEST_ASSERT_FAIL` signal,
//! which `case_failed` reads and clears.

use super::{check_arity, expect_bool, Arity};
use crate::value::Value;
use crate::vm::{Signal, Vm};

pub(crate) fn case_failed(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "case_failed", Arity::Exact(0), args.len()) {
    return Value::Nil;
  }
  let failed = vm.signal == Signal::TestAssertFail;
  vm.signal = Signal::None;
  Value::Bool(failed)
}

pub(crate) fn assert_true(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "assert_true", Arity::Exact(1), args.len()) {
    return Value::Nil;
  }
  match expect_bool(vm, "assert_true", args, 0) {
    Some(true) => {}
    Some(false) => vm.signal = Signal::TestAssertFail,
    None => {}
  }
  Value::Nil
}

pub(crate) fn assert_false(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "assert_false", Arity::Exact(1), args.len()) {
    return Value::Nil;
  }
  match expect_bool(vm, "assert_false", args, 0) {
    Some(false) => {}
    Some(true) => vm.signal = Signal::TestAssertFail,
    None => {}
  }
  Value::Nil
}

pub(crate) fn assert_eq(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "assert_eq", Arity::Exact(2), args.len()) {
    return Value::Nil;
  }
  if !vm.heap.values_equal(args[0], args[1]) {
    vm.signal = Signal::TestAssertFail;
  }
  Value::Nil
}

pub(crate) fn assert_neq(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "assert_neq", Arity::Exact(2), args.len()) {
    return Value::Nil;
  }
  if vm.heap.values_equal(args[0], args[1]) {
    vm.signal = Signal::TestAssertFail;
  }
  Value::Nil
}

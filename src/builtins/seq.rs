//! Sequence builtins: `len`, `append`, `pop`, `insert`, `remove`, `slice`.

use super::{check_arity, expect_number, expect_vector, Arity};
use crate::object::{List, Object, Vector};
use crate::value::Value;
use crate::vm::Vm;

pub(crate) fn len(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "len", Arity::Exact(1), args.len()) {
    return Value::Nil;
  }

  let length = match args[0].as_obj() {
    Some(h) => match vm.heap.get(h) {
      Object::String(s) => Some(s.len()),
      Object::Vector(v) => Some(v.values.len()),
      Object::List(l) => Some(l.values.len()),
      _ => None,
    },
    None => None,
  };

  match length {
    Some(length) => Value::Number(length as i64),
    None => {
      vm.runtime_error("Expected first argument in len to be string or vector");
      Value::Nil
    }
  }
}

/// Appends values to a vector. A spread-flagged vector or list argument is
/// expanded element-wise; the flag is consumed.
pub(crate) fn append(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "append", Arity::AtLeast(2), args.len()) {
    return Value::Nil;
  }
  let Some(target) = expect_vector(vm, "append", args, 0) else {
    return Value::Nil;
  };

  for &arg in &args[1..] {
    let expanded = match arg.as_obj() {
      Some(h) => match vm.heap.get_mut(h) {
        Object::Vector(v) if v.spread => {
          v.spread = false;
          Some(v.values.clone())
        }
        Object::List(l) if l.spread => {
          l.spread = false;
          Some(l.values.to_vec())
        }
        _ => None,
      },
      None => None,
    };
    match expanded {
      Some(values) => vm.heap.vector_mut(target).values.extend(values),
      None => vm.heap.vector_mut(target).values.push(arg),
    }
  }

  Value::Nil
}

pub(crate) fn pop(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "pop", Arity::Exact(1), args.len()) {
    return Value::Nil;
  }
  let Some(vector) = expect_vector(vm, "pop", args, 0) else {
    return Value::Nil;
  };

  match vm.heap.vector_mut(vector).values.pop() {
    Some(value) => value,
    None => {
      vm.runtime_error("pop called on empty vector");
      Value::Nil
    }
  }
}

pub(crate) fn insert(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "insert", Arity::Exact(3), args.len()) {
    return Value::Nil;
  }
  let (Some(vector), Some(index)) = (
    expect_vector(vm, "insert", args, 0),
    expect_number(vm, "insert", args, 1),
  ) else {
    return Value::Nil;
  };

  let count = vm.heap.vector(vector).values.len();
  if index < 0 || index as usize > count {
    vm.runtime_error(format!("Index {index} out of range"));
    return Value::Nil;
  }

  vm.heap
    .vector_mut(vector)
    .values
    .insert(index as usize, args[2]);
  Value::Nil
}

pub(crate) fn remove(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "remove", Arity::Exact(2), args.len()) {
    return Value::Nil;
  }
  let (Some(vector), Some(index)) = (
    expect_vector(vm, "remove", args, 0),
    expect_number(vm, "remove", args, 1),
  ) else {
    return Value::Nil;
  };

  let count = vm.heap.vector(vector).values.len();
  if index < 0 || index as usize >= count {
    vm.runtime_error(format!("Index {index} out of range"));
    return Value::Nil;
  }

  vm.heap.vector_mut(vector).values.remove(index as usize)
}

pub(crate) fn slice(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "slice", Arity::Exact(3), args.len()) {
    return Value::Nil;
  }
  let (Some(from), Some(to)) = (
    expect_number(vm, "slice", args, 1),
    expect_number(vm, "slice", args, 2),
  ) else {
    return Value::Nil;
  };

  if from > to {
    vm.runtime_error("Start index can not be bigger than end index");
    return Value::Nil;
  }

  enum Source {
    Vector(Vec<Value>),
    List(Vec<Value>),
    Str(Vec<u8>),
    Other,
  }

  let source = match args[0].as_obj() {
    Some(h) => match vm.heap.get(h) {
      Object::Vector(v) => Source::Vector(v.values.clone()),
      Object::List(l) => Source::List(l.values.to_vec()),
      Object::String(s) => Source::Str(s.as_str().as_bytes().to_vec()),
      _ => Source::Other,
    },
    None => Source::Other,
  };

  let check_bounds = |vm: &mut Vm, len: usize| {
    for index in [from, to] {
      if index < 0 || index as usize > len {
        vm.runtime_error(format!("Index {index} out of range"));
        return false;
      }
    }
    true
  };

  match source {
    Source::Vector(values) => {
      if !check_bounds(vm, values.len()) {
        return Value::Nil;
      }
      let slice = values[from as usize..to as usize].to_vec();
      let vector = vm.alloc(Object::Vector(Vector::from_values(slice)));
      Value::Obj(vector)
    }
    Source::List(values) => {
      if !check_bounds(vm, values.len()) {
        return Value::Nil;
      }
      if from == to {
        vm.runtime_error("Can not create empty list slice");
        return Value::Nil;
      }
      let slice = values[from as usize..to as usize].to_vec();
      let list = vm.alloc(Object::List(List::from_values(slice)));
      Value::Obj(list)
    }
    Source::Str(bytes) => {
      if !check_bounds(vm, bytes.len()) {
        return Value::Nil;
      }
      let slice = String::from_utf8_lossy(&bytes[from as usize..to as usize]).into_owned();
      let s = vm.take_string(slice);
      Value::Obj(s)
    }
    Source::Other => {
      vm.runtime_error("Can call slice only on vector, list and string");
      Value::Nil
    }
  }
}

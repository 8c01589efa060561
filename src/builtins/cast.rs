//! Conversion builtins.

use super::{check_arity, Arity};
use crate::object::{List, Object, Vector};
use crate::value::Value;
use crate::vm::Vm;

pub(crate) fn string(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "string", Arity::Exact(1), args.len()) {
    return Value::Nil;
  }
  let rendered = vm.heap.stringify(args[0], false);
  let s = vm.take_string(rendered);
  Value::Obj(s)
}

pub(crate) fn number(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "number", Arity::Exact(1), args.len()) {
    return Value::Nil;
  }

  match args[0] {
    Value::Bool(b) => Value::Number(b as i64),
    Value::Nil => {
      vm.runtime_error("Can not cast 'nil' to 'number'");
      Value::Nil
    }
    Value::Number(n) => Value::Number(n),
    Value::Float(f) => Value::Number(f as i64),
    Value::Obj(h) => {
      let parsed = match vm.heap.get(h) {
        Object::String(s) => Some((s.as_str().to_string(), s.as_str().trim().parse::<i64>())),
        _ => None,
      };
      match parsed {
        Some((_, Ok(n))) => Value::Number(n),
        Some((s, Err(_))) => {
          vm.runtime_error(format!("Could not cast '{s}' to 'number'"));
          Value::Nil
        }
        None => {
          let kind = vm.heap.kind_name(args[0]);
          vm.runtime_error(format!("Can not cast '{kind}' to 'number'"));
          Value::Nil
        }
      }
    }
  }
}

pub(crate) fn float(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "float", Arity::Exact(1), args.len()) {
    return Value::Nil;
  }

  match args[0] {
    Value::Bool(_) => {
      vm.runtime_error("Can not cast 'bool' to 'float'");
      Value::Nil
    }
    Value::Nil => {
      vm.runtime_error("Can not cast 'nil' to 'float'");
      Value::Nil
    }
    Value::Number(n) => Value::Float(n as f64),
    Value::Float(f) => Value::Float(f),
    Value::Obj(h) => {
      let parsed = match vm.heap.get(h) {
        Object::String(s) => Some((s.as_str().to_string(), s.as_str().trim().parse::<f64>())),
        _ => None,
      };
      match parsed {
        Some((_, Ok(f))) if f.is_finite() => Value::Float(f),
        Some((s, _)) => {
          vm.runtime_error(format!("Could not cast '{s}' to 'float'"));
          Value::Nil
        }
        None => {
          let kind = vm.heap.kind_name(args[0]);
          vm.runtime_error(format!("Can not cast '{kind}' to 'float'"));
          Value::Nil
        }
      }
    }
  }
}

pub(crate) fn bool_(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "bool", Arity::Exact(1), args.len()) {
    return Value::Nil;
  }

  match args[0] {
    Value::Bool(b) => Value::Bool(b),
    Value::Nil => Value::Bool(false),
    Value::Number(n) => Value::Bool(n != 0),
    Value::Float(f) => Value::Bool(f != 0.0),
    Value::Obj(h) => {
      let parsed = match vm.heap.get(h) {
        Object::String(s) => Some(match s.as_str() {
          "true" => Ok(true),
          "false" => Ok(false),
          other => Err(other.to_string()),
        }),
        _ => None,
      };
      match parsed {
        Some(Ok(b)) => Value::Bool(b),
        Some(Err(s)) => {
          vm.runtime_error(format!("Could not cast '{s}' to 'bool'"));
          Value::Nil
        }
        None => {
          let kind = vm.heap.kind_name(args[0]);
          vm.runtime_error(format!("Can not cast '{kind}' to 'bool'"));
          Value::Nil
        }
      }
    }
  }
}

/// The numeric enumeration of a `from:to` range, ascending or descending.
fn range_values(vm: &mut Vm, from: Value, to: Value) -> Option<Vec<Value>> {
  let (Value::Number(from), Value::Number(to)) = (from, to) else {
    let from = vm.heap.kind_name(from);
    let to = vm.heap.kind_name(to);
    vm.runtime_error(format!(
      "Range must be 'number':'number' but got '{from}':'{to}'"
    ));
    return None;
  };

  let length = (to - from).unsigned_abs() as usize;
  let mut values = Vec::with_capacity(length);
  for i in 0..length as i64 {
    let v = if from < to { from + i } else { from - i };
    values.push(Value::Number(v));
  }
  Some(values)
}

pub(crate) fn vector(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "vector", Arity::Exact(1), args.len()) {
    return Value::Nil;
  }

  enum Src {
    Same,
    Values(Vec<Value>),
    Range(Value, Value),
    Other,
  }

  let src = match args[0].as_obj() {
    Some(h) => match vm.heap.get(h) {
      Object::Vector(_) => Src::Same,
      Object::List(l) => Src::Values(l.values.to_vec()),
      Object::Range(r) => Src::Range(r.from, r.to),
      _ => Src::Other,
    },
    None => Src::Other,
  };

  match src {
    Src::Same => args[0],
    Src::Values(values) => {
      let vector = vm.alloc(Object::Vector(Vector::from_values(values)));
      Value::Obj(vector)
    }
    Src::Range(from, to) => match range_values(vm, from, to) {
      Some(values) => {
        let vector = vm.alloc(Object::Vector(Vector::from_values(values)));
        Value::Obj(vector)
      }
      None => Value::Nil,
    },
    Src::Other => {
      let kind = vm.heap.kind_name(args[0]);
      vm.runtime_error(format!(
        "Expected argument 1 in 'vector' to be 'list', 'vector' or 'range' but got '{kind}'"
      ));
      Value::Nil
    }
  }
}

pub(crate) fn list(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "list", Arity::Exact(1), args.len()) {
    return Value::Nil;
  }

  enum Src {
    Same,
    Values(Vec<Value>),
    Range(Value, Value),
    Other,
  }

  let src = match args[0].as_obj() {
    Some(h) => match vm.heap.get(h) {
      Object::List(_) => Src::Same,
      Object::Vector(v) => Src::Values(v.values.clone()),
      Object::Range(r) => Src::Range(r.from, r.to),
      _ => Src::Other,
    },
    None => Src::Other,
  };

  match src {
    Src::Same => args[0],
    Src::Values(values) => {
      let list = vm.alloc(Object::List(List::from_values(values)));
      Value::Obj(list)
    }
    Src::Range(from, to) => match range_values(vm, from, to) {
      Some(values) => {
        let list = vm.alloc(Object::List(List::from_values(values)));
        Value::Obj(list)
      }
      None => Value::Nil,
    },
    Src::Other => {
      let kind = vm.heap.kind_name(args[0]);
      vm.runtime_error(format!(
        "Expected argument 1 in 'list' to be 'vector', 'list' or 'range' but got '{kind}'"
      ));
      Value::Nil
    }
  }
}

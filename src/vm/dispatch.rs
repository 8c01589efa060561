//! The instruction loop. One method per operator keeps the loop readable;
//! every operand-carrying opcode is decoded in both its one-byte and 24-bit
//! form.

use super::{Signal, Status, Vm, VmStr};
use crate::bytecode::Opcode;
use crate::gc::Handle;
use crate::object::Object;
use crate::value::Value;

impl Vm {
  fn read_byte(&mut self) -> u8 {
    let frame = self.frames.last().unwrap();
    let function = self.heap.closure(frame.closure).function;
    let byte = self.heap.function(function).script.chunk.code()[frame.ip];
    self.frames.last_mut().unwrap().ip += 1;
    byte
  }

  fn read_u16(&mut self) -> usize {
    let lo = self.read_byte() as usize;
    let hi = self.read_byte() as usize;
    lo | hi << 8
  }

  fn read_u24(&mut self) -> usize {
    let lo = self.read_byte() as usize;
    let mid = self.read_byte() as usize;
    let hi = self.read_byte() as usize;
    lo | mid << 8 | hi << 16
  }

  fn read_index(&mut self, long: bool) -> usize {
    if long {
      self.read_u24()
    } else {
      self.read_byte() as usize
    }
  }

  fn constant_at(&self, index: usize) -> Value {
    let frame = self.frames.last().unwrap();
    let function = self.heap.closure(frame.closure).function;
    self.heap.function(function).constants[index]
  }

  fn read_constant(&mut self, long: bool) -> Value {
    let index = self.read_index(long);
    self.constant_at(index)
  }

  fn read_string(&mut self, long: bool) -> Handle {
    match self.read_constant(long) {
      Value::Obj(handle) => handle,
      _ => unreachable!("name operand is always an interned string constant"),
    }
  }

  fn trace_instruction(&self) {
    let mut line = String::from("     ");
    for &value in &self.stack {
      line.push_str("[ ");
      line.push_str(&self.heap.stringify(value, true));
      line.push_str(" ]");
    }
    line.push('\n');

    let frame = self.frames.last().unwrap();
    let function = self.heap.closure(frame.closure).function;
    let chunk = &self.heap.function(function).script.chunk;
    crate::bytecode::disasm::disassemble_instruction(chunk, frame.ip, &mut line);
    eprint!("{line}");
  }

  pub(crate) fn run(&mut self) -> Status {
    use Opcode::*;

    loop {
      if self.trace {
        self.trace_instruction();
      }

      let byte = self.read_byte();
      let op = match Opcode::from_byte(byte) {
        Some(op) => op,
        None => {
          self.runtime_error(format!("Unknown opcode 0x{byte:02x}"));
          return Status::RuntimeError;
        }
      };

      match op {
        Constant | ConstantLong => {
          let value = self.read_constant(op == ConstantLong);
          self.push(value);
        }
        DefineGlobal | DefineGlobalLong => {
          let name = self.read_string(op == DefineGlobalLong);
          let module = self.frame().module;
          let value = self.peek(0);
          self.globals_set(module, name, value);
          self.pop();
        }
        GetGlobal | GetGlobalLong => {
          let name = self.read_string(op == GetGlobalLong);
          let module = self.frame().module;
          let value = self
            .globals_get(module, name)
            .or_else(|| self.builtin_get(name));
          match value {
            Some(value) => self.push(value),
            None => {
              let name = self.heap.string(name).to_string();
              self.runtime_error(format!("Undefined variable '{name}'"));
              return Status::RuntimeError;
            }
          }
        }
        SetGlobal | SetGlobalLong => {
          let name = self.read_string(op == SetGlobalLong);
          let module = self.frame().module;
          let value = self.peek(0);
          if self.globals_set(module, name, value) {
            self.globals_delete(module, name);
            let name = self.heap.string(name).to_string();
            self.runtime_error(format!("Undefined variable '{name}'"));
            return Status::RuntimeError;
          }
        }
        GetLocal | GetLocalLong => {
          let slot = self.read_index(op == GetLocalLong);
          let base = self.frame().base;
          let value = self.stack[base + slot];
          self.push(value);
        }
        SetLocal | SetLocalLong => {
          let slot = self.read_index(op == SetLocalLong);
          let base = self.frame().base;
          let value = self.peek(0);
          self.stack[base + slot] = value;
        }
        GetUpvalue | GetUpvalueLong => {
          let slot = self.read_index(op == GetUpvalueLong);
          let closure = self.frame().closure;
          let upvalue = self.heap.closure(closure).upvalues[slot];
          let value = match self.heap.upvalue(upvalue).location {
            Some(location) => self.stack[location],
            None => self.heap.upvalue(upvalue).closed,
          };
          self.push(value);
        }
        SetUpvalue | SetUpvalueLong => {
          let slot = self.read_index(op == SetUpvalueLong);
          let closure = self.frame().closure;
          let upvalue = self.heap.closure(closure).upvalues[slot];
          let value = self.peek(0);
          match self.heap.upvalue(upvalue).location {
            Some(location) => self.stack[location] = value,
            None => self.heap.upvalue_mut(upvalue).closed = value,
          }
        }
        GetSuper | GetSuperLong => {
          let name = self.read_string(op == GetSuperLong);
          let superclass = match self.pop() {
            Value::Obj(handle) => handle,
            _ => unreachable!("super slot always holds the superclass"),
          };
          if !self.bind_method(superclass, name) {
            return Status::RuntimeError;
          }
        }
        GetProperty | GetPropertyLong => {
          let name = self.read_string(op == GetPropertyLong);
          if !self.op_get_property(name) {
            return Status::RuntimeError;
          }
        }
        SetProperty | SetPropertyLong => {
          let name = self.read_string(op == SetPropertyLong);
          if !self.op_set_property(name) {
            return Status::RuntimeError;
          }
        }
        GetIndex => {
          if !self.op_get_index() {
            return Status::RuntimeError;
          }
        }
        SetIndex => {
          if !self.op_set_index() {
            return Status::RuntimeError;
          }
        }
        Invoke | InvokeLong => {
          let name = self.read_string(op == InvokeLong);
          let argc = self.read_byte() as usize;
          if !self.invoke(name, argc) {
            return Status::RuntimeError;
          }
        }
        SuperInvoke | SuperInvokeLong => {
          let name = self.read_string(op == SuperInvokeLong);
          let argc = self.read_byte() as usize;
          let superclass = match self.pop() {
            Value::Obj(handle) => handle,
            _ => unreachable!("super slot always holds the superclass"),
          };
          if !self.invoke_from_class(superclass, name, argc) {
            return Status::RuntimeError;
          }
        }
        Vector | VectorLong => {
          let count = self.read_index(op == VectorLong);
          let start = self.stack.len() - count;
          let values = self.stack[start..].to_vec();
          let vector = self.alloc(Object::Vector(crate::object::Vector::from_values(values)));
          self.stack.truncate(start);
          self.push(Value::Obj(vector));
        }
        List | ListLong => {
          let count = self.read_index(op == ListLong);
          let start = self.stack.len() - count;
          let values = self.stack[start..].to_vec();
          let list = self.alloc(Object::List(crate::object::List::from_values(values)));
          self.stack.truncate(start);
          self.push(Value::Obj(list));
        }
        Class | ClassLong => {
          let name = self.read_string(op == ClassLong);
          let class = self.alloc(Object::Class(crate::object::Class::new(name)));
          self.push(Value::Obj(class));
        }
        Closure | ClosureLong => {
          let function = match self.read_constant(op == ClosureLong) {
            Value::Obj(handle) => handle,
            _ => unreachable!("closure operand is always a function constant"),
          };
          let count = self.heap.function(function).upvalue_count();
          let mut upvalues = Vec::with_capacity(count);
          for _ in 0..count {
            let is_local = self.read_byte() == 1;
            let index = self.read_byte() as usize;
            if is_local {
              let base = self.frame().base;
              upvalues.push(self.capture_upvalue(base + index));
            } else {
              let enclosing = self.frame().closure;
              upvalues.push(self.heap.closure(enclosing).upvalues[index]);
            }
          }
          let closure = self.alloc(Object::Closure(crate::object::Closure {
            function,
            upvalues,
          }));
          self.push(Value::Obj(closure));
        }
        Method | MethodLong => {
          let name = self.read_string(op == MethodLong);
          self.define_method(name);
        }
        True => self.push(Value::Bool(true)),
        False => self.push(Value::Bool(false)),
        Nil => self.push(Value::Nil),
        Pop => {
          self.pop();
        }
        Spread => {
          let target = self.peek(0);
          let ok = match target.as_obj() {
            Some(handle) => match self.heap.get_mut(handle) {
              Object::List(l) => {
                l.spread = true;
                true
              }
              Object::Vector(v) => {
                v.spread = true;
                true
              }
              _ => false,
            },
            None => false,
          };
          if !ok {
            self.runtime_error("Can spread only 'list' and 'vector'");
            return Status::RuntimeError;
          }
        }
        Range => {
          let from = self.peek(1);
          let to = self.peek(0);
          let range = self.alloc(Object::Range(crate::object::Range { from, to }));
          self.pop();
          self.pop();
          self.push(Value::Obj(range));
        }
        Add => {
          if !self.op_add() {
            return Status::RuntimeError;
          }
        }
        Sub => {
          if !self.op_arith(
            VmStr::Sub,
            i64::wrapping_sub,
            |a, b| a - b,
            "Operands must be numbers, floats or objects with 'operator -' defined",
          ) {
            return Status::RuntimeError;
          }
        }
        Mul => {
          if !self.op_arith(
            VmStr::Mul,
            i64::wrapping_mul,
            |a, b| a * b,
            "Operands must be numbers, floats or objects with 'operator *' defined",
          ) {
            return Status::RuntimeError;
          }
        }
        Div => {
          if !self.op_div() {
            return Status::RuntimeError;
          }
        }
        Mod => {
          if !self.op_mod() {
            return Status::RuntimeError;
          }
        }
        BitAnd => {
          if !self.op_bitwise(
            VmStr::BitAnd,
            |a, b| a & b,
            "Operands must be numbers or objects with 'operator &' defined",
          ) {
            return Status::RuntimeError;
          }
        }
        BitOr => {
          if !self.op_bitwise(
            VmStr::BitOr,
            |a, b| a | b,
            "Operands must be numbers or objects with 'operator |' defined",
          ) {
            return Status::RuntimeError;
          }
        }
        Xor => {
          if !self.op_bitwise(
            VmStr::Xor,
            |a, b| a ^ b,
            "Operands must be numbers or objects with 'operator ^' defined",
          ) {
            return Status::RuntimeError;
          }
        }
        Eq => {
          if !self.op_eq() {
            return Status::RuntimeError;
          }
        }
        Gt => {
          if !self.op_compare(
            VmStr::Gt,
            |a, b| a > b,
            "Operands must be numbers, floats or objects with 'operator >' defined",
          ) {
            return Status::RuntimeError;
          }
        }
        Ge => {
          if !self.op_compare(
            VmStr::Ge,
            |a, b| a >= b,
            "Operands must be numbers, floats or objects with 'operator >=' defined",
          ) {
            return Status::RuntimeError;
          }
        }
        Lt => {
          if !self.op_compare(
            VmStr::Lt,
            |a, b| a < b,
            "Operands must be numbers, floats or objects with 'operator <' defined",
          ) {
            return Status::RuntimeError;
          }
        }
        Le => {
          if !self.op_compare(
            VmStr::Le,
            |a, b| a <= b,
            "Operands must be numbers, floats or objects with 'operator <=' defined",
          ) {
            return Status::RuntimeError;
          }
        }
        Neg => {
          if !self.op_neg() {
            return Status::RuntimeError;
          }
        }
        LogNot => {
          if !self.op_log_not() {
            return Status::RuntimeError;
          }
        }
        BitNot => {
          if !self.op_bit_not() {
            return Status::RuntimeError;
          }
        }
        CloseUpvalue => {
          self.close_upvalues(self.stack.len() - 1);
          self.pop();
        }
        Inherit => {
          let superclass = match self.peek(1) {
            Value::Obj(handle)
              if matches!(self.heap.get(handle), Object::Class(_)) =>
            {
              handle
            }
            _ => {
              self.runtime_error("Superclass must be a class");
              return Status::RuntimeError;
            }
          };
          let subclass = match self.peek(0) {
            Value::Obj(handle) => handle,
            _ => unreachable!("class declaration leaves the class on top"),
          };
          let methods: Vec<(Handle, Value)> =
            self.heap.class(superclass).methods.iter().collect();
          for (name, method) in methods {
            let hash = self.str_hash(name);
            self.heap.class_mut(subclass).methods.set(name, hash, method);
          }
          self.pop();
        }
        Assert => {
          let value = self.pop();
          let (row, col, path) = self.read_assert_location();
          if value.is_falsy() {
            self.runtime_error(format!(
              "Assertion failed at {path} row:{row} col:{col}"
            ));
            self.set_signal(Signal::AssertFail, -1);
            return Status::RuntimeError;
          }
        }
        AssertMsg => {
          let msg = self.pop();
          let value = self.pop();
          let (row, col, path) = self.read_assert_location();
          if value.is_falsy() {
            let msg = self.heap.stringify(msg, false);
            self.runtime_error(format!(
              "Assertion failed with: {msg} at {path} row:{row} col:{col}"
            ));
            self.set_signal(Signal::AssertFail, -1);
            return Status::RuntimeError;
          }
        }
        Call => {
          let argc = self.read_byte() as usize;
          let callee = self.peek(argc);
          if !self.call_value(callee, argc) {
            return Status::RuntimeError;
          }
        }
        Loop => {
          let offset = self.read_u16();
          self.frame_mut().ip -= offset;
        }
        Jump => {
          let offset = self.read_u16();
          self.frame_mut().ip += offset;
        }
        JumpIfFalse => {
          let offset = self.read_u16();
          if self.peek(0).is_falsy() {
            self.frame_mut().ip += offset;
          }
        }
        Return => {
          let result = self.pop();
          let base = self.frame().base;
          let is_module = self.frame().is_module;
          self.close_upvalues(base);
          self.frames.pop();
          if self.frames.is_empty() {
            self.pop();
            return Status::Ok;
          }
          self.stack.truncate(base);
          if !is_module {
            self.push(result);
          }
        }
      }

      match self.signal {
        Signal::None | Signal::TestAssertFail => {}
        Signal::Halt => return Status::Ok,
        Signal::AssertFail
        | Signal::StackOverflow
        | Signal::StackUnderflow
        | Signal::RuntimeError => return Status::RuntimeError,
      }
    }
  }

  fn read_assert_location(&mut self) -> (usize, usize, String) {
    let row = self.read_u24();
    let col = self.read_u24();
    let path_index = self.read_u24();
    let path = match self.constant_at(path_index) {
      Value::Obj(handle) => self.heap.string(handle).to_string(),
      _ => String::new(),
    };
    (row, col, path)
  }

  // Operators. Each applies the built-in numeric/string rule first, then
  // falls back to the instance overload, then errors.

  fn op_add(&mut self) -> bool {
    let b = self.peek(0);
    let a = self.peek(1);

    if let (Some(x), Some(y)) = (a.as_obj(), b.as_obj()) {
      if matches!(
        (self.heap.get(x), self.heap.get(y)),
        (Object::String(_), Object::String(_))
      ) {
        self.concatenate(x, y);
        return true;
      }
    }

    if a.is_numeric() && b.is_numeric() {
      let b = self.pop();
      let a = self.pop();
      self.push(arith(a, b, i64::wrapping_add, |a, b| a + b));
      return true;
    }

    if self.invoke_overload(VmStr::Add, 1) {
      return true;
    }
    self.runtime_error(
      "Operands must be numbers, floats, strings or objects with 'operator +' defined",
    );
    false
  }

  fn op_arith(
    &mut self,
    overload: VmStr,
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
    msg: &str,
  ) -> bool {
    let b = self.peek(0);
    let a = self.peek(1);

    if a.is_numeric() && b.is_numeric() {
      let b = self.pop();
      let a = self.pop();
      self.push(arith(a, b, int_op, float_op));
      return true;
    }

    if self.invoke_overload(overload, 1) {
      return true;
    }
    self.runtime_error(msg);
    false
  }

  fn op_div(&mut self) -> bool {
    let b = self.peek(0);
    let a = self.peek(1);

    // division always yields a float
    if a.is_numeric() && b.is_numeric() {
      let b = self.pop();
      let a = self.pop();
      self.push(Value::Float(promote(a) / promote(b)));
      return true;
    }

    if self.invoke_overload(VmStr::Div, 1) {
      return true;
    }
    self.runtime_error("Operands must be numbers, floats or objects with 'operator /' defined");
    false
  }

  fn op_mod(&mut self) -> bool {
    let b = self.peek(0);
    let a = self.peek(1);

    if let (Value::Number(x), Value::Number(y)) = (a, b) {
      if y == 0 {
        self.runtime_error("Division by zero");
        return false;
      }
      self.pop();
      self.pop();
      self.push(Value::Number(x.wrapping_rem(y)));
      return true;
    }

    if a.is_numeric() && b.is_numeric() {
      let b = self.pop();
      let a = self.pop();
      self.push(Value::Float(promote(a) % promote(b)));
      return true;
    }

    if self.invoke_overload(VmStr::Mod, 1) {
      return true;
    }
    self.runtime_error("Operands must be numbers, floats or objects with 'operator %' defined");
    false
  }

  fn op_bitwise(&mut self, overload: VmStr, int_op: fn(i64, i64) -> i64, msg: &str) -> bool {
    let b = self.peek(0);
    let a = self.peek(1);

    if let (Value::Number(x), Value::Number(y)) = (a, b) {
      self.pop();
      self.pop();
      self.push(Value::Number(int_op(x, y)));
      return true;
    }

    if self.invoke_overload(overload, 1) {
      return true;
    }
    self.runtime_error(msg);
    false
  }

  fn op_compare(&mut self, overload: VmStr, cmp: fn(f64, f64) -> bool, msg: &str) -> bool {
    let b = self.peek(0);
    let a = self.peek(1);

    if a.is_numeric() && b.is_numeric() {
      let b = self.pop();
      let a = self.pop();
      self.push(Value::Bool(cmp(promote(a), promote(b))));
      return true;
    }

    if self.invoke_overload(overload, 1) {
      return true;
    }
    self.runtime_error(msg);
    false
  }

  fn op_eq(&mut self) -> bool {
    let b = self.peek(0);
    let a = self.peek(1);

    if let Some(handle) = a.as_obj() {
      if matches!(self.heap.get(handle), Object::Instance(_))
        && self.invoke_overload(VmStr::Eq, 1)
      {
        return true;
      }
    }

    self.pop();
    self.pop();
    let equal = self.heap.values_equal(a, b);
    self.push(Value::Bool(equal));
    true
  }

  fn op_neg(&mut self) -> bool {
    match self.peek(0) {
      Value::Number(n) => {
        self.pop();
        self.push(Value::Number(n.wrapping_neg()));
        true
      }
      Value::Float(f) => {
        self.pop();
        self.push(Value::Float(-f));
        true
      }
      _ => {
        if self.invoke_overload(VmStr::Neg, 0) {
          return true;
        }
        self.runtime_error(
          "Operand must be number, float or object with 'operator unary-' defined",
        );
        false
      }
    }
  }

  fn op_log_not(&mut self) -> bool {
    let value = self.peek(0);
    if matches!(value, Value::Nil | Value::Bool(_)) {
      let value = self.pop();
      self.push(Value::Bool(value.is_falsy()));
      return true;
    }

    if self.invoke_overload(VmStr::LogNot, 0) {
      return true;
    }
    self.runtime_error("Operand must be boolean or object with 'operator !' defined");
    false
  }

  fn op_bit_not(&mut self) -> bool {
    if let Value::Number(n) = self.peek(0) {
      self.pop();
      self.push(Value::Number(!n));
      return true;
    }

    if self.invoke_overload(VmStr::BitNot, 0) {
      return true;
    }
    self.runtime_error("Operand must be number or object with 'operator ~' defined");
    false
  }

  fn op_get_property(&mut self, name: Handle) -> bool {
    let target = self.peek(0);

    enum Prop {
      Field(Value),
      Method(Handle),
      ModuleVal(Option<Value>),
      Other,
    }

    let prop = match target.as_obj() {
      Some(handle) => {
        let hash = self.str_hash(name);
        match self.heap.get(handle) {
          Object::Instance(i) => match i.fields.get(name, hash) {
            Some(value) => Prop::Field(value),
            None => Prop::Method(i.class),
          },
          Object::Module(m) => Prop::ModuleVal(m.globals.get(name, hash)),
          _ => Prop::Other,
        }
      }
      None => Prop::Other,
    };

    match prop {
      Prop::Field(value) => {
        self.pop();
        self.push(value);
        true
      }
      Prop::Method(class) => self.bind_method(class, name),
      Prop::ModuleVal(Some(value)) => {
        self.pop();
        self.push(value);
        true
      }
      Prop::ModuleVal(None) => {
        let name = self.heap.string(name).to_string();
        self.runtime_error(format!("Object does not have property '{name}'"));
        false
      }
      Prop::Other => {
        self.runtime_error("Only instances and modules have properties");
        false
      }
    }
  }

  fn op_set_property(&mut self, name: Handle) -> bool {
    let target = self.peek(1);
    let instance = match target.as_obj() {
      Some(handle) if matches!(self.heap.get(handle), Object::Instance(_)) => handle,
      _ => {
        self.runtime_error("Only instances have fields");
        return false;
      }
    };

    let value = self.peek(0);
    let hash = self.str_hash(name);
    self.heap.instance_mut(instance).fields.set(name, hash, value);
    let value = self.pop();
    self.pop();
    self.push(value);
    true
  }

  fn op_get_index(&mut self) -> bool {
    let index = self.peek(0);
    let object = self.peek(1);

    let is_instance = object
      .as_obj()
      .map_or(false, |h| matches!(self.heap.get(h), Object::Instance(_)));
    if is_instance {
      let range = index
        .as_obj()
        .filter(|&r| matches!(self.heap.get(r), Object::Range(_)));
      if let Some(range) = range {
        self.pop();
        let (from, to) = {
          let range = self.heap.range(range);
          (range.from, range.to)
        };
        self.push(from);
        self.push(to);
        if self.invoke_overload(VmStr::GetSlice, 2) {
          return true;
        }
      } else if self.invoke_overload(VmStr::GetIndex, 1) {
        return true;
      }
    }

    let Value::Number(n) = index else {
      self.runtime_error("Index must be a number or object with 'operator []'");
      return false;
    };

    let result = self.index_value(object, n);
    self.pop();
    self.pop();
    self.push(result);
    true
  }

  fn op_set_index(&mut self) -> bool {
    let value = self.peek(0);
    let index = self.peek(1);
    let object = self.peek(2);

    let is_instance = object
      .as_obj()
      .map_or(false, |h| matches!(self.heap.get(h), Object::Instance(_)));
    if is_instance {
      let range = index
        .as_obj()
        .filter(|&r| matches!(self.heap.get(r), Object::Range(_)));
      if let Some(range) = range {
        self.pop();
        self.pop();
        let (from, to) = {
          let range = self.heap.range(range);
          (range.from, range.to)
        };
        self.push(from);
        self.push(to);
        self.push(value);
        if self.invoke_overload(VmStr::SetSlice, 3) {
          return true;
        }
      } else if self.invoke_overload(VmStr::SetIndex, 2) {
        return true;
      }
    }

    let Value::Number(n) = index else {
      self.runtime_error("Index must be a number or object with 'operator []='");
      return false;
    };

    self.set_index_value(object, n, value);
    self.pop();
    self.pop();
    self.pop();
    self.push(value);
    true
  }
}

fn promote(value: Value) -> f64 {
  match value {
    Value::Number(n) => n as f64,
    Value::Float(f) => f,
    _ => 0.0,
  }
}

fn arith(a: Value, b: Value, int_op: fn(i64, i64) -> i64, float_op: fn(f64, f64) -> f64) -> Value {
  match (a, b) {
    (Value::Number(x), Value::Number(y)) => Value::Number(int_op(x, y)),
    _ => Value::Float(float_op(promote(a), promote(b))),
  }
}

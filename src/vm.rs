//! The virtual machine: value stack, call frames, call protocol, modules,
//! and signals. The instruction loop lives in [`dispatch`].

pub(crate) mod dispatch;

use std::any::Any;
use std::fmt::Write as _;
use std::io;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::bytecode::Constant;
use crate::emit;
use crate::gc::{Handle, Heap};
use crate::object::string::hash_str;
use crate::object::{
  BoundMethod, Builtin, BuiltinFn, Closure, Function, FunctionScript, Instance, List, Module,
  ModuleScript, Object, Str, Table, Upvalue,
};
use crate::value::Value;

const STACK_INIT: usize = 64;
const FRAMES_INIT: usize = 64;
const FRAMES_MAX: usize = 1024;

/// The result of one `interpret` invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
  Ok,
  CompileError,
  RuntimeError,
}

/// Set by built-ins and the VM itself; checked after every instruction.
/// `TestAssertFail` is sticky until read by the `case_failed` builtin; every
/// other non-`None` signal ends the current `run`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
  None,
  StackOverflow,
  StackUnderflow,
  TestAssertFail,
  AssertFail,
  RuntimeError,
  Halt,
}

/// Interned names the VM itself dispatches on.
#[derive(Clone, Copy)]
#[repr(usize)]
pub(crate) enum VmStr {
  Init,
  Eq,
  Gt,
  Ge,
  Lt,
  Le,
  Add,
  Sub,
  Mul,
  Div,
  Neg,
  Mod,
  Xor,
  BitOr,
  BitAnd,
  BitNot,
  LogNot,
  SetIndex,
  GetIndex,
  SetSlice,
  GetSlice,
}

const VM_STRINGS: &[&str] = &[
  "init",
  "__eq__",
  "__gt__",
  "__ge__",
  "__lt__",
  "__le__",
  "__add__",
  "__sub__",
  "__mul__",
  "__div__",
  "__neg__",
  "__mod__",
  "__xor__",
  "__bit_or__",
  "__bit_and__",
  "__bit_not__",
  "__log_not__",
  "__set_index__",
  "__get_index__",
  "__set_slice__",
  "__get_slice__",
];

pub(crate) struct CallFrame {
  pub closure: Handle,
  pub ip: usize,
  /// Stack index of slot 0: the callee, or `self` for methods.
  pub base: usize,
  /// The defining module; name lookups resolve in its globals.
  pub module: Handle,
  /// Module init frames discard their return value on `RETURN`.
  pub is_module: bool,
}

/// The output sink for `print` and friends. `as_any` lets tests downcast a
/// captured buffer back out.
pub trait Output: io::Write {
  fn as_any(&self) -> &dyn Any;
}

impl Output for io::Stdout {
  fn as_any(&self) -> &dyn Any {
    self
  }
}

impl Output for Vec<u8> {
  fn as_any(&self) -> &dyn Any {
    self
  }
}

/// `read_source` as supplied by the host.
pub trait SourceLoader {
  fn read_source(&mut self, path: &str) -> Option<String>;
}

/// Reads sources from the filesystem.
pub struct FsLoader;

impl SourceLoader for FsLoader {
  fn read_source(&mut self, path: &str) -> Option<String> {
    std::fs::read_to_string(path).ok()
  }
}

/// An in-memory source map, mainly for tests and embedding.
#[derive(Default)]
pub struct MemoryLoader {
  sources: IndexMap<String, String>,
}

impl MemoryLoader {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
    self.insert(path, source);
    self
  }

  pub fn insert(&mut self, path: impl Into<String>, source: impl Into<String>) {
    self.sources.insert(path.into(), source.into());
  }
}

impl SourceLoader for MemoryLoader {
  fn read_source(&mut self, path: &str) -> Option<String> {
    self.sources.get(path).cloned()
  }
}

pub struct Vm {
  pub(crate) heap: Heap,
  pub(crate) stack: Vec<Value>,
  pub(crate) frames: Vec<CallFrame>,
  /// Open upvalues ordered by descending stack slot.
  pub(crate) open_upvalues: Vec<Handle>,
  pub(crate) vm_strings: Vec<Handle>,
  pub(crate) module_lookup: Table,
  pub(crate) builtins: Table,
  pub(crate) args: Option<Handle>,
  pub(crate) signal: Signal,
  pub(crate) exit_code: i32,
  pub(crate) last_error: Option<String>,
  out: Box<dyn Output>,
  loader: Box<dyn SourceLoader>,
  gc_stress: bool,
  pub(crate) trace: bool,
}

pub struct VmBuilder {
  output: Option<Box<dyn Output>>,
  loader: Option<Box<dyn SourceLoader>>,
  gc_stress: bool,
  trace: bool,
}

impl Vm {
  pub fn builder() -> VmBuilder {
    VmBuilder {
      output: None,
      loader: None,
      gc_stress: false,
      trace: false,
    }
  }

  pub fn new() -> Self {
    Self::builder().build()
  }
}

impl Default for Vm {
  fn default() -> Self {
    Self::new()
  }
}

impl VmBuilder {
  pub fn with_output<T: Output + 'static>(mut self, output: T) -> Self {
    self.output = Some(Box::new(output));
    self
  }

  pub fn with_loader<T: SourceLoader + 'static>(mut self, loader: T) -> Self {
    self.loader = Some(Box::new(loader));
    self
  }

  /// Forces a full collection on every allocation.
  pub fn with_gc_stress(mut self) -> Self {
    self.gc_stress = true;
    self
  }

  /// Dumps the stack and each instruction to stderr while executing.
  pub fn with_trace(mut self) -> Self {
    self.trace = true;
    self
  }

  pub fn build(self) -> Vm {
    let mut vm = Vm {
      heap: Heap::new(),
      stack: Vec::with_capacity(STACK_INIT),
      frames: Vec::with_capacity(FRAMES_INIT),
      open_upvalues: Vec::new(),
      vm_strings: Vec::new(),
      module_lookup: Table::new(),
      builtins: Table::new(),
      args: None,
      signal: Signal::None,
      exit_code: 0,
      last_error: None,
      out: self.output.unwrap_or_else(|| Box::new(io::stdout())),
      loader: self.loader.unwrap_or(Box::new(FsLoader)),
      gc_stress: self.gc_stress,
      trace: self.trace,
    };

    for name in VM_STRINGS {
      let handle = vm.intern(name);
      vm.vm_strings.push(handle);
    }

    crate::builtins::register_all(&mut vm);
    vm.set_args(&[]);

    vm
  }
}

impl Vm {
  // Host interface.

  /// Compiles and runs `source`. `path` names the module in diagnostics and
  /// assert locations.
  pub fn interpret(&mut self, source: &str, path: &str) -> Status {
    self.signal = Signal::None;
    self.exit_code = 0;
    self.last_error = None;
    // a previous run that errored out leaves its frames behind
    self.frames.clear();
    self.stack.clear();
    self.open_upvalues.clear();

    let script = match emit::emit(source, path) {
      Ok(script) => script,
      Err(errors) => {
        let mut out = String::new();
        for error in &errors {
          eprintln!("{}", error.styled());
          let _ = writeln!(out, "{error}");
        }
        self.last_error = Some(out);
        return Status::CompileError;
      }
    };

    let module = self.instantiate(&script);
    self.push(Value::Obj(module));
    let init = self.heap.module(module).init.expect("module init closure");
    self.push_frame(init, 0, false);

    self.run()
  }

  pub fn register_builtin(&mut self, name: &str, function: BuiltinFn) {
    let name = self.intern(name);
    self.push(Value::Obj(name));
    let builtin = self.alloc(Object::Builtin(Builtin::new(function)));
    self.push(Value::Obj(builtin));
    let hash = self.str_hash(name);
    self.builtins.set(name, hash, Value::Obj(builtin));
    self.pop();
    self.pop();
  }

  /// Binds process arguments into the global argv list.
  pub fn set_args(&mut self, args: &[String]) {
    let list = self.alloc(Object::List(List::new(args.len())));
    self.args = Some(list);
    for (i, arg) in args.iter().enumerate() {
      let s = self.intern(arg);
      self.heap.list_mut(list).values[i] = Value::Obj(s);
    }
  }

  /// Raises a runtime error: records the message with a stack trace
  /// (innermost frame first) and signals `RUNTIME_ERROR`.
  pub fn runtime_error(&mut self, msg: impl AsRef<str>) {
    let mut out = String::new();
    let _ = writeln!(out, "[RUNTIME ERROR] {}", msg.as_ref());
    for frame in self.frames.iter().rev() {
      let function = self.heap.closure(frame.closure).function;
      match self.heap.function(function).name {
        Some(name) => {
          let _ = writeln!(out, "in {}()", self.heap.string(name));
        }
        None => {
          let _ = writeln!(out, "in script");
        }
      }
    }
    eprint!("{out}");
    self.last_error = Some(out);
    self.set_signal(Signal::RuntimeError, -1);
  }

  /// Sets the pending signal. An exit code of `-1` picks the default for the
  /// signal: 2 for stack faults, 1 for errors, 0 otherwise.
  pub fn set_signal(&mut self, signal: Signal, exit_code: i32) {
    self.signal = signal;
    self.exit_code = if exit_code == -1 {
      match signal {
        Signal::StackOverflow | Signal::StackUnderflow => 2,
        Signal::AssertFail | Signal::RuntimeError | Signal::TestAssertFail => 1,
        Signal::None | Signal::Halt => 0,
      }
    } else {
      exit_code
    };
  }

  pub fn exit_code(&self) -> i32 {
    self.exit_code
  }

  pub fn signal(&self) -> Signal {
    self.signal
  }

  /// The formatted message of the last runtime or compile error.
  pub fn last_error(&self) -> Option<&str> {
    self.last_error.as_deref()
  }

  pub fn read_source(&mut self, path: &str) -> Option<String> {
    self.loader.read_source(path)
  }

  /// Downcasts the output sink, e.g. to a captured `Vec<u8>`.
  pub fn output<T: 'static>(&self) -> Option<&T> {
    self.out.as_any().downcast_ref()
  }

  pub(crate) fn write_out(&mut self, s: &str) {
    let _ = self.out.write_all(s.as_bytes());
  }

  pub fn heap(&self) -> &Heap {
    &self.heap
  }

  // Allocation and interning.

  /// Allocates a heap object, running a collection first if the live-byte
  /// threshold was crossed. Callers anchor partially constructed object
  /// graphs on the value stack across allocations.
  pub(crate) fn alloc(&mut self, object: Object) -> Handle {
    if self.gc_stress || self.heap.needs_gc() {
      self.collect_garbage();
    }
    self.heap.insert(object)
  }

  pub(crate) fn intern(&mut self, s: &str) -> Handle {
    let hash = hash_str(s);
    if let Some(handle) = self.heap.find_string(s, hash) {
      return handle;
    }
    let handle = self.alloc(Object::String(Str::new(s.to_string(), true)));
    self.heap.register_interned(handle);
    handle
  }

  pub(crate) fn take_string(&mut self, s: String) -> Handle {
    let hash = hash_str(&s);
    if let Some(handle) = self.heap.find_string(&s, hash) {
      return handle;
    }
    let handle = self.alloc(Object::String(Str::new(s, true)));
    self.heap.register_interned(handle);
    handle
  }

  pub(crate) fn str_hash(&self, handle: Handle) -> u32 {
    self.heap.string(handle).hash()
  }

  // Stack.

  pub(crate) fn push(&mut self, value: Value) {
    self.stack.push(value);
  }

  pub(crate) fn pop(&mut self) -> Value {
    match self.stack.pop() {
      Some(value) => value,
      None => {
        self.set_signal(Signal::StackUnderflow, -1);
        Value::Nil
      }
    }
  }

  pub(crate) fn peek(&mut self, distance: usize) -> Value {
    let len = self.stack.len();
    if distance + 1 > len {
      self.set_signal(Signal::StackUnderflow, -1);
      return Value::Nil;
    }
    self.stack[len - 1 - distance]
  }

  pub(crate) fn frame(&self) -> &CallFrame {
    self.frames.last().unwrap()
  }

  pub(crate) fn frame_mut(&mut self) -> &mut CallFrame {
    self.frames.last_mut().unwrap()
  }

  pub(crate) fn vm_string(&self, s: VmStr) -> Handle {
    self.vm_strings[s as usize]
  }

  // Globals.

  pub(crate) fn globals_get(&self, module: Handle, name: Handle) -> Option<Value> {
    let hash = self.str_hash(name);
    self.heap.module(module).globals.get(name, hash)
  }

  pub(crate) fn globals_set(&mut self, module: Handle, name: Handle, value: Value) -> bool {
    let hash = self.str_hash(name);
    self.heap.module_mut(module).globals.set(name, hash, value)
  }

  pub(crate) fn globals_delete(&mut self, module: Handle, name: Handle) {
    let hash = self.str_hash(name);
    self.heap.module_mut(module).globals.delete(name, hash);
  }

  pub(crate) fn builtin_get(&self, name: Handle) -> Option<Value> {
    let hash = self.str_hash(name);
    self.builtins.get(name, hash)
  }

  // Module instantiation: linking compiled descriptors into the heap.

  /// Creates a module object for a compiled script, interning its constants
  /// and wiring every function to the module's globals table.
  pub(crate) fn instantiate(&mut self, script: &ModuleScript) -> Handle {
    let name = self.intern(&script.name);
    self.push(Value::Obj(name));
    let module = self.alloc(Object::Module(Module::new(name)));
    self.pop();

    self.push(Value::Obj(module));
    let function = self.instantiate_function(script.root.clone(), module);
    self.push(Value::Obj(function));
    let closure = self.alloc(Object::Closure(Closure {
      function,
      upvalues: Vec::new(),
    }));
    self.heap.module_mut(module).init = Some(closure);
    self.pop();
    self.pop();

    module
  }

  fn instantiate_function(&mut self, script: Rc<FunctionScript>, module: Handle) -> Handle {
    let path = self.intern(&script.path);
    self.push(Value::Obj(path));
    let name = script.name.as_deref().map(|n| self.intern(n));
    if let Some(name) = name {
      self.push(Value::Obj(name));
    }

    let constant_count = script.chunk.constants().len();
    let function = self.alloc(Object::Function(Function {
      script: script.clone(),
      constants: Vec::with_capacity(constant_count),
      name,
      path,
      module,
    }));

    if name.is_some() {
      self.pop();
    }
    self.pop();

    self.push(Value::Obj(function));
    for index in 0..constant_count {
      let value = match &script.chunk.constants()[index] {
        Constant::Number(v) => Value::Number(*v),
        Constant::Float(v) => Value::Float(*v),
        Constant::String(s) => Value::Obj(self.intern(s)),
        Constant::Function(sub) => {
          Value::Obj(self.instantiate_function(sub.clone(), module))
        }
      };
      self.heap.function_mut(function).constants.push(value);
    }
    self.pop();

    function
  }

  // Call protocol.

  pub(crate) fn push_frame(&mut self, closure: Handle, argc: usize, is_module: bool) -> bool {
    if self.frames.len() >= FRAMES_MAX {
      self.runtime_error("Stack overflow");
      self.set_signal(Signal::StackOverflow, -1);
      return false;
    }

    let function = self.heap.closure(closure).function;
    let module = self.heap.function(function).module;
    self.frames.push(CallFrame {
      closure,
      ip: 0,
      base: self.stack.len() - argc - 1,
      module,
      is_module,
    });
    true
  }

  fn spread_len(&self, value: Value) -> Option<usize> {
    let handle = value.as_obj()?;
    match self.heap.get(handle) {
      Object::List(l) if l.spread => Some(l.values.len()),
      Object::Vector(v) if v.spread => Some(v.values.len()),
      _ => None,
    }
  }

  /// Calls a closure with `argc` pushed arguments, expanding spread
  /// sequences in place and collecting varargs into a fresh list.
  pub(crate) fn call_closure(&mut self, closure: Handle, argc: usize) -> bool {
    let function = self.heap.closure(closure).function;
    let arity = self.heap.function(function).arity();
    let has_varargs = self.heap.function(function).has_varargs();

    let mut true_argc = 0;
    for i in 0..argc {
      let value = self.peek(i);
      true_argc += self.spread_len(value).unwrap_or(1);
    }

    if has_varargs {
      if true_argc + 1 < arity {
        self.runtime_error(format!(
          "Expected at least {arity} arguments but got {true_argc}"
        ));
        return false;
      }
    } else if true_argc != arity {
      self.runtime_error(format!("Expected {arity} arguments but got {true_argc}"));
      return false;
    }

    // pop the raw arguments, then re-push with spreads expanded; the spread
    // flag is one-shot and consumed here
    let mut raw = Vec::with_capacity(argc);
    for _ in 0..argc {
      raw.push(self.pop());
    }
    for value in raw.into_iter().rev() {
      let expanded = match value.as_obj() {
        Some(handle) => match self.heap.get_mut(handle) {
          Object::List(l) if l.spread => {
            l.spread = false;
            Some(l.values.to_vec())
          }
          Object::Vector(v) if v.spread => {
            v.spread = false;
            Some(v.values.clone())
          }
          _ => None,
        },
        None => None,
      };
      match expanded {
        Some(values) => {
          for value in values {
            self.push(value);
          }
        }
        None => self.push(value),
      }
    }

    if has_varargs {
      let vararg_count = true_argc - (arity - 1);
      let start = self.stack.len() - vararg_count;
      let values = self.stack[start..].to_vec();
      let list = self.alloc(Object::List(List::from_values(values)));
      self.stack.truncate(start);
      self.push(Value::Obj(list));
      self.push_frame(closure, arity, false)
    } else {
      self.push_frame(closure, true_argc, false)
    }
  }

  pub(crate) fn call_value(&mut self, callee: Value, argc: usize) -> bool {
    if let Some(handle) = callee.as_obj() {
      enum Callee {
        Bound(Value, Handle),
        Class,
        Closure,
        Builtin(BuiltinFn),
        Other,
      }

      let kind = match self.heap.get(handle) {
        Object::BoundMethod(b) => Callee::Bound(b.receiver, b.method),
        Object::Class(_) => Callee::Class,
        Object::Closure(_) => Callee::Closure,
        Object::Builtin(b) => Callee::Builtin(b.function),
        _ => Callee::Other,
      };

      match kind {
        Callee::Bound(receiver, method) => {
          let slot = self.stack.len() - argc - 1;
          self.stack[slot] = receiver;
          return self.call_closure(method, argc);
        }
        Callee::Class => {
          let instance = self.alloc(Object::Instance(Instance::new(handle)));
          let slot = self.stack.len() - argc - 1;
          self.stack[slot] = Value::Obj(instance);

          let init = self.vm_string(VmStr::Init);
          let hash = self.str_hash(init);
          return match self.heap.class(handle).methods.get(init, hash) {
            Some(Value::Obj(init)) => self.call_closure(init, argc),
            _ if argc != 0 => {
              self.runtime_error(format!("Expected 0 arguments but got {argc}"));
              false
            }
            _ => true,
          };
        }
        Callee::Closure => return self.call_closure(handle, argc),
        Callee::Builtin(function) => {
          let top = self.stack.len();
          let args = self.stack[top - argc..].to_vec();
          let result = function(self, &args);
          self.stack.truncate(top - argc - 1);
          self.push(result);
          return true;
        }
        Callee::Other => {}
      }
    }

    self.runtime_error("Can only call functions and classes");
    false
  }

  pub(crate) fn invoke(&mut self, name: Handle, argc: usize) -> bool {
    let receiver = self.peek(argc);

    enum Recv {
      Instance(Handle, Option<Value>),
      Module(Option<Value>),
      Other,
    }

    let recv = match receiver.as_obj() {
      Some(handle) => {
        let hash = self.str_hash(name);
        match self.heap.get(handle) {
          Object::Instance(i) => Recv::Instance(i.class, i.fields.get(name, hash)),
          Object::Module(m) => Recv::Module(m.globals.get(name, hash)),
          _ => Recv::Other,
        }
      }
      None => Recv::Other,
    };

    match recv {
      Recv::Instance(_, Some(value)) | Recv::Module(Some(value)) => {
        let slot = self.stack.len() - argc - 1;
        self.stack[slot] = value;
        self.call_value(value, argc)
      }
      Recv::Instance(class, None) => self.invoke_from_class(class, name, argc),
      Recv::Module(None) | Recv::Other => {
        self.runtime_error("Only instances and modules have methods");
        false
      }
    }
  }

  pub(crate) fn invoke_from_class(&mut self, class: Handle, name: Handle, argc: usize) -> bool {
    let hash = self.str_hash(name);
    match self.heap.class(class).methods.get(name, hash) {
      Some(Value::Obj(method)) => self.call_closure(method, argc),
      _ => {
        let name = self.heap.string(name).to_string();
        self.runtime_error(format!("Undefined property '{name}'"));
        false
      }
    }
  }

  /// Dispatches an operator overload method if the receiver is an instance
  /// that defines it. Returns false (leaving the stack untouched) otherwise,
  /// so the caller can fall back to the built-in rule or error out.
  pub(crate) fn invoke_overload(&mut self, which: VmStr, argc: usize) -> bool {
    let receiver = self.peek(argc);
    let Some(handle) = receiver.as_obj() else {
      return false;
    };

    let name = self.vm_string(which);
    let hash = self.str_hash(name);
    let defined = match self.heap.get(handle) {
      Object::Instance(i) => {
        i.fields.get(name, hash).is_some()
          || self
            .heap
            .class(i.class)
            .methods
            .get(name, hash)
            .is_some()
      }
      _ => false,
    };

    if !defined {
      return false;
    }
    self.invoke(name, argc)
  }

  pub(crate) fn bind_method(&mut self, class: Handle, name: Handle) -> bool {
    let hash = self.str_hash(name);
    let method = match self.heap.class(class).methods.get(name, hash) {
      Some(Value::Obj(method)) => method,
      _ => {
        let name = self.heap.string(name).to_string();
        self.runtime_error(format!("Undefined property '{name}'"));
        return false;
      }
    };

    let receiver = self.peek(0);
    let bound = self.alloc(Object::BoundMethod(BoundMethod { receiver, method }));
    self.pop();
    self.push(Value::Obj(bound));
    true
  }

  // Upvalues.

  /// Finds or creates an open upvalue for a stack slot. The open list is
  /// kept ordered by descending slot so existing captures are shared.
  pub(crate) fn capture_upvalue(&mut self, slot: usize) -> Handle {
    let mut i = 0;
    while i < self.open_upvalues.len() {
      let location = self
        .heap
        .upvalue(self.open_upvalues[i])
        .location
        .expect("open upvalue in open list");
      if location <= slot {
        if location == slot {
          return self.open_upvalues[i];
        }
        break;
      }
      i += 1;
    }

    let upvalue = self.alloc(Object::Upvalue(Upvalue::open(slot)));
    self.open_upvalues.insert(i, upvalue);
    upvalue
  }

  /// Closes every open upvalue at or above `last`, moving the stack value
  /// into the upvalue itself.
  pub(crate) fn close_upvalues(&mut self, last: usize) {
    while let Some(&handle) = self.open_upvalues.first() {
      let location = self
        .heap
        .upvalue(handle)
        .location
        .expect("open upvalue in open list");
      if location < last {
        break;
      }
      let value = self.stack[location];
      let upvalue = self.heap.upvalue_mut(handle);
      upvalue.location = None;
      upvalue.closed = value;
      self.open_upvalues.remove(0);
    }
  }

  pub(crate) fn define_method(&mut self, name: Handle) {
    let method = self.peek(0);
    let class = self.peek(1).as_obj().expect("class on stack");
    let hash = self.str_hash(name);
    self.heap.class_mut(class).methods.set(name, hash, method);
    self.pop();
  }

  pub(crate) fn concatenate(&mut self, a: Handle, b: Handle) {
    let mut s =
      String::with_capacity(self.heap.string(a).len() + self.heap.string(b).len());
    s.push_str(self.heap.string(a).as_str());
    s.push_str(self.heap.string(b).as_str());
    let result = self.take_string(s);
    self.pop();
    self.pop();
    self.push(Value::Obj(result));
  }

  // Indexing.

  pub(crate) fn index_value(&mut self, object: Value, index: i64) -> Value {
    enum Indexed {
      Byte(u8),
      Val(Value),
      Error(String),
    }

    let indexed = match object.as_obj() {
      Some(handle) => match self.heap.get(handle) {
        Object::String(s) => {
          let bytes = s.as_str().as_bytes();
          if index < 0 || index as usize >= bytes.len() {
            Indexed::Error(format!("String index '{index}' out of bounds"))
          } else {
            Indexed::Byte(bytes[index as usize])
          }
        }
        Object::Vector(v) => {
          if index < 0 || index as usize >= v.values.len() {
            Indexed::Error(format!("Vector index '{index}' out of bounds"))
          } else {
            Indexed::Val(v.values[index as usize])
          }
        }
        Object::List(l) => {
          if index < 0 || index as usize >= l.values.len() {
            Indexed::Error(format!("List index '{index}' out of bounds"))
          } else {
            Indexed::Val(l.values[index as usize])
          }
        }
        _ => Indexed::Error("Invalid index operation".to_string()),
      },
      None => Indexed::Error("Invalid index operation".to_string()),
    };

    match indexed {
      Indexed::Byte(byte) => {
        let s = (byte as char).to_string();
        let handle = self.intern(&s);
        Value::Obj(handle)
      }
      Indexed::Val(value) => value,
      Indexed::Error(msg) => {
        self.runtime_error(msg);
        Value::Nil
      }
    }
  }

  pub(crate) fn set_index_value(&mut self, object: Value, index: i64, value: Value) {
    let vector = match object.as_obj() {
      Some(handle) => match self.heap.get(handle) {
        Object::Vector(_) => Some(handle),
        _ => None,
      },
      None => None,
    };

    let Some(vector) = vector else {
      self.runtime_error("Invalid index operation");
      return;
    };

    let len = self.heap.vector(vector).values.len();
    if index < 0 || index as usize >= len {
      self.runtime_error(format!("Vector index '{index}' out of bounds"));
      return;
    }
    self.heap.vector_mut(vector).values[index as usize] = value;
  }
}

//! The heap and its tri-color mark-and-sweep collector.
//!
//! Objects live in a slot arena and are addressed by [`Handle`]. Collection
//! is synchronous with allocation: [`crate::vm::Vm::alloc`] runs a full cycle
//! whenever live bytes cross the threshold, then doubles the threshold.
//! Mid-construction objects are kept alive by pushing them on the VM value
//! stack before any further allocation (the allocator convention).

use std::mem::size_of;

use crate::object::{Object, Str, Table};
use crate::value::Value;
use crate::vm::Vm;

const FIRST_GC: usize = 1024 * 1024;
const HEAP_GROW_FACTOR: usize = 2;

/// An index into the heap's slot arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle(u32);

impl Handle {
  pub(crate) fn from_index(index: u32) -> Self {
    Self(index)
  }

  pub(crate) fn index(self) -> usize {
    self.0 as usize
  }
}

struct Slot {
  object: Object,
  marked: bool,
  size: usize,
}

pub struct Heap {
  slots: Vec<Option<Slot>>,
  free: Vec<u32>,
  gray: Vec<Handle>,
  /// The string intern table: `(bytes, hash) -> unique Str`. Not a GC root;
  /// unmarked entries are pruned before sweep.
  pub(crate) strings: Table,
  bytes_allocated: usize,
  next_gc: usize,
}

impl Default for Heap {
  fn default() -> Self {
    Self::new()
  }
}

impl Heap {
  pub fn new() -> Self {
    Self {
      slots: Vec::new(),
      free: Vec::new(),
      gray: Vec::new(),
      strings: Table::new(),
      bytes_allocated: 0,
      next_gc: FIRST_GC,
    }
  }

  pub fn bytes_allocated(&self) -> usize {
    self.bytes_allocated
  }

  pub fn live_objects(&self) -> usize {
    self.slots.iter().filter(|slot| slot.is_some()).count()
  }

  pub(crate) fn needs_gc(&self) -> bool {
    self.bytes_allocated > self.next_gc
  }

  pub(crate) fn insert(&mut self, object: Object) -> Handle {
    let size = size_of_object(&object);
    self.bytes_allocated += size;
    let slot = Slot {
      object,
      marked: false,
      size,
    };
    match self.free.pop() {
      Some(index) => {
        self.slots[index as usize] = Some(slot);
        Handle(index)
      }
      None => {
        self.slots.push(Some(slot));
        Handle((self.slots.len() - 1) as u32)
      }
    }
  }

  #[inline]
  pub fn get(&self, handle: Handle) -> &Object {
    match &self.slots[handle.index()] {
      Some(slot) => &slot.object,
      None => panic!("use of freed object {handle:?}"),
    }
  }

  #[inline]
  pub fn get_mut(&mut self, handle: Handle) -> &mut Object {
    match &mut self.slots[handle.index()] {
      Some(slot) => &mut slot.object,
      None => panic!("use of freed object {handle:?}"),
    }
  }

  pub fn kind_name(&self, value: Value) -> &'static str {
    match value {
      Value::Bool(_) => "bool",
      Value::Nil => "nil",
      Value::Number(_) => "number",
      Value::Float(_) => "float",
      Value::Obj(h) => self.get(h).kind_name(),
    }
  }

  /// Looks up an interned string by content.
  pub fn find_string(&self, s: &str, hash: u32) -> Option<Handle> {
    let slots = &self.slots;
    self.strings.find_key(hash, |h| {
      match &slots[h.index()] {
        Some(slot) => match &slot.object {
          Object::String(existing) => existing.as_str() == s,
          _ => false,
        },
        None => false,
      }
    })
  }

  pub(crate) fn register_interned(&mut self, handle: Handle) {
    let hash = self.string(handle).hash();
    self.strings.set(handle, hash, Value::Nil);
  }

  // Marking.

  pub(crate) fn mark_value(&mut self, value: Value) {
    if let Value::Obj(handle) = value {
      self.mark_object(handle);
    }
  }

  pub(crate) fn mark_object(&mut self, handle: Handle) {
    if let Some(slot) = &mut self.slots[handle.index()] {
      if slot.marked {
        return;
      }
      slot.marked = true;
      self.gray.push(handle);
    }
  }

  /// Drains the gray worklist, blackening each object by marking everything
  /// it references.
  pub(crate) fn trace(&mut self) {
    let mut children = Vec::new();
    while let Some(handle) = self.gray.pop() {
      children.clear();
      self.collect_children(handle, &mut children);
      for &child in &children {
        self.mark_value(child);
      }
    }
  }

  fn collect_children(&self, handle: Handle, out: &mut Vec<Value>) {
    let obj = |h: Handle| Value::Obj(h);
    match self.get(handle) {
      Object::String(_) | Object::File(_) | Object::Builtin(_) => {}
      Object::Vector(v) => out.extend_from_slice(&v.values),
      Object::List(l) => out.extend_from_slice(&l.values),
      Object::Range(r) => {
        out.push(r.from);
        out.push(r.to);
      }
      Object::Function(f) => {
        out.extend_from_slice(&f.constants);
        if let Some(name) = f.name {
          out.push(obj(name));
        }
        out.push(obj(f.path));
        out.push(obj(f.module));
      }
      Object::Closure(c) => {
        out.push(obj(c.function));
        out.extend(c.upvalues.iter().map(|&u| obj(u)));
      }
      Object::Upvalue(u) => out.push(u.closed),
      Object::Class(c) => {
        out.push(obj(c.name));
        for (key, value) in c.methods.iter() {
          out.push(obj(key));
          out.push(value);
        }
      }
      Object::Instance(i) => {
        out.push(obj(i.class));
        for (key, value) in i.fields.iter() {
          out.push(obj(key));
          out.push(value);
        }
      }
      Object::BoundMethod(b) => {
        out.push(b.receiver);
        out.push(obj(b.method));
      }
      Object::Module(m) => {
        out.push(obj(m.name));
        if let Some(init) = m.init {
          out.push(obj(init));
        }
        for (key, value) in m.globals.iter() {
          out.push(obj(key));
          out.push(value);
        }
      }
    }
  }

  /// Removes unmarked interned strings from the intern table. Must run
  /// before [`Heap::sweep`] so a lookup cannot resurrect a freed string.
  pub(crate) fn prune_interned(&mut self) {
    let Heap { slots, strings, .. } = self;
    strings.remove_white(|h| slots[h.index()].as_ref().map_or(false, |s| s.marked));
  }

  /// Frees every unmarked object and clears the marks of survivors.
  pub(crate) fn sweep(&mut self) {
    let Heap {
      slots,
      free,
      bytes_allocated,
      ..
    } = self;
    for (index, slot) in slots.iter_mut().enumerate() {
      match slot {
        Some(s) if s.marked => s.marked = false,
        Some(s) => {
          *bytes_allocated -= s.size;
          *slot = None;
          free.push(index as u32);
        }
        None => {}
      }
    }
    self.next_gc = self.bytes_allocated * HEAP_GROW_FACTOR;
  }
}

// Typed accessors. These panic on a kind mismatch, which indicates a VM bug:
// dispatch always checks kinds before reaching for one of these.
macro_rules! accessors {
  ($(($variant:ident, $ty:ty, $get:ident, $get_mut:ident)),* $(,)?) => {
    impl Heap {
      $(
        #[inline]
        #[allow(dead_code)]
        pub fn $get(&self, handle: Handle) -> &$ty {
          match self.get(handle) {
            Object::$variant(v) => v,
            other => panic!(concat!("expected ", stringify!($variant), ", got {}"), other.kind_name()),
          }
        }

        #[inline]
        #[allow(dead_code)]
        pub fn $get_mut(&mut self, handle: Handle) -> &mut $ty {
          match self.get_mut(handle) {
            Object::$variant(v) => v,
            other => panic!(concat!("expected ", stringify!($variant), ", got {}"), other.kind_name()),
          }
        }
      )*
    }
  };
}

accessors! {
  (String, Str, string, string_mut),
  (Vector, crate::object::Vector, vector, vector_mut),
  (List, crate::object::List, list, list_mut),
  (Range, crate::object::Range, range, range_mut),
  (File, crate::object::File, file, file_mut),
  (Function, crate::object::Function, function, function_mut),
  (Closure, crate::object::Closure, closure, closure_mut),
  (Upvalue, crate::object::Upvalue, upvalue, upvalue_mut),
  (Class, crate::object::Class, class, class_mut),
  (Instance, crate::object::Instance, instance, instance_mut),
  (BoundMethod, crate::object::BoundMethod, bound_method, bound_method_mut),
  (Builtin, crate::object::Builtin, builtin, builtin_mut),
  (Module, crate::object::Module, module, module_mut),
}

fn size_of_object(object: &Object) -> usize {
  let base = size_of::<Slot>();
  base
    + match object {
      Object::String(s) => s.len(),
      Object::Vector(v) => v.values.capacity() * size_of::<Value>(),
      Object::List(l) => l.values.len() * size_of::<Value>(),
      Object::Function(f) => {
        f.constants.len() * size_of::<Value>() + f.script.chunk.code().len()
      }
      Object::Closure(c) => c.upvalues.len() * size_of::<Handle>(),
      Object::Class(c) => c.methods.byte_size(),
      Object::Instance(i) => i.fields.byte_size(),
      Object::Module(m) => m.globals.byte_size(),
      _ => 0,
    }
}

impl Vm {
  /// A full stop-the-world collection cycle: mark roots, trace, prune the
  /// intern table, sweep.
  pub fn collect_garbage(&mut self) {
    self.mark_roots();
    self.heap.trace();
    self.heap.prune_interned();
    self.heap.sweep();
  }

  fn mark_roots(&mut self) {
    let Vm {
      heap,
      stack,
      frames,
      open_upvalues,
      vm_strings,
      args,
      module_lookup,
      builtins,
      ..
    } = self;

    for &value in stack.iter() {
      heap.mark_value(value);
    }

    for frame in frames.iter() {
      heap.mark_object(frame.closure);
      heap.mark_object(frame.module);
    }

    for &upvalue in open_upvalues.iter() {
      heap.mark_object(upvalue);
    }

    for &string in vm_strings.iter() {
      heap.mark_object(string);
    }

    if let Some(args) = args {
      heap.mark_object(*args);
    }

    for (key, value) in module_lookup.iter() {
      heap.mark_object(key);
      heap.mark_value(value);
    }

    for (key, value) in builtins.iter() {
      heap.mark_object(key);
      heap.mark_value(value);
    }
  }
}

//! Collector behavior: liveness through roots, intern pruning, stress mode.

use crate::object::string::hash_str;
use crate::{Status, Value, Vm};

#[test]
fn collection_frees_unreachable_objects() {
  let mut vm = Vm::new();
  let live = vm.heap().live_objects();

  for i in 0..100 {
    vm.intern(&format!("garbage-{i}"));
  }
  assert!(vm.heap().live_objects() >= live + 100);

  vm.collect_garbage();
  assert_eq!(vm.heap().live_objects(), live);
}

#[test]
fn stack_slots_are_roots() {
  let mut vm = Vm::new();
  let s = vm.intern("anchored-string");
  vm.push(Value::Obj(s));

  vm.collect_garbage();
  let hash = hash_str("anchored-string");
  assert_eq!(vm.heap().find_string("anchored-string", hash), Some(s));

  vm.pop();
  vm.collect_garbage();
  assert_eq!(vm.heap().find_string("anchored-string", hash), None);
}

#[test]
fn pruned_interned_strings_cannot_be_resurrected() {
  let mut vm = Vm::new();
  vm.intern("doomed");
  vm.collect_garbage();

  // a fresh intern of the same content allocates a new object
  let again = vm.intern("doomed");
  let hash = hash_str("doomed");
  assert_eq!(vm.heap().find_string("doomed", hash), Some(again));
}

#[test]
fn dispatch_names_survive_collection() {
  let mut vm = Vm::new();
  vm.collect_garbage();
  let hash = hash_str("__add__");
  assert!(vm.heap().find_string("__add__", hash).is_some());
}

#[test]
fn collection_during_execution_keeps_the_working_set() {
  // gc stress forces a full cycle at every allocation, so any missing root
  // shows up as a use-after-free panic or wrong output
  let mut vm = Vm::builder()
    .with_output(Vec::<u8>::new())
    .with_gc_stress()
    .build();
  let status = vm.interpret(
    r#"
      class Node {
        func init(v) {
          self.v = v;
        }
        operator + (o) {
          return Node(self.v + o.v);
        }
      }

      let acc = Node(0);
      for (let i = 1; i <= 5; i = i + 1) {
        acc = acc + Node(i);
      }

      let text = "";
      for (let i = 0; i < 4; i = i + 1) {
        text = text + string(acc.v);
      }
      println(text);

      let fns = {};
      for (let i = 0; i < 3; i = i + 1) {
        append(fns, func() { return i * 100; });
      }
      println(fns[0](), fns[1](), fns[2]());
    "#,
    "stress.xyl",
  );
  assert_eq!(status, Status::Ok, "{:?}", vm.last_error());
  assert_eq!(super::stdout(&vm), "15151515\n0 100 200\n");
}

#[test]
fn allocation_accounting_shrinks_after_sweep() {
  let mut vm = Vm::new();
  let before = vm.heap().bytes_allocated();
  for i in 0..50 {
    vm.intern(&format!("bytes-{i}"));
  }
  let during = vm.heap().bytes_allocated();
  assert!(during > before);
  vm.collect_garbage();
  assert_eq!(vm.heap().bytes_allocated(), before);
}

use crate::{MemoryLoader, Status, Vm};

fn vm_with(loader: MemoryLoader) -> Vm {
  Vm::builder()
    .with_output(Vec::<u8>::new())
    .with_loader(loader)
    .build()
}

fn run(vm: &mut Vm, source: &str) -> Status {
  vm.interpret(source, "main.xyl")
}

#[test]
fn import_exposes_module_globals() {
  let loader = MemoryLoader::new().with("m.xyl", "func square(n) { return n * n; }");
  let mut vm = vm_with(loader);
  let status = run(
    &mut vm,
    r#"
      let m = import("m.xyl");
      println(m.square(5));
    "#,
  );
  assert_eq!(status, Status::Ok);
  assert_eq!(super::stdout(&vm), "25\n");
}

#[test]
fn repeated_imports_return_the_cached_module() {
  let loader = MemoryLoader::new().with("m.xyl", "let marker = 1;");
  let mut vm = vm_with(loader);
  let status = run(
    &mut vm,
    r#"
      let a = import("m.xyl");
      println(a == import("m.xyl"));
    "#,
  );
  assert_eq!(status, Status::Ok);
  assert_eq!(super::stdout(&vm), "true\n");
}

#[test]
fn module_init_runs_once() {
  let loader = MemoryLoader::new().with("log.xyl", r#"println("loading");"#);
  let mut vm = vm_with(loader);
  let status = run(
    &mut vm,
    r#"
      import("log.xyl");
      import("log.xyl");
      println("done");
    "#,
  );
  assert_eq!(status, Status::Ok);
  assert_eq!(super::stdout(&vm), "loading\ndone\n");
}

#[test]
fn functions_resolve_globals_in_their_defining_module() {
  let loader = MemoryLoader::new().with(
    "counter.xyl",
    r#"
      let n = 100;
      func get() { return n; }
    "#,
  );
  let mut vm = vm_with(loader);
  let status = run(
    &mut vm,
    r#"
      let n = 5;
      let c = import("counter.xyl");
      println(c.get(), n);
    "#,
  );
  assert_eq!(status, Status::Ok);
  assert_eq!(super::stdout(&vm), "100 5\n");
}

#[test]
fn module_members_are_read_via_properties() {
  let loader = MemoryLoader::new().with("vals.xyl", "let answer = 42;");
  let mut vm = vm_with(loader);
  let status = run(
    &mut vm,
    r#"
      let v = import("vals.xyl");
      println(v.answer);
      println(string(v));
    "#,
  );
  assert_eq!(status, Status::Ok);
  assert_eq!(super::stdout(&vm), "42\n<module vals.xyl>\n");
}

#[test]
fn bare_names_resolve_through_xyl_home() {
  std::env::set_var("XYL_HOME", "/xyl-home");
  let loader = MemoryLoader::new().with(
    "/xyl-home/lib/math.xyl",
    "func double(n) { return n * 2; }",
  );
  let mut vm = vm_with(loader);
  let status = run(
    &mut vm,
    r#"
      let m = import("math");
      println(m.double(4));
    "#,
  );
  assert_eq!(status, Status::Ok);
  assert_eq!(super::stdout(&vm), "8\n");
}

#[test]
fn missing_module_is_a_runtime_error() {
  let mut vm = vm_with(MemoryLoader::new());
  let status = run(&mut vm, r#"import("nope.xyl");"#);
  assert_eq!(status, Status::RuntimeError);
  assert!(vm
    .last_error()
    .unwrap()
    .contains("Could not open file 'nope.xyl'"));
}

#[test]
fn module_compile_errors_surface_as_runtime_errors() {
  let loader = MemoryLoader::new().with("bad.xyl", "let = ;");
  let mut vm = vm_with(loader);
  let status = run(&mut vm, r#"import("bad.xyl");"#);
  assert_eq!(status, Status::RuntimeError);
  assert!(vm
    .last_error()
    .unwrap()
    .contains("Failed to compile module 'bad.xyl'"));
}

#[test]
fn missing_module_member_is_a_runtime_error() {
  let loader = MemoryLoader::new().with("m.xyl", "let x = 1;");
  let mut vm = vm_with(loader);
  let status = run(&mut vm, r#"import("m.xyl").nope;"#);
  assert_eq!(status, Status::RuntimeError);
  assert!(vm
    .last_error()
    .unwrap()
    .contains("Object does not have property 'nope'"));
}

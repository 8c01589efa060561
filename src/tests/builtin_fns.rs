use crate::{Status, Value, Vm};

check! {
  vector_builtins,
  r#"
    let v = {1, 2};
    append(v, 3);
    println(len(v), pop(v));
    insert(v, 0, 0);
    println(v[0], v[1], v[2]);
    println(remove(v, 1));
    println(len(v));
  "#,
  "3 3\n0 1 2\n1\n2\n"
}

check! {
  slice_builtin,
  r#"
    println(string(slice({1, 2, 3, 4}, 1, 3)));
    println(string(slice([1, 2, 3], 0, 2)));
  "#,
  "{2, 3}\n[1, 2]\n"
}

check! {
  cast_builtins,
  r#"
    println(number("42"), number(3.9), number(true));
    println(float(2), float("1.5"));
    println(bool(0), bool(2), bool("true"), bool("false"), bool(nil));
  "#,
  "42 3 1\n2 1.5\nfalse true true false false\n"
}

check! {
  typeof_builtin,
  r#"
    println(typeof(1), typeof(1.5), typeof("s"), typeof(nil), typeof(true));
    println(typeof({}), typeof([]), typeof(1:2));
    class A {}
    func f() {}
    println(typeof(A), typeof(A()), typeof(f), typeof(print));
  "#,
  "number float string nil bool\nvector list range\nclass instance function builtin\n"
}

check! {
  printf_builtin,
  r#"
    printf("%: %\n", "x", 7);
    printf("100%%\n");
  "#,
  "x: 7\n100%\n"
}

check! {
  print_without_newline,
  r#"
    print("a", 1);
    print("b");
  "#,
  "a 1b"
}

check! {
  test_asserts_are_sticky_until_read,
  r#"
    assert_eq(1, 2);
    println("still running");
    println(case_failed());
    assert_eq(1, 1);
    println(case_failed());
    assert_neq(1, 2);
    assert_true(true);
    assert_false(false);
    println(case_failed());
  "#,
  "still running\ntrue\nfalse\nfalse\n"
}

check_error! {
  builtin_arity_is_checked,
  r#"
    len();
  "#,
  "Expected 1 argument in 'len' but got 0"
}

check_error! {
  builtin_types_are_checked,
  r#"
    append(1, 2);
  "#,
  "Expected argument 1 in 'append' to be 'vector' but got 'number'"
}

check_error! {
  cast_error_for_bad_number,
  r#"
    number("abc");
  "#,
  "Could not cast 'abc' to 'number'"
}

check_error! {
  cast_error_for_nil,
  r#"
    number(nil);
  "#,
  "Can not cast 'nil' to 'number'"
}

check_error! {
  pop_on_empty_vector,
  r#"
    pop({});
  "#,
  "pop called on empty vector"
}

check_error! {
  insert_out_of_range,
  r#"
    insert({1}, 5, 2);
  "#,
  "Index 5 out of range"
}

#[test]
fn exit_halts_cleanly_with_the_given_code() {
  let (status, vm) = super::run(
    r#"
      exit(3);
      println("unreachable");
    "#,
  );
  assert_eq!(status, Status::Ok);
  assert_eq!(vm.exit_code(), 3);
  assert_eq!(super::stdout(&vm), "");
}

#[test]
fn argv_reflects_set_args() {
  let mut vm = Vm::builder().with_output(Vec::<u8>::new()).build();
  vm.set_args(&["one".to_string(), "two".to_string()]);
  let status = vm.interpret(
    r#"
      println(len(argv()), argv()[0], argv()[1]);
    "#,
    "test.xyl",
  );
  assert_eq!(status, Status::Ok);
  assert_eq!(super::stdout(&vm), "2 one two\n");
}

#[test]
fn host_builtins_can_be_registered() {
  fn triple(_vm: &mut Vm, args: &[Value]) -> Value {
    match args[0] {
      Value::Number(n) => Value::Number(n * 3),
      _ => Value::Nil,
    }
  }

  let mut vm = Vm::builder().with_output(Vec::<u8>::new()).build();
  vm.register_builtin("triple", triple);
  let status = vm.interpret("println(triple(14));", "test.xyl");
  assert_eq!(status, Status::Ok);
  assert_eq!(super::stdout(&vm), "42\n");
}

#[test]
fn host_builtins_can_raise_runtime_errors() {
  fn boom(vm: &mut Vm, _args: &[Value]) -> Value {
    vm.runtime_error("boom");
    Value::Nil
  }

  let mut vm = Vm::builder().with_output(Vec::<u8>::new()).build();
  vm.register_builtin("boom", boom);
  let status = vm.interpret("boom();", "test.xyl");
  assert_eq!(status, Status::RuntimeError);
  assert!(vm.last_error().unwrap().contains("boom"));
}

check! {
  call_and_return,
  r#"
    func add(a, b) {
      return a + b;
    }
    println(add(1, 2));
  "#,
  "3\n"
}

check! {
  implicit_return_is_nil,
  r#"
    func noop() {}
    println(noop());
  "#,
  "nil\n"
}

check! {
  recursion,
  r#"
    func fib(n) {
      if (n < 2) {
        return n;
      }
      return fib(n - 1) + fib(n - 2);
    }
    println(fib(10));
  "#,
  "55\n"
}

check! {
  anonymous_function_expression,
  r#"
    let double = func(x) { return x * 2; };
    println(double(21));
  "#,
  "42\n"
}

check! {
  functions_are_values,
  r#"
    func inc(n) { return n + 1; }
    let f = inc;
    println(f(41));
    println(string(inc));
  "#,
  "42\n<fn inc>\n"
}

check! {
  varargs_collects_trailing_arguments,
  r#"
    func sum(xs[]) {
      let s = 0;
      for (let i = 0; i < len(xs); i = i + 1) {
        s = s + xs[i];
      }
      return s;
    }
    println(sum(1, 2, 3));
    println(sum());
  "#,
  "6\n0\n"
}

check! {
  varargs_after_fixed_parameters,
  r#"
    func tag(name, rest[]) {
      return name + ":" + string(len(rest));
    }
    println(tag("x", 1, 2, 3));
    println(tag("x"));
  "#,
  "x:3\nx:0\n"
}

check! {
  spread_expands_list_arguments,
  r#"
    func sum(xs[]) {
      let s = 0;
      for (let i = 0; i < len(xs); i = i + 1) {
        s = s + xs[i];
      }
      return s;
    }
    let a = [4, 5, 6];
    println(sum(..a));
    println(sum(1, ..[2, 3], 4));
  "#,
  "15\n10\n"
}

check! {
  spread_into_fixed_arity,
  r#"
    func add(a, b) { return a + b; }
    println(add(..[3, 4]));
  "#,
  "7\n"
}

check! {
  spread_flag_is_one_shot,
  r#"
    func count(xs[]) { return len(xs); }
    let a = [1, 2];
    println(count(..a));
    println(count(a));
  "#,
  "2\n1\n"
}

check! {
  spread_commutes_with_append,
  r#"
    let v = {};
    append(v, ..[1, 2]);
    append(v, 3);
    println(len(v), v[0], v[1], v[2]);
  "#,
  "3 1 2 3\n"
}

check_error! {
  arity_mismatch,
  r#"
    func f(a) { return a; }
    f();
  "#,
  "Expected 1 arguments but got 0"
}

check_error! {
  varargs_requires_fixed_prefix,
  r#"
    func f(a, rest[]) { return a; }
    f();
  "#,
  "Expected at least 2 arguments but got 0"
}

check_error! {
  calling_a_number,
  r#"
    let x = 1;
    x();
  "#,
  "Can only call functions and classes"
}

check_error! {
  runtime_error_reports_call_stack,
  r#"
    func inner() { return missing; }
    func outer() { return inner(); }
    outer();
  "#,
  "in inner()"
}

#[test]
fn deep_recursion_overflows_the_frame_stack() {
  let (status, vm) = super::run("func f() { return f(); } f();");
  assert_eq!(status, crate::Status::RuntimeError);
  assert!(vm.last_error().unwrap().contains("Stack overflow"));
  assert_eq!(vm.exit_code(), 2);
}

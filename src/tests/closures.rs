check! {
  counter_closure_mutates_upvalue,
  r#"
    func make() {
      let n = 0;
      return func() {
        n = n + 1;
        return n;
      };
    }
    let c = make();
    println(c());
    println(c());
    println(c());
  "#,
  "1\n2\n3\n"
}

check! {
  two_closures_share_one_upvalue,
  r#"
    func make() {
      let n = 0;
      let inc = func() { n = n + 1; return n; };
      let get = func() { return n; };
      return [inc, get];
    }
    let pair = make();
    pair[0]();
    pair[0]();
    println(pair[1]());
  "#,
  "2\n"
}

check! {
  capture_survives_scope_end,
  r#"
    let f = nil;
    {
      let x = 10;
      f = func() { return x; };
    }
    println(f());
  "#,
  "10\n"
}

check! {
  closure_sees_value_at_close_time,
  r#"
    let f = nil;
    {
      let x = 1;
      f = func() { return x; };
      x = 2;
    }
    println(f());
  "#,
  "2\n"
}

check! {
  loop_closures_capture_their_own_iteration,
  r#"
    let v = {};
    for (let i = 0; i < 3; i = i + 1) {
      append(v, func() { return i; });
    }
    println(v[0](), v[1](), v[2]());
  "#,
  "0 1 2\n"
}

check! {
  capture_through_intermediate_function,
  r#"
    func outer() {
      let x = 5;
      func middle() {
        func inner() {
          return x;
        }
        return inner;
      }
      return middle();
    }
    println(outer()());
  "#,
  "5\n"
}

check! {
  sibling_closures_in_one_scope,
  r#"
    func make() {
      let a = 1;
      let b = 2;
      return func() { return a + b; };
    }
    println(make()());
  "#,
  "3\n"
}

check! {
  writing_through_an_upvalue_after_close,
  r#"
    func make() {
      let n = 100;
      let set = func(v) { n = v; };
      let get = func() { return n; };
      return [set, get];
    }
    let pair = make();
    pair[0](7);
    println(pair[1]());
  "#,
  "7\n"
}

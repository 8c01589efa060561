check! {
  concatenation,
  r#"
    println("foo" + "bar");
    println("a" + "b" + "c");
  "#,
  "foobar\nabc\n"
}

check! {
  escape_sequences,
  r#"
    println("a\tb");
    println("q\"q");
    println("back\\slash");
    println("a\x41");
    println("oct\0101");
  "#,
  "a\tb\nq\"q\nback\\slash\naA\noctA\n"
}

check! {
  string_length_is_in_bytes,
  r#"
    println(len("hello"), len(""));
  "#,
  "5 0\n"
}

check! {
  slice_builtin_on_strings,
  r#"
    println(slice("hello", 1, 3));
    println(slice("hello", 0, 0));
  "#,
  "el\n\n"
}

check! {
  stringify_nests_literally,
  r#"
    println(string([1, "a"]));
    println(string({"x", 2.5}));
  "#,
  "[1, \"a\"]\n{\"x\", 2.5}\n"
}

check! {
  number_string_round_trip,
  r#"
    println(number(string(1234567)) == 1234567);
    println(number(string(0 - 42)) == 0 - 42);
  "#,
  "true\ntrue\n"
}

check! {
  interned_strings_compare_equal,
  r#"
    let a = "hel" + "lo";
    println(a == "hello");
  "#,
  "true\n"
}

check_error! {
  string_index_out_of_bounds,
  r#"
    "abc"[5];
  "#,
  "String index '5' out of bounds"
}

#[test]
fn interning_is_idempotent() {
  let mut vm = crate::Vm::new();
  let a = vm.intern("some-string");
  let b = vm.intern("some-string");
  assert_eq!(a, b);

  let c = vm.take_string(String::from("some-string"));
  assert_eq!(a, c);
}

#[test]
fn find_string_returns_the_interned_instance() {
  let mut vm = crate::Vm::new();
  let a = vm.intern("lookup-me");
  let hash = crate::object::string::hash_str("lookup-me");
  assert_eq!(vm.heap().find_string("lookup-me", hash), Some(a));
  assert_eq!(vm.heap().find_string("lookup-you", hash), None);
}

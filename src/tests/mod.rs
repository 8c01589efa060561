//! Language tests: each runs a source string against a fresh VM with a
//! captured output sink.

macro_rules! check {
  ($name:ident, $src:literal, $expected:literal) => {
    #[test]
    fn $name() {
      let src = indoc::indoc!($src);
      let mut vm = crate::Vm::builder().with_output(Vec::<u8>::new()).build();
      let status = vm.interpret(src, "test.xyl");
      if status != crate::Status::Ok {
        panic!(
          "interpret failed with {status:?}:\n{}",
          vm.last_error().unwrap_or("<no error recorded>")
        );
      }
      let out = vm.output::<Vec<u8>>().unwrap();
      assert_eq!(std::str::from_utf8(out).unwrap(), $expected);
    }
  };
}

macro_rules! check_error {
  ($name:ident, $src:literal, $needle:literal) => {
    #[test]
    fn $name() {
      let src = indoc::indoc!($src);
      let mut vm = crate::Vm::builder().with_output(Vec::<u8>::new()).build();
      let status = vm.interpret(src, "test.xyl");
      assert_eq!(status, crate::Status::RuntimeError, "expected a runtime error");
      let error = vm.last_error().expect("error recorded");
      assert!(
        error.contains($needle),
        "error does not mention {:?}:\n{error}",
        $needle
      );
    }
  };
}

fn run(source: &str) -> (crate::Status, crate::Vm) {
  let mut vm = crate::Vm::builder().with_output(Vec::<u8>::new()).build();
  let status = vm.interpret(source, "test.xyl");
  (status, vm)
}

fn stdout(vm: &crate::Vm) -> String {
  String::from_utf8(vm.output::<Vec<u8>>().unwrap().clone()).unwrap()
}

mod builtin_fns;
mod closures;
mod control;
mod functions;
mod heap;
mod modules;
mod operators;
mod strings;

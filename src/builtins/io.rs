//! Console and file builtins.

use std::io::BufRead;

use super::{check_arity, expect_file, expect_string, Arity};
use crate::object::{File, Object, Str};
use crate::value::Value;
use crate::vm::Vm;

pub(crate) fn print(vm: &mut Vm, args: &[Value]) -> Value {
  let mut out = String::new();
  for (i, &arg) in args.iter().enumerate() {
    if i != 0 {
      out.push(' ');
    }
    out.push_str(&vm.heap.stringify(arg, false));
  }
  vm.write_out(&out);
  Value::Nil
}

pub(crate) fn println(vm: &mut Vm, args: &[Value]) -> Value {
  print(vm, args);
  vm.write_out("\n");
  Value::Nil
}

/// `printf(fmt, ...)`: each bare `%` consumes the next argument; `%%` prints
/// a literal percent sign.
pub(crate) fn printf(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "printf", Arity::AtLeast(1), args.len()) {
    return Value::Nil;
  }
  let Some(fmt) = expect_string(vm, "printf", args, 0) else {
    return Value::Nil;
  };

  let fmt = vm.heap.string(fmt).as_str().to_string();
  let mut out = String::new();
  let mut next_arg = 1;
  let mut chars = fmt.chars().peekable();
  while let Some(c) = chars.next() {
    if c != '%' {
      out.push(c);
      continue;
    }
    if chars.peek() == Some(&'%') {
      chars.next();
      out.push('%');
      continue;
    }
    if next_arg >= args.len() {
      vm.runtime_error("Not enough arguments in printf");
      return Value::Nil;
    }
    out.push_str(&vm.heap.stringify(args[next_arg], false));
    next_arg += 1;
  }

  vm.write_out(&out);
  Value::Nil
}

/// Reads one line from stdin, without the trailing newline. An optional
/// argument is printed as a prompt. Returns nil on EOF.
pub(crate) fn input(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "input", Arity::AtMost(1), args.len()) {
    return Value::Nil;
  }
  if args.len() == 1 {
    let prompt = vm.heap.stringify(args[0], false);
    vm.write_out(&prompt);
  }

  let mut line = String::new();
  match std::io::stdin().lock().read_line(&mut line) {
    Ok(0) | Err(_) => Value::Nil,
    Ok(_) => {
      if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
          line.pop();
        }
      }
      let s = vm.alloc(Object::String(Str::new(line, false)));
      Value::Obj(s)
    }
  }
}

pub(crate) fn open(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "open", Arity::Exact(2), args.len()) {
    return Value::Nil;
  }
  let (Some(path), Some(mode)) = (
    expect_string(vm, "open", args, 0),
    expect_string(vm, "open", args, 1),
  ) else {
    return Value::Nil;
  };

  let path = vm.heap.string(path).as_str().to_string();
  let mode = vm.heap.string(mode).as_str().to_string();
  match File::open(&path, &mode) {
    Ok(file) => {
      let file = vm.alloc(Object::File(file));
      Value::Obj(file)
    }
    Err(_) => {
      vm.runtime_error(format!("Failed to open file '{path}'"));
      Value::Nil
    }
  }
}

pub(crate) fn close(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "close", Arity::Exact(1), args.len()) {
    return Value::Nil;
  }
  let Some(file) = expect_file(vm, "close", args, 0) else {
    return Value::Nil;
  };

  vm.heap.file_mut(file).close();
  Value::Nil
}

pub(crate) fn read(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "read", Arity::Exact(1), args.len()) {
    return Value::Nil;
  }
  let Some(file) = expect_file(vm, "read", args, 0) else {
    return Value::Nil;
  };

  if !vm.heap.file(file).is_open() {
    vm.runtime_error("File is closed");
    return Value::Nil;
  }
  if !vm.heap.file(file).readable {
    vm.runtime_error("File is not readable");
    return Value::Nil;
  }

  match vm.heap.file_mut(file).read_all() {
    Ok(contents) => {
      let s = vm.alloc(Object::String(Str::new(contents, false)));
      Value::Obj(s)
    }
    Err(_) => {
      vm.runtime_error("Failed to read the file");
      Value::Nil
    }
  }
}

pub(crate) fn write(vm: &mut Vm, args: &[Value]) -> Value {
  if !check_arity(vm, "write", Arity::Exact(2), args.len()) {
    return Value::Nil;
  }
  let (Some(file), Some(data)) = (
    expect_file(vm, "write", args, 0),
    expect_string(vm, "write", args, 1),
  ) else {
    return Value::Nil;
  };

  if !vm.heap.file(file).is_open() {
    vm.runtime_error("File is closed");
    return Value::Nil;
  }
  if !vm.heap.file(file).writable {
    vm.runtime_error("File is not writable");
    return Value::Nil;
  }

  let data = vm.heap.string(data).as_str().to_string();
  if vm.heap.file_mut(file).write_str(&data).is_err() {
    vm.runtime_error("Failed to write to file");
  }
  Value::Nil
}

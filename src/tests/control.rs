check! {
  if_takes_then_branch,
  r#"
    if (1 < 2) {
      println("then");
    } else {
      println("else");
    }
  "#,
  "then\n"
}

check! {
  if_takes_else_branch,
  r#"
    if (nil) {
      println("then");
    } else {
      println("else");
    }
  "#,
  "else\n"
}

check! {
  while_counts_down,
  r#"
    let n = 3;
    while (n > 0) {
      println(n);
      n = n - 1;
    }
  "#,
  "3\n2\n1\n"
}

check! {
  for_sums_range,
  r#"
    let s = 0;
    for (let i = 0; i < 5; i = i + 1) {
      s = s + i;
    }
    println(s);
  "#,
  "10\n"
}

check! {
  for_without_initializer,
  r#"
    let i = 0;
    for (; i < 2; i = i + 1) {
      println(i);
    }
  "#,
  "0\n1\n"
}

check! {
  for_without_increment,
  r#"
    for (let i = 0; i < 2;) {
      println(i);
      i = i + 1;
    }
  "#,
  "0\n1\n"
}

check! {
  break_leaves_loop,
  r#"
    let i = 0;
    while (true) {
      i = i + 1;
      if (i == 3) {
        break;
      }
    }
    println(i);
  "#,
  "3\n"
}

check! {
  break_inside_for,
  r#"
    for (let i = 0; i < 10; i = i + 1) {
      if (i == 2) {
        break;
      }
      println(i);
    }
    println("done");
  "#,
  "0\n1\ndone\n"
}

check! {
  continue_runs_increment,
  r#"
    let s = 0;
    for (let i = 0; i < 5; i = i + 1) {
      if (i % 2 == 0) {
        continue;
      }
      s = s + i;
    }
    println(s);
  "#,
  "4\n"
}

check! {
  continue_in_while,
  r#"
    let i = 0;
    let s = 0;
    while (i < 4) {
      i = i + 1;
      if (i == 2) {
        continue;
      }
      s = s + i;
    }
    println(s);
  "#,
  "8\n"
}

check! {
  break_pops_block_locals,
  r#"
    let r = 0;
    for (let i = 0; i < 3; i = i + 1) {
      let extra = i * 10;
      if (i == 1) {
        break;
      }
      r = extra;
    }
    println(r);
  "#,
  "0\n"
}

check! {
  logical_and_short_circuits,
  r#"
    println(nil && missing());
    println(true && 7);
  "#,
  "nil\n7\n"
}

check! {
  logical_or_short_circuits,
  r#"
    println(1 || missing());
    println(false || "x");
  "#,
  "1\nx\n"
}

check! {
  nested_loops,
  r#"
    for (let i = 0; i < 2; i = i + 1) {
      for (let j = 0; j < 2; j = j + 1) {
        println(i, j);
      }
    }
  "#,
  "0 0\n0 1\n1 0\n1 1\n"
}

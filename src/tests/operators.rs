check! {
  integer_arithmetic,
  r#"
    println(1 + 2, 7 - 3, 4 * 3, 9 % 4);
  "#,
  "3 4 12 1\n"
}

check! {
  division_is_always_float,
  r#"
    println(10 / 4);
    println(8 / 2);
  "#,
  "2.5\n4\n"
}

check! {
  mixed_arithmetic_promotes_to_float,
  r#"
    println(1 + 0.5, 2 * 1.5, 5.5 % 2);
  "#,
  "1.5 3 1.5\n"
}

check! {
  bitwise_operators,
  r#"
    println(6 & 3, 6 | 3, 6 ^ 3, ~0);
  "#,
  "2 7 5 -1\n"
}

check! {
  comparisons_promote,
  r#"
    println(1 < 2, 2 <= 2, 3 > 4, 1.5 >= 1, 2 == 2.0);
  "#,
  "true true false true true\n"
}

check! {
  equality_is_structural_for_sequences,
  r#"
    println([1, 2] == [1, 2]);
    println({1, "a"} == {1, "a"});
    println([1] == [1, 2]);
    println("ab" == "a" + "b");
  "#,
  "true\ntrue\nfalse\ntrue\n"
}

check! {
  equality_across_types_is_false,
  r#"
    println(1 == "1", nil == false, true == 1);
  "#,
  "false false false\n"
}

check! {
  unary_operators,
  r#"
    println(-5, -2.5, !true, !nil, ~5);
  "#,
  "-5 -2.5 false true -6\n"
}

check! {
  not_equal_desugars_to_negated_eq,
  r#"
    println(1 != 2, 1 != 1);
  "#,
  "true false\n"
}

check! {
  precedence_term_vs_factor,
  r#"
    println(1 + 2 * 3);
    println((1 + 2) * 3);
  "#,
  "7\n9\n"
}

check! {
  range_literal_and_casts,
  r#"
    println(string(0:3));
    println(vector(0:4));
    println(list(4:0));
  "#,
  "<range 0:3>\n{0, 1, 2, 3}\n[4, 3, 2, 1]\n"
}

check! {
  operator_add_overload,
  r#"
    class Vec2 {
      func init(x, y) {
        self.x = x;
        self.y = y;
      }
      operator + (o) {
        return Vec2(self.x + o.x, self.y + o.y);
      }
    }
    let p = Vec2(1, 2) + Vec2(3, 4);
    println(p.x, p.y);
  "#,
  "4 6\n"
}

check! {
  builtin_rule_wins_for_numbers,
  r#"
    class Wrapper {
      operator + (o) { return "overload"; }
    }
    println(1 + 2);
  "#,
  "3\n"
}

check! {
  eq_overload,
  r#"
    class Box {
      func init(v) { self.v = v; }
      operator == (o) { return self.v == o.v; }
    }
    println(Box(1) == Box(1));
    println(Box(1) == Box(2));
  "#,
  "true\nfalse\n"
}

check! {
  comparison_overloads,
  r#"
    class Ord {
      func init(v) { self.v = v; }
      operator < (o) { return self.v < o.v; }
      operator >= (o) { return self.v >= o.v; }
    }
    println(Ord(1) < Ord(2));
    println(Ord(3) >= Ord(2));
  "#,
  "true\ntrue\n"
}

check! {
  unary_minus_overload,
  r#"
    class N {
      func init(v) { self.v = v; }
      operator unary- () { return N(-self.v); }
    }
    println((-N(3)).v);
  "#,
  "-3\n"
}

check! {
  index_overloads,
  r#"
    class Grid {
      func init() {
        self.data = {10, 20};
      }
      operator [] (i) {
        return self.data[i];
      }
      operator []= (i, v) {
        self.data[i] = v;
      }
    }
    let g = Grid();
    println(g[1]);
    g[0] = 5;
    println(g[0]);
  "#,
  "20\n5\n"
}

check! {
  slice_overloads,
  r#"
    class S {
      operator [:] (a, b) {
        return a + b;
      }
      operator [:]= (a, b, v) {
        self.last = a + b + v;
      }
    }
    let s = S();
    println(s[1:2]);
    s[1:2] = 10;
    println(s.last);
  "#,
  "3\n13\n"
}

check! {
  mod_and_bit_overloads,
  r#"
    class M {
      func init(v) { self.v = v; }
      operator % (o) { return M(self.v % o.v); }
      operator & (o) { return M(self.v & o.v); }
      operator | (o) { return M(self.v | o.v); }
      operator ^ (o) { return M(self.v ^ o.v); }
    }
    println(((M(7) % M(4)).v));
    println(((M(6) & M(3)).v));
    println(((M(6) | M(3)).v));
    println(((M(6) ^ M(3)).v));
  "#,
  "3\n2\n7\n5\n"
}

check! {
  string_indexing,
  r#"
    println("abc"[1]);
  "#,
  "b\n"
}

check! {
  vector_index_assignment,
  r#"
    let v = {1, 2};
    v[1] = 9;
    println(v[1]);
  "#,
  "9\n"
}

check_error! {
  add_number_and_string,
  r#"
    println(1 + "a");
  "#,
  "Operands must be numbers, floats, strings or objects with 'operator +' defined"
}

check_error! {
  vector_index_out_of_bounds,
  r#"
    let v = {1};
    v[3];
  "#,
  "Vector index '3' out of bounds"
}

check_error! {
  list_index_out_of_bounds,
  r#"
    let l = [1];
    l[1];
  "#,
  "List index '1' out of bounds"
}

check_error! {
  index_must_be_a_number,
  r#"
    let v = {1};
    v["x"];
  "#,
  "Index must be a number"
}

check_error! {
  modulo_by_zero,
  r#"
    println(5 % 0);
  "#,
  "Division by zero"
}

check_error! {
  spread_requires_sequence,
  r#"
    let x = ..5;
  "#,
  "Can spread only 'list' and 'vector'"
}

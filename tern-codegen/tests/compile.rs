use indoc::indoc;

use tern_codegen::{annotate, emit_to_string};

/// Runs the full pipeline: lex, parse, attach types, emit.
fn compile(source: &str, export_name: &str) -> String {
    let tokens = tern_lexer::lex(source).expect("lex failure");
    let mut program = tern_syntax::parse(tokens).expect("parse failure");
    annotate(&mut program);
    emit_to_string(&program, export_name)
}

#[test]
fn empty_main_emits_exactly() {
    assert_eq!(
        compile("let main = fn () int { }", "main"),
        "(module (func $main (result i32) (return)) (export \"main\" (func $main)))"
    );
}

#[test]
fn constant_initializers_need_no_start_function() {
    let text = compile("let a = 1 let b = 2", "main");
    assert!(text.contains("(global $a i32 (i32.const 1))"));
    assert!(text.contains("(global $b i32 (i32.const 2))"));
    assert!(!text.contains("$/start"));
}

#[test]
fn computed_initializers_defer_into_the_start_function() {
    let text = compile("let x: int = 1 + 2 * 3 let main = fn () int x", "main");
    assert!(text.contains("(global $x (mut i32) (i32.const 0))"));
    assert!(text.contains(
        "(func $/start (i32.const 1) (i32.const 2) (i32.const 3) (i32.mul) (i32.add) \
         (set_global $x)) (start $/start)"
    ));
}

#[test]
fn only_deferred_globals_appear_in_the_start_function() {
    let text = compile("let a: int = 1 let b: int = a + 1", "main");
    assert!(text.contains("(global $a i32 (i32.const 1))"));
    assert!(text.contains("(global $b (mut i32) (i32.const 0))"));
    assert!(text.contains("(func $/start (get_global $a) (i32.const 1) (i32.add) (set_global $b))"));
    assert!(!text.contains("(set_global $a)"));
}

#[test]
fn literal_globals_of_every_lowered_type() {
    let text = compile("let f = 2.5 let b = true let c = 'A' let s = \"hi\"", "main");
    assert!(text.contains("(global $f f64 (f64.const 2.5))"));
    assert!(text.contains("(global $b i32 (i32.const 1))"));
    assert!(text.contains("(global $c i32 (i32.const 65))"));
    // Strings reserve a linear-memory offset and defer nothing.
    assert!(text.contains("(global $s i32 (i32.const 0))"));
    assert!(!text.contains("$/start"));
}

#[test]
fn functions_lower_params_results_and_bodies() {
    let source = indoc! {"
        let add = fn (a int, b int) int a + b
        let main = fn () int add(1, 2)
    "};
    let text = compile(source, "main");
    assert!(text.contains(
        "(func $add (param $a i32) (param $b i32) (result i32) \
         (get_local $a) (get_local $b) (i32.add) (return))"
    ));
    assert!(text.contains("(func $main (result i32) (i32.const 1) (i32.const 2) (call $add) (return))"));
}

#[test]
fn void_functions_omit_the_result() {
    let text = compile("let main = fn () void { }", "main");
    assert!(text.contains("(func $main (return))"));
}

#[test]
fn block_locals_are_declared_before_any_instruction() {
    let source = indoc! {"
        let main = fn () int {
            let x = 1
            let y = x + 1
            y
        }
    "};
    let text = compile(source, "main");
    assert!(text.contains(
        "(func $main (result i32) (local $x i32) (local $y i32) \
         (i32.const 1) (set_local $x) \
         (get_local $x) (i32.const 1) (i32.add) (set_local $y) \
         (get_local $y) (return))"
    ));
}

#[test]
fn function_aliases_emit_calls_to_the_original() {
    let source = indoc! {"
        let f = fn () int 1
        let g = f
        let main = fn () int g()
    "};
    let text = compile(source, "main");
    assert!(text.contains("(call $f)"));
    assert!(!text.contains("$g"));
}

#[test]
fn exporting_an_alias_resolves_to_the_original() {
    let text = compile("let f = fn () int 1 let g = f", "g");
    assert!(text.ends_with("(export \"g\" (func $f)))"));
}

#[test]
fn parenthesized_expressions_emit_their_element() {
    let text = compile("let x: int = (1 + 2) * 3", "main");
    assert!(text.contains("(i32.const 1) (i32.const 2) (i32.add) (i32.const 3) (i32.mul)"));
}

#[test]
fn float_operands_select_float_instructions() {
    let text = compile("let y: float = 1.5 + 2.5", "main");
    assert!(text.contains("(f64.const 1.5) (f64.const 2.5) (f64.add)"));
}

#[test]
fn unary_operators_lower_type_directed() {
    let text = compile("let n: int = -5 let m: float = -2.5 let t: boolean = !false", "main");
    assert!(text.contains("(i32.const 0) (i32.const 5) (i32.sub) (set_global $n)"));
    assert!(text.contains("(f64.const 2.5) (f64.neg) (set_global $m)"));
    assert!(text.contains("(i32.const 0) (i32.eqz) (set_global $t)"));
}

#[test]
fn comparison_results_are_i32() {
    let text = compile("let t: boolean = 1 < 2 let u: boolean = 1.5 <= 2.5", "main");
    assert!(text.contains("(i32.const 1) (i32.const 2) (i32.lt_s)"));
    assert!(text.contains("(f64.const 1.5) (f64.const 2.5) (f64.le)"));
}

#[test]
fn emission_is_deterministic() {
    let source = indoc! {"
        import \"lib\" (print)
        let a: int = 1
        let b: int = a + 1
        let add = fn (x int, y int) int x + y
        let main = fn () int add(a, b)
    "};
    assert_eq!(compile(source, "main"), compile(source, "main"));
}

#[test]
fn emitted_text_is_balanced() {
    let source = indoc! {"
        let a: int = 1 + 2
        let f = fn (x int) int {
            let doubled = x + x
            doubled
        }
        let main = fn () int f(a)
    "};
    let text = compile(source, "main");
    let opens = text.matches('(').count();
    let closes = text.matches(')').count();
    assert_eq!(opens, closes);
    assert!(text.starts_with("(module"));
    assert!(text.ends_with(")"));
}

#[test]
fn imports_are_parsed_but_never_emitted() {
    let text = compile("import \"lib\" (print) let main = fn () void { }", "main");
    assert!(!text.contains("import"));
    assert!(!text.contains("print"));
}

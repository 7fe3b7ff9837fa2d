mod ast;
mod parsing;

pub use ast::*;
pub use parsing::*;

use tern_lexer::{Token, TokenCursor};

/// Parses a whole token stream into a [`Program`]. The stream is expected to
/// end with the lexer's `Eof` token.
pub fn parse(tokens: Vec<Token>) -> Result<Program, ParseError> {
    let mut parser = Parser::new(TokenCursor::new(tokens));
    parser.parse::<Program>()
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    fn program(source: &str) -> Program {
        parse(tern_lexer::lex(source).expect("lex failure")).expect("parse failure")
    }

    fn error(source: &str) -> ParseError {
        parse(tern_lexer::lex(source).expect("lex failure")).expect_err("expected a parse error")
    }

    /// Parses `source` as the right-hand side of a declaration.
    fn expr(source: &str) -> Expr {
        let program = program(&format!("let it = {source}"));
        program.decls.into_iter().next().unwrap().expr
    }

    fn as_binary(expr: Expr) -> (BinaryOp, Expr, Expr) {
        match expr.kind {
            ExprKind::Binary { op, left, right } => (op, *left, *right),
            other => panic!("expected a binary expression, got {other:?}"),
        }
    }

    fn as_int(expr: &Expr) -> i64 {
        match &expr.kind {
            ExprKind::Lit(Literal {
                kind: LitKind::Int { value, .. },
                ..
            }) => *value,
            other => panic!("expected an int literal, got {other:?}"),
        }
    }

    #[test]
    fn tighter_operators_bind_on_the_right() {
        let (op, left, right) = as_binary(expr("1 + 2 * 3"));
        assert_eq!(op, BinaryOp::Add);
        assert_eq!(as_int(&left), 1);
        let (op, left, right) = as_binary(right);
        assert_eq!(op, BinaryOp::Mul);
        assert_eq!(as_int(&left), 2);
        assert_eq!(as_int(&right), 3);
    }

    #[test]
    fn equal_precedence_groups_left() {
        let (op, left, right) = as_binary(expr("1 - 2 + 3"));
        assert_eq!(op, BinaryOp::Add);
        assert_eq!(as_int(&right), 3);
        let (op, left, right) = as_binary(left);
        assert_eq!(op, BinaryOp::Sub);
        assert_eq!(as_int(&left), 1);
        assert_eq!(as_int(&right), 2);
    }

    #[test]
    fn boolean_operators_bind_loosest() {
        let (op, _, right) = as_binary(expr("a || b == c"));
        assert_eq!(op, BinaryOp::Or);
        let (op, _, _) = as_binary(right);
        assert_eq!(op, BinaryOp::Eq);
    }

    #[test]
    fn unary_binds_tighter_than_binary() {
        let (op, left, _) = as_binary(expr("-1 + 2"));
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(
            left.kind,
            ExprKind::Unary {
                op: UnaryOp::Neg,
                ..
            }
        ));
    }

    #[test]
    fn tuple_expressions() {
        match expr("(1, 2, 3)").kind {
            ExprKind::Tuple(items) => assert_eq!(items.len(), 3),
            other => panic!("expected a tuple, got {other:?}"),
        }
        assert!(matches!(expr("()").kind, ExprKind::Tuple(items) if items.is_empty()));
        // A parenthesized expression stays a 1-tuple in the tree.
        assert!(matches!(expr("(1)").kind, ExprKind::Tuple(items) if items.len() == 1));
    }

    #[test]
    fn list_expressions() {
        assert!(matches!(expr("[1, 2]").kind, ExprKind::List(elems) if elems.len() == 2));
        assert!(matches!(expr("[]").kind, ExprKind::List(elems) if elems.is_empty()));
    }

    #[test]
    fn calls_and_call_chains() {
        match expr("f(1, 2)").kind {
            ExprKind::Call { func, args } => {
                assert!(matches!(func.kind, ExprKind::Ident(ref id) if id.name == "f"));
                assert!(matches!(args.kind, ExprKind::Tuple(ref items) if items.len() == 2));
            }
            other => panic!("expected a call, got {other:?}"),
        }
        match expr("f(1)(2)").kind {
            ExprKind::Call { func, .. } => {
                assert!(matches!(func.kind, ExprKind::Call { .. }));
            }
            other => panic!("expected a call chain, got {other:?}"),
        }
    }

    #[test]
    fn function_literals() {
        match expr("fn (a int, b int) int a + b").kind {
            ExprKind::Func(func) => {
                assert_eq!(func.params.len(), 2);
                assert_eq!(func.ret.kind, TypeKind::Int);
                assert!(matches!(func.body, FuncBody::Expr(_)));
            }
            other => panic!("expected a function literal, got {other:?}"),
        }
    }

    #[test]
    fn block_bodies_and_return_void() {
        let source = indoc! {"
            let main = fn () int {
                let x = 1
                x
            }
        "};
        let program = program(source);
        let ExprKind::Func(func) = program.decls[0].expr.kind.clone() else {
            panic!("expected a function literal");
        };
        let FuncBody::Block(block) = func.body else {
            panic!("expected a block body");
        };
        assert_eq!(block.bodies.len(), 2);
        assert!(!block.return_void);

        match expr("fn () int { }").kind {
            ExprKind::Func(func) => match func.body {
                FuncBody::Block(block) => {
                    assert!(block.bodies.is_empty());
                    assert!(block.return_void);
                }
                FuncBody::Expr(_) => panic!("expected a block body"),
            },
            other => panic!("expected a function literal, got {other:?}"),
        }

        match expr("fn () void { let x = 1 }").kind {
            ExprKind::Func(func) => match func.body {
                FuncBody::Block(block) => assert!(block.return_void),
                FuncBody::Expr(_) => panic!("expected a block body"),
            },
            other => panic!("expected a function literal, got {other:?}"),
        }
    }

    #[test]
    fn function_types_are_right_associative() {
        let program = program("let t: int -> int -> int = f");
        let ty = program.decls[0].ty.clone().unwrap();
        match ty.kind {
            TypeKind::Func { param, ret } => {
                assert_eq!(param.kind, TypeKind::Int);
                match ret.kind {
                    TypeKind::Func { param, ret } => {
                        assert_eq!(param.kind, TypeKind::Int);
                        assert_eq!(ret.kind, TypeKind::Int);
                    }
                    other => panic!("expected a nested function type, got {other:?}"),
                }
            }
            other => panic!("expected a function type, got {other:?}"),
        }
    }

    #[test]
    fn compound_type_annotations() {
        let program = program("let x: [int] = a let y: (int, float) = b let z: () = c");
        assert!(matches!(
            program.decls[0].ty.as_ref().unwrap().kind,
            TypeKind::List(ref element) if element.kind == TypeKind::Int
        ));
        assert!(matches!(
            program.decls[1].ty.as_ref().unwrap().kind,
            TypeKind::Tuple(ref items) if items.len() == 2
        ));
        assert!(matches!(
            program.decls[2].ty.as_ref().unwrap().kind,
            TypeKind::Tuple(ref items) if items.is_empty()
        ));
    }

    #[test]
    fn imports() {
        let program = program(r#"import "lib" (print, length as len) let a = 1"#);
        assert_eq!(program.imports.len(), 1);
        let import = &program.imports[0];
        assert!(matches!(
            import.path.kind,
            LitKind::Str { ref value, .. } if value == "lib"
        ));
        assert_eq!(import.elems.len(), 2);
        assert!(import.elems[0].alias.is_none());
        assert_eq!(import.elems[1].alias.as_ref().unwrap().name, "len");
    }

    #[test]
    fn unknown_type_name() {
        let error = error("let x: number = 1");
        assert_eq!((error.position.line, error.position.column), (1, 8));
        assert_eq!(error.unexpected, "unknown type `number`");
    }

    #[test]
    fn dangling_binary_operator_is_reported_at_the_operator() {
        let error = error("let x = foo +");
        assert_eq!((error.position.line, error.position.column), (1, 13));
        assert_eq!(error.unexpected, "non-unary operator `+`");
    }

    #[test]
    fn binary_only_operator_at_expression_start() {
        let error = error("let x = * 2");
        assert_eq!((error.position.line, error.position.column), (1, 9));
        assert_eq!(error.unexpected, "non-unary operator `*`");
    }

    #[test]
    fn non_binary_operator_in_binary_position() {
        let error = error("let x = a ! b");
        assert_eq!((error.position.line, error.position.column), (1, 11));
        assert_eq!(error.unexpected, "non-binary operator `!`");
    }

    #[test]
    fn error_position_matches_the_offending_token() {
        let error = error("let x 1");
        assert_eq!((error.position.line, error.position.column), (1, 7));
        assert_eq!(error.unexpected, "`1`");
        assert_eq!(error.expected.as_deref(), Some("`=`"));
    }

    #[test]
    fn trailing_input_after_declarations() {
        let error = error("let a = 1 2");
        assert_eq!((error.position.line, error.position.column), (1, 11));
        assert_eq!(error.expected.as_deref(), Some("a declaration or end of file"));
    }

    #[test]
    fn every_node_carries_its_first_token_position() {
        let source = indoc! {"
            import \"lib\" (print)
            let one = 1
            let add = fn (a int) int a + 2
        "};
        let program = program(source);
        assert_eq!((program.position.line, program.position.column), (1, 1));
        assert_eq!((program.imports[0].position.line, program.imports[0].position.column), (1, 1));
        assert_eq!((program.decls[0].position.line, program.decls[0].position.column), (2, 1));
        assert_eq!((program.decls[0].expr.position.line, program.decls[0].expr.position.column), (2, 11));
        assert_eq!((program.decls[1].expr.position.line, program.decls[1].expr.position.column), (3, 11));
    }
}

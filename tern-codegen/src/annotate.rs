use std::collections::HashMap;

use tern_foundation::source::Position;
use tern_syntax::{
    Block, BlockItem, Decl, Expr, ExprKind, FuncBody, FuncLit, LitKind, Program, Type, TypeKind,
    UnaryOp,
};

/// Fills in the `ty` field of expression nodes ahead of emission.
///
/// This is attachment, not checking: nothing is validated and nothing is
/// reported. Expressions whose type cannot be resolved keep `None` and the
/// emitter treats them as unsupported.
pub fn annotate(program: &mut Program) {
    let mut annotator = Annotator::default();
    for decl in &mut program.decls {
        annotator.decl(decl);
    }
}

#[derive(Default)]
struct Annotator {
    /// Innermost scope last; module scope is the implicit first frame.
    scopes: Vec<HashMap<String, Type>>,
    module: HashMap<String, Type>,
}

impl Annotator {
    fn bind(&mut self, name: &str, ty: Option<Type>) {
        if let Some(ty) = ty {
            self.scopes
                .last_mut()
                .unwrap_or(&mut self.module)
                .insert(name.to_string(), ty);
        }
    }

    fn lookup(&self, name: &str) -> Option<Type> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .or_else(|| self.module.get(name))
            .cloned()
    }

    fn decl(&mut self, decl: &mut Decl) {
        self.expr(&mut decl.expr);
        let ty = decl.ty.clone().or_else(|| decl.expr.ty.clone());
        self.bind(&decl.name.name, ty);
    }

    fn block(&mut self, block: &mut Block) {
        for item in &mut block.bodies {
            match item {
                BlockItem::Decl(decl) => self.decl(decl),
                BlockItem::Expr(expr) => self.expr(expr),
            }
        }
    }

    fn func(&mut self, position: Position, func: &mut FuncLit) -> Type {
        self.scopes.push(HashMap::new());
        for param in &func.params {
            self.bind(&param.name.name, Some(param.ty.clone()));
        }
        match &mut func.body {
            FuncBody::Block(block) => self.block(block),
            FuncBody::Expr(expr) => self.expr(expr),
        }
        self.scopes.pop();

        // A single parameter is the parameter type itself; any other arity
        // is a tuple of the parameter types.
        let param = if func.params.len() == 1 {
            func.params[0].ty.clone()
        } else {
            Type::new(
                position,
                TypeKind::Tuple(func.params.iter().map(|param| param.ty.clone()).collect()),
            )
        };
        Type::new(
            position,
            TypeKind::Func {
                param: Box::new(param),
                ret: Box::new(func.ret.clone()),
            },
        )
    }

    fn expr(&mut self, expr: &mut Expr) {
        let position = expr.position;
        let ty = match &mut expr.kind {
            ExprKind::Lit(lit) => Some(Type::new(
                position,
                match lit.kind {
                    LitKind::Int { .. } => TypeKind::Int,
                    LitKind::Float { .. } => TypeKind::Float,
                    LitKind::Str { .. } => TypeKind::Str,
                    LitKind::Bool { .. } => TypeKind::Bool,
                    LitKind::Char { .. } => TypeKind::Char,
                },
            )),
            ExprKind::Ident(ident) => self.lookup(&ident.name),
            ExprKind::Tuple(items) => {
                for item in items.iter_mut() {
                    self.expr(item);
                }
                if items.len() == 1 {
                    // Parenthesization is transparent to typing.
                    items[0].ty.clone()
                } else {
                    items
                        .iter()
                        .map(|item| item.ty.clone())
                        .collect::<Option<Vec<Type>>>()
                        .map(|types| Type::new(position, TypeKind::Tuple(types)))
                }
            }
            ExprKind::List(elems) => {
                for elem in elems.iter_mut() {
                    self.expr(elem);
                }
                elems.first().and_then(|elem| elem.ty.clone()).map(|ty| {
                    Type::new(position, TypeKind::List(Box::new(ty)))
                })
            }
            ExprKind::Func(func) => Some(self.func(position, func)),
            ExprKind::Call { func, args } => {
                self.expr(func);
                self.expr(args);
                match func.ty.as_ref().map(|ty| &ty.kind) {
                    Some(TypeKind::Func { ret, .. }) => Some((**ret).clone()),
                    _ => None,
                }
            }
            ExprKind::Unary { op, right } => {
                self.expr(right);
                match op {
                    UnaryOp::Not => Some(Type::new(position, TypeKind::Bool)),
                    UnaryOp::Pos | UnaryOp::Neg => right.ty.clone(),
                }
            }
            ExprKind::Binary { op, left, right } => {
                self.expr(left);
                self.expr(right);
                if op.precedence() <= 3 {
                    // Boolean, equality, and comparison classes all produce
                    // booleans.
                    Some(Type::new(position, TypeKind::Bool))
                } else {
                    left.ty.clone().or_else(|| right.ty.clone())
                }
            }
        };
        expr.ty = ty;
    }
}

#[cfg(test)]
mod tests {
    use tern_syntax::parse;

    use super::*;

    fn annotated(source: &str) -> Program {
        let mut program = parse(tern_lexer::lex(source).unwrap()).unwrap();
        annotate(&mut program);
        program
    }

    fn decl_expr_ty(program: &Program, index: usize) -> &TypeKind {
        &program.decls[index].expr.ty.as_ref().expect("no type attached").kind
    }

    #[test]
    fn literal_types() {
        let program = annotated("let a = 1 let b = 1.5 let c = true let d = 'x' let e = \"s\"");
        assert_eq!(decl_expr_ty(&program, 0), &TypeKind::Int);
        assert_eq!(decl_expr_ty(&program, 1), &TypeKind::Float);
        assert_eq!(decl_expr_ty(&program, 2), &TypeKind::Bool);
        assert_eq!(decl_expr_ty(&program, 3), &TypeKind::Char);
        assert_eq!(decl_expr_ty(&program, 4), &TypeKind::Str);
    }

    #[test]
    fn identifiers_resolve_through_module_scope() {
        let program = annotated("let a = 1 let b = a");
        assert_eq!(decl_expr_ty(&program, 1), &TypeKind::Int);
    }

    #[test]
    fn declared_types_win_over_inferred_ones() {
        // `a` is annotated as float, so `b = a` sees float.
        let program = annotated("let a: float = 1 let b = a");
        assert_eq!(decl_expr_ty(&program, 1), &TypeKind::Float);
    }

    #[test]
    fn function_literals_get_function_types() {
        let program = annotated("let f = fn (a int) int a let g = f");
        assert!(matches!(decl_expr_ty(&program, 0), TypeKind::Func { .. }));
        // The alias sees the function type through the module scope.
        assert!(matches!(decl_expr_ty(&program, 1), TypeKind::Func { .. }));
    }

    #[test]
    fn call_results_use_the_return_type() {
        let program = annotated("let f = fn () float 1.5 let x = f()");
        assert_eq!(decl_expr_ty(&program, 1), &TypeKind::Float);
    }

    #[test]
    fn comparisons_are_boolean_and_arithmetic_keeps_operands() {
        let program = annotated("let a = 1 < 2 let b = 1 + 2 let c = 1.5 * 2.0");
        assert_eq!(decl_expr_ty(&program, 0), &TypeKind::Bool);
        assert_eq!(decl_expr_ty(&program, 1), &TypeKind::Int);
        assert_eq!(decl_expr_ty(&program, 2), &TypeKind::Float);
    }

    #[test]
    fn parameters_are_visible_in_the_body() {
        let program = annotated("let f = fn (a int) int a + 1");
        let ExprKind::Func(func) = &program.decls[0].expr.kind else {
            panic!("expected a function literal");
        };
        let FuncBody::Expr(body) = &func.body else {
            panic!("expected an expression body");
        };
        assert_eq!(body.ty.as_ref().unwrap().kind, TypeKind::Int);
    }

    #[test]
    fn unresolved_expressions_stay_untyped() {
        let program = annotated("let a = missing");
        assert!(program.decls[0].expr.ty.is_none());
    }
}

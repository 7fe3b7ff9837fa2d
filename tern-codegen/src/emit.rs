use tracing::{debug, warn};

use tern_syntax::{
    BinaryOp, Block, BlockItem, Decl, Expr, ExprKind, FuncBody, FuncLit, LitKind, Literal,
    Program, TypeKind, UnaryOp,
};

use crate::{
    context::CodegenContext,
    wat::{self, Fragments},
};

/// Emits a parsed, type-attached program as assembly-text fragments.
///
/// Joined with single spaces the fragments form a complete module that
/// exports `export_name`. Constructs the emitter cannot lower yet produce no
/// output for their subtree; that is an under-approximation, not an error.
pub fn emit(program: &Program, export_name: &str) -> Vec<String> {
    Emitter::new().module(program, export_name)
}

/// Space-joined convenience over [`emit`].
pub fn emit_to_string(program: &Program, export_name: &str) -> String {
    emit(program, export_name).join(" ")
}

struct Emitter {
    ctx: CodegenContext,
    out: Fragments,
}

impl Emitter {
    fn new() -> Self {
        Self {
            ctx: CodegenContext::new(),
            out: Fragments::new(),
        }
    }

    fn module(mut self, program: &Program, export_name: &str) -> Vec<String> {
        debug!(decls = program.decls.len(), "emitting module");
        self.out.open("module");
        for decl in &program.decls {
            self.global_decl(decl);
        }

        let initializers = self.ctx.take_initializers();
        if !initializers.is_empty() {
            debug!(count = initializers.len(), "synthesizing start function");
            self.out.open("func");
            self.out.atom("$/start");
            for (assembly_name, expr) in &initializers {
                self.expr(expr);
                self.out.open("set_global");
                self.out.atom(format_args!("${assembly_name}"));
                self.out.close();
            }
            self.out.close();
            self.out.open("start");
            self.out.atom("$/start");
            self.out.close();
        }

        let export_target = self.ctx.get_global_wat_name(export_name).unwrap_or_else(|| {
            warn!(name = export_name, "export target is not declared");
            export_name.to_string()
        });
        self.out.open("export");
        self.out.atom(format_args!("\"{export_name}\""));
        self.out.open("func");
        self.out.atom(format_args!("${export_target}"));
        self.out.close();
        self.out.close();

        self.out.close();
        self.out.into_vec()
    }

    fn global_decl(&mut self, decl: &Decl) {
        match &decl.expr.kind {
            ExprKind::Func(func) => self.function(decl, func),
            ExprKind::Ident(target) if is_func_typed(&decl.expr) => {
                // A function bound to a new name is an alias; nothing is
                // copied.
                self.ctx.push_alias(&decl.name.name, &target.name);
            }
            _ => self.global_var(decl),
        }
    }

    fn function(&mut self, decl: &Decl, func: &FuncLit) {
        let assembly_name = self.ctx.push_name(&decl.name.name);
        self.out.open("func");
        self.out.atom(format_args!("${assembly_name}"));
        self.ctx.enter_function();
        for param in &func.params {
            let param_name = self.ctx.push_name(&param.name.name);
            if let Some(value_type) = wat::value_type(&param.ty) {
                self.out.open("param");
                self.out.atom(format_args!("${param_name}"));
                self.out.atom(value_type);
                self.out.close();
            }
        }
        if let Some(value_type) = wat::value_type(&func.ret) {
            self.out.open("result");
            self.out.atom(value_type);
            self.out.close();
        }
        match &func.body {
            FuncBody::Block(block) => self.block(block),
            FuncBody::Expr(expr) => self.expr(expr),
        }
        self.out.unit("return");
        self.out.close();
        self.ctx.leave_function();
    }

    fn global_var(&mut self, decl: &Decl) {
        let Some(ty) = decl.ty.as_ref().or(decl.expr.ty.as_ref()) else {
            warn!(name = %decl.name.name, "global without a resolvable type");
            return;
        };
        let Some(value_type) = wat::value_type(ty) else {
            warn!(name = %decl.name.name, "global of an unsupported type");
            return;
        };
        let assembly_name = self.ctx.push_name(&decl.name.name);
        self.out.open("global");
        self.out.atom(format_args!("${assembly_name}"));
        if let ExprKind::Lit(lit) = &decl.expr.kind {
            self.out.atom(value_type);
            self.constant(lit, value_type);
        } else {
            self.out.open("mut");
            self.out.atom(value_type);
            self.out.close();
            self.out.open(format_args!("{value_type}.const"));
            self.out.atom("0");
            self.out.close();
            self.ctx.push_initializer(assembly_name, decl.expr.clone());
        }
        self.out.close();
    }

    fn constant(&mut self, lit: &Literal, value_type: &str) {
        let text = match &lit.kind {
            // The source lexeme is already a valid assembly numeral.
            LitKind::Int { rep, .. } => rep.clone(),
            LitKind::Float { rep, .. } => rep.clone(),
            LitKind::Bool { value, .. } => u32::from(*value).to_string(),
            LitKind::Char { value, .. } => (*value as u32).to_string(),
            // Reserved linear-memory offset.
            LitKind::Str { .. } => "0".to_string(),
        };
        self.out.open(format_args!("{value_type}.const"));
        self.out.atom(text);
        self.out.close();
    }

    /// Blocks lower in two passes: all `local` declarations first, then the
    /// bodies in source order. The target requires every local to be
    /// declared before the first instruction of the function body.
    fn block(&mut self, block: &Block) {
        for item in &block.bodies {
            let BlockItem::Decl(decl) = item else {
                continue;
            };
            if is_alias_decl(decl) {
                continue;
            }
            let Some(value_type) = decl
                .ty
                .as_ref()
                .or(decl.expr.ty.as_ref())
                .and_then(wat::value_type)
            else {
                warn!(name = %decl.name.name, "local of an unsupported type");
                continue;
            };
            let assembly_name = self.ctx.push_name(&decl.name.name);
            self.out.open("local");
            self.out.atom(format_args!("${assembly_name}"));
            self.out.atom(value_type);
            self.out.close();
        }

        for item in &block.bodies {
            match item {
                BlockItem::Expr(expr) => self.expr(expr),
                BlockItem::Decl(decl) => {
                    if is_alias_decl(decl) {
                        if let ExprKind::Ident(target) = &decl.expr.kind {
                            self.ctx.push_alias(&decl.name.name, &target.name);
                        }
                        continue;
                    }
                    // Locals of unsupported types allocated no slot above;
                    // their initializers are skipped with them.
                    if let Some(assembly_name) = self.ctx.get_local_wat_name(&decl.name.name) {
                        self.expr(&decl.expr);
                        self.out.open("set_local");
                        self.out.atom(format_args!("${assembly_name}"));
                        self.out.close();
                    }
                }
            }
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Lit(lit) => match &lit.kind {
                LitKind::Int { rep, .. } => {
                    self.out.open("i32.const");
                    self.out.atom(rep);
                    self.out.close();
                }
                LitKind::Float { rep, .. } => {
                    self.out.open("f64.const");
                    self.out.atom(rep);
                    self.out.close();
                }
                LitKind::Bool { value, .. } => {
                    self.out.open("i32.const");
                    self.out.atom(u32::from(*value));
                    self.out.close();
                }
                LitKind::Char { value, .. } => {
                    self.out.open("i32.const");
                    self.out.atom(*value as u32);
                    self.out.close();
                }
                LitKind::Str { .. } => {
                    warn!("string literals are not lowered yet");
                }
            },
            ExprKind::Ident(ident) => {
                if let Some(local) = self.ctx.get_local_wat_name(&ident.name) {
                    self.out.open("get_local");
                    self.out.atom(format_args!("${local}"));
                    self.out.close();
                } else if let Some(global) = self.ctx.get_global_wat_name(&ident.name) {
                    self.out.open("get_global");
                    self.out.atom(format_args!("${global}"));
                    self.out.close();
                } else {
                    warn!(name = %ident.name, "reference to an unresolved name");
                }
            }
            ExprKind::Call { func, args } => {
                let ExprKind::Ident(callee) = &func.kind else {
                    warn!("calls through non-identifier callees are not lowered");
                    return;
                };
                match &args.kind {
                    ExprKind::Tuple(items) => {
                        for item in items {
                            self.expr(item);
                        }
                    }
                    _ => self.expr(args),
                }
                if let Some(target) = self.ctx.get_global_wat_name(&callee.name) {
                    self.out.open("call");
                    self.out.atom(format_args!("${target}"));
                    self.out.close();
                } else {
                    warn!(name = %callee.name, "call to an unresolved name");
                }
            }
            // A 1-tuple is a parenthesized expression.
            ExprKind::Tuple(items) if items.len() == 1 => self.expr(&items[0]),
            ExprKind::Unary { op, right } => self.unary(*op, right),
            ExprKind::Binary { op, left, right } => self.binary(*op, left, right),
            ExprKind::Func(_) | ExprKind::Tuple(_) | ExprKind::List(_) => {
                warn!("unsupported expression kind; emitting nothing");
            }
        }
    }

    fn unary(&mut self, op: UnaryOp, right: &Expr) {
        match op {
            UnaryOp::Pos => self.expr(right),
            UnaryOp::Neg if is_float(right) => {
                self.expr(right);
                self.out.unit("f64.neg");
            }
            UnaryOp::Neg => {
                self.out.open("i32.const");
                self.out.atom("0");
                self.out.close();
                self.expr(right);
                self.out.unit("i32.sub");
            }
            UnaryOp::Not => {
                self.expr(right);
                self.out.unit("i32.eqz");
            }
        }
    }

    fn binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) {
        self.expr(left);
        self.expr(right);
        let float = is_float(left) || is_float(right);
        if let Some(instruction) = binary_instruction(op, float) {
            self.out.unit(instruction);
        } else {
            warn!(?op, float, "operator has no lowering for its operand type");
        }
    }
}

fn binary_instruction(op: BinaryOp, float: bool) -> Option<&'static str> {
    match (op, float) {
        (BinaryOp::Add, false) => Some("i32.add"),
        (BinaryOp::Add, true) => Some("f64.add"),
        (BinaryOp::Sub, false) => Some("i32.sub"),
        (BinaryOp::Sub, true) => Some("f64.sub"),
        (BinaryOp::Mul, false) => Some("i32.mul"),
        (BinaryOp::Mul, true) => Some("f64.mul"),
        (BinaryOp::Div, false) => Some("i32.div_s"),
        (BinaryOp::Div, true) => Some("f64.div"),
        (BinaryOp::Rem, false) => Some("i32.rem_s"),
        // Booleans are 0 or 1, so the logical operators are the bitwise
        // instructions.
        (BinaryOp::And | BinaryOp::BitAnd, false) => Some("i32.and"),
        (BinaryOp::Or | BinaryOp::BitOr, false) => Some("i32.or"),
        (BinaryOp::BitXor, false) => Some("i32.xor"),
        (BinaryOp::Eq, false) => Some("i32.eq"),
        (BinaryOp::Eq, true) => Some("f64.eq"),
        (BinaryOp::Ne, false) => Some("i32.ne"),
        (BinaryOp::Ne, true) => Some("f64.ne"),
        (BinaryOp::Lt, false) => Some("i32.lt_s"),
        (BinaryOp::Lt, true) => Some("f64.lt"),
        (BinaryOp::Le, false) => Some("i32.le_s"),
        (BinaryOp::Le, true) => Some("f64.le"),
        (BinaryOp::Gt, false) => Some("i32.gt_s"),
        (BinaryOp::Gt, true) => Some("f64.gt"),
        (BinaryOp::Ge, false) => Some("i32.ge_s"),
        (BinaryOp::Ge, true) => Some("f64.ge"),
        _ => None,
    }
}

fn is_float(expr: &Expr) -> bool {
    matches!(
        expr.ty.as_ref().map(|ty| &ty.kind),
        Some(TypeKind::Float)
    )
}

fn is_func_typed(expr: &Expr) -> bool {
    matches!(
        expr.ty.as_ref().map(|ty| &ty.kind),
        Some(TypeKind::Func { .. })
    )
}

fn is_alias_decl(decl: &Decl) -> bool {
    matches!(decl.expr.kind, ExprKind::Ident(_)) && is_func_typed(&decl.expr)
}

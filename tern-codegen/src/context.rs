use std::collections::HashMap;

use indexmap::IndexMap;
use tern_syntax::Expr;

/// Name-resolution state for a single module compilation.
///
/// Assembly names are the source names, except inside nested blocks where a
/// per-function scope ID is appended after a `/` to keep shadowed names
/// apart. User names can never contain `/`, so generated names (including
/// the reserved `$/start`) never collide with them.
pub struct CodegenContext {
    /// Source name → assembly name, in declaration order.
    global_names: IndexMap<String, String>,
    /// Innermost scope last; one frame per active function and per active
    /// nested block.
    local_name_maps: Vec<HashMap<String, String>>,
    /// Pushed and popped together with `local_name_maps`, plus a permanent
    /// bottom frame for module scope.
    alias_maps: Vec<HashMap<String, String>>,
    scope_id_stack: Vec<u32>,
    incr_scope_id: u32,
    /// `(assembly name, initializer)` for globals that need the start
    /// function, in first-declaration order.
    global_initializers: Vec<(String, Expr)>,
}

impl CodegenContext {
    pub fn new() -> Self {
        Self {
            global_names: IndexMap::new(),
            local_name_maps: vec![],
            alias_maps: vec![HashMap::new()],
            scope_id_stack: vec![],
            incr_scope_id: 0,
            global_initializers: vec![],
        }
    }

    /// Opens a function scope. Scope-ID numbering restarts; every function
    /// body numbers its nested blocks independently.
    pub fn enter_function(&mut self) {
        self.local_name_maps.push(HashMap::new());
        self.alias_maps.push(HashMap::new());
        self.incr_scope_id = 0;
        self.scope_id_stack.clear();
    }

    pub fn leave_function(&mut self) {
        self.local_name_maps.pop();
        self.alias_maps.pop();
    }

    /// Opens a nested block scope with a fresh, function-unique scope ID.
    pub fn enter_block(&mut self) {
        self.local_name_maps.push(HashMap::new());
        self.alias_maps.push(HashMap::new());
        self.incr_scope_id += 1;
        self.scope_id_stack.push(self.incr_scope_id);
    }

    pub fn leave_block(&mut self) {
        self.local_name_maps.pop();
        self.alias_maps.pop();
        self.scope_id_stack.pop();
    }

    /// Binds `orig_name` in the innermost active scope and returns the
    /// assembly name chosen for it.
    pub fn push_name(&mut self, orig_name: &str) -> String {
        let assembly_name = match self.scope_id_stack.last() {
            Some(scope_id) => format!("{orig_name}/{scope_id}"),
            None => orig_name.to_string(),
        };
        if let Some(frame) = self.local_name_maps.last_mut() {
            frame.insert(orig_name.to_string(), assembly_name.clone());
        } else {
            self.global_names
                .insert(orig_name.to_string(), assembly_name.clone());
        }
        assembly_name
    }

    /// Records that `from` resolves to the already-bound `to` without any
    /// emitted code.
    pub fn push_alias(&mut self, from: &str, to: &str) {
        self.alias_maps
            .last_mut()
            .expect("the module alias frame is always present")
            .insert(from.to_string(), to.to_string());
    }

    pub fn push_initializer(&mut self, assembly_name: String, expr: Expr) {
        self.global_initializers.push((assembly_name, expr));
    }

    pub fn take_initializers(&mut self) -> Vec<(String, Expr)> {
        std::mem::take(&mut self.global_initializers)
    }

    /// Resolves a name against the local frames, innermost first.
    pub fn get_local_wat_name(&self, orig_name: &str) -> Option<String> {
        self.local_name_maps
            .iter()
            .rev()
            .find_map(|frame| frame.get(orig_name).cloned())
    }

    /// Resolves a name against the module scope. The alias walk spans every
    /// live frame, innermost first, and the first hit rewrites the lookup
    /// key before the global map is consulted.
    pub fn get_global_wat_name(&self, orig_name: &str) -> Option<String> {
        let mut key = orig_name;
        for frame in self.alias_maps.iter().rev() {
            if let Some(target) = frame.get(key) {
                key = target;
                break;
            }
        }
        self.global_names.get(key).cloned()
    }
}

impl Default for CodegenContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_scope_names_pass_through() {
        let mut ctx = CodegenContext::new();
        assert_eq!(ctx.push_name("x"), "x");
        assert_eq!(ctx.get_global_wat_name("x").as_deref(), Some("x"));
        assert_eq!(ctx.get_local_wat_name("x"), None);
    }

    #[test]
    fn function_scope_names_pass_through() {
        let mut ctx = CodegenContext::new();
        ctx.push_name("f");
        ctx.enter_function();
        assert_eq!(ctx.push_name("a"), "a");
        assert_eq!(ctx.get_local_wat_name("a").as_deref(), Some("a"));
        ctx.leave_function();
        assert_eq!(ctx.get_local_wat_name("a"), None);
    }

    #[test]
    fn nested_blocks_disambiguate_shadowed_names() {
        let mut ctx = CodegenContext::new();
        ctx.push_name("x");
        ctx.enter_function();
        ctx.push_name("x");
        ctx.enter_block();
        assert_eq!(ctx.push_name("x"), "x/1");
        assert_eq!(ctx.get_local_wat_name("x").as_deref(), Some("x/1"));
        ctx.enter_block();
        assert_eq!(ctx.push_name("x"), "x/2");
        ctx.leave_block();
        // Back in the outer block the outer binding is visible again.
        assert_eq!(ctx.get_local_wat_name("x").as_deref(), Some("x/1"));
        ctx.leave_block();
        assert_eq!(ctx.get_local_wat_name("x").as_deref(), Some("x"));
        ctx.leave_function();
    }

    #[test]
    fn scope_ids_restart_for_every_function() {
        let mut ctx = CodegenContext::new();
        ctx.enter_function();
        ctx.enter_block();
        assert_eq!(ctx.push_name("a"), "a/1");
        ctx.leave_block();
        ctx.leave_function();
        ctx.enter_function();
        ctx.enter_block();
        assert_eq!(ctx.push_name("b"), "b/1");
        ctx.leave_block();
        ctx.leave_function();
    }

    #[test]
    fn sibling_blocks_get_distinct_scope_ids() {
        let mut ctx = CodegenContext::new();
        ctx.enter_function();
        ctx.enter_block();
        assert_eq!(ctx.push_name("x"), "x/1");
        ctx.leave_block();
        ctx.enter_block();
        assert_eq!(ctx.push_name("x"), "x/2");
        ctx.leave_block();
        ctx.leave_function();
    }

    #[test]
    fn aliases_resolve_transparently() {
        let mut ctx = CodegenContext::new();
        ctx.push_name("f");
        ctx.push_alias("g", "f");
        assert_eq!(ctx.get_global_wat_name("g").as_deref(), Some("f"));
        assert_eq!(ctx.get_global_wat_name("f").as_deref(), Some("f"));
    }

    #[test]
    fn alias_frames_pop_with_their_scope() {
        let mut ctx = CodegenContext::new();
        ctx.push_name("f");
        ctx.enter_function();
        ctx.push_alias("g", "f");
        assert_eq!(ctx.get_global_wat_name("g").as_deref(), Some("f"));
        ctx.leave_function();
        assert_eq!(ctx.get_global_wat_name("g"), None);
    }

    // The alias walk deliberately spans every live frame, so an alias made
    // by an inner function is visible while that frame is live even when
    // resolving for an outer scope.
    #[test]
    fn alias_lookup_crosses_live_function_frames() {
        let mut ctx = CodegenContext::new();
        ctx.push_name("f");
        ctx.enter_function();
        ctx.enter_function();
        ctx.push_alias("g", "f");
        assert_eq!(ctx.get_global_wat_name("g").as_deref(), Some("f"));
        ctx.leave_function();
        assert_eq!(ctx.get_global_wat_name("g"), None);
        ctx.leave_function();
    }

    #[test]
    fn initializers_keep_declaration_order() {
        use tern_foundation::source::Position;
        use tern_syntax::{Expr, ExprKind, Ident};

        let mut ctx = CodegenContext::new();
        ctx.push_name("a");
        ctx.push_name("b");
        for name in ["a", "b"] {
            ctx.push_initializer(
                name.to_string(),
                Expr::new(
                    Position::START,
                    ExprKind::Ident(Ident {
                        position: Position::START,
                        name: name.to_string(),
                    }),
                ),
            );
        }
        let order: Vec<String> = ctx
            .take_initializers()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(order, vec!["a".to_string(), "b".to_string()]);
        assert!(ctx.take_initializers().is_empty());
    }
}

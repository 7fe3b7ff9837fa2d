use std::fmt::Display;

use tern_syntax::{Type, TypeKind};

/// Lowers a source type to its assembly value type. `None` means the type
/// has no value representation: `void`, and the compound types that are not
/// lowered yet.
pub fn value_type(ty: &Type) -> Option<&'static str> {
    match ty.kind {
        TypeKind::Int => Some("i32"),
        TypeKind::Float => Some("f64"),
        // Strings are offsets into linear memory.
        TypeKind::Str => Some("i32"),
        TypeKind::Bool => Some("i32"),
        TypeKind::Char => Some("i32"),
        TypeKind::Void => None,
        TypeKind::List(_) | TypeKind::Tuple(_) | TypeKind::Func { .. } => None,
    }
}

/// An assembly-text module under construction, as a sequence of fragments.
///
/// Joining the fragments with single spaces yields balanced S-expression
/// text: `open` starts a form glued to its head symbol and `close` glues the
/// closing paren onto the previous fragment.
#[derive(Debug, Default)]
pub struct Fragments {
    frags: Vec<String>,
}

impl Fragments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a form: `(head`.
    pub fn open(&mut self, head: impl Display) {
        self.frags.push(format!("({head}"));
    }

    /// Emits a bare atom.
    pub fn atom(&mut self, atom: impl Display) {
        self.frags.push(atom.to_string());
    }

    /// Closes the innermost open form.
    pub fn close(&mut self) {
        self.frags
            .last_mut()
            .expect("close without an open form")
            .push(')');
    }

    /// An argumentless form: `(head)`.
    pub fn unit(&mut self, head: impl Display) {
        self.open(head);
        self.close();
    }

    pub fn into_vec(self) -> Vec<String> {
        self.frags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_join_is_balanced_sexpr_text() {
        let mut out = Fragments::new();
        out.open("module");
        out.open("func");
        out.atom("$main");
        out.open("result");
        out.atom("i32");
        out.close();
        out.unit("return");
        out.close();
        out.close();
        assert_eq!(
            out.into_vec().join(" "),
            "(module (func $main (result i32) (return)))"
        );
    }
}

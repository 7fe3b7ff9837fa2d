mod annotate;
mod context;
mod emit;
mod wat;

pub use annotate::*;
pub use context::*;
pub use emit::*;
pub use wat::*;

mod expr;

pub use expr::*;

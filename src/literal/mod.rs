pub(crate) mod types;
pub(crate) mod parser;

pub use types::{LiteralError, Value};
pub use parser::parse_literal;

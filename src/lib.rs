pub mod command;
pub mod common;
pub mod set;
pub mod splay;

pub use command::{run, Command, Error, ParseError, Response};
pub use set::SplaySet;

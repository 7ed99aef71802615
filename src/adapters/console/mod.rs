//! Console adapter - a line-oriented stand-in for a chat surface.

mod command;
#[allow(clippy::module_inception)]
mod console;
mod render;

pub use command::{ConsoleCommand, ParseError, HELP};
pub use console::{Console, Flow};
pub use render::Renderer;

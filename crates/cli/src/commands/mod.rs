pub mod chain;
pub mod history;
pub mod project;
pub mod util;
pub mod validate;

pub use chain::*;
pub use history::*;
pub use project::*;
pub use util::*;
pub use validate::*;

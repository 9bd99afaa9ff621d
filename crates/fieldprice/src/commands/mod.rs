//! Command handlers, one module per subcommand.

pub mod completion;
pub mod deps;
pub mod order;
pub mod price;
pub mod validate;
pub mod vars;

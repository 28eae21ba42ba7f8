mod check;
mod update;
mod validate;

pub use check::cmd_check;
pub use update::cmd_update;
pub use validate::cmd_validate;

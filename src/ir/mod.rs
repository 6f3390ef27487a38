/// The intermediate representation fed to the SMT encoder: variables, types,
/// and the closed formula algebra that a path's instructions translate into.
pub mod encode;
pub mod formula;
pub mod types;
pub mod var;

//! Subcommand implementations, one module per command

pub mod decode;
pub mod encode;
pub mod info;
pub mod packets;
pub mod route;
pub mod sync;

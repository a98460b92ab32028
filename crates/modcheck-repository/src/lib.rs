#![allow(clippy::missing_errors_doc)]

mod local;
mod modrinth;
pub use local::*;
pub use modrinth::*;

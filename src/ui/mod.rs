mod focus;
mod host;

pub use focus::*;
pub use host::*;

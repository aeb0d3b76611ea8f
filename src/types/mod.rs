pub mod header;
pub mod sample;

pub use header::*;
pub use sample::*;

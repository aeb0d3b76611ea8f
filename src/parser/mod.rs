pub mod header;
pub mod main;
pub mod samples;
pub mod stream;

pub use header::*;
pub use main::*;
pub use samples::*;
pub use stream::*;

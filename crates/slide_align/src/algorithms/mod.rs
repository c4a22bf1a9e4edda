pub mod decode;
pub mod diff;
pub mod preprocessing;
pub mod extraction;
pub mod moments;
pub mod selection;

pub use decode::*;
pub use diff::*;
pub use preprocessing::*;
pub use extraction::*;
pub use moments::*;
pub use selection::*;

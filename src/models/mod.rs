pub mod commission;
pub mod common;
pub mod order;
pub mod resolution;
pub mod status;

pub use commission::*;
pub use common::*;
pub use order::*;
pub use resolution::*;
pub use status::*;

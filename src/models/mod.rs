pub mod proxy;
pub mod result;
pub mod target;

pub use proxy::*;
pub use result::*;
pub use target::*;

pub mod dependencies;
pub use dependencies::*;
pub mod descriptor;
pub use descriptor::*;
pub mod runtime;
pub use runtime::*;

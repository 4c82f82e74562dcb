pub mod application;
pub mod assessment;
pub mod category;

pub use application::*;
pub use assessment::*;
pub use category::*;

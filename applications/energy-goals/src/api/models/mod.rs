pub mod consumption;
pub mod goals;

pub use consumption::*;
pub use goals::*;

pub mod geodesy;
pub mod vec;

pub use geodesy::*;
pub use vec::*;

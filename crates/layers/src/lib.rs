pub mod health;
pub mod layer;
pub mod manager;
pub mod wmts;

pub use health::{HealthState, OverlayHealth};
pub use layer::{ImageFormat, LayerId, OverlayLayer, OverlaySpec};
pub use manager::OverlayManager;
pub use wmts::{TileCoord, TileTemplate};

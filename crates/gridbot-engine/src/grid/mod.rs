pub mod map;
pub mod projector;
pub mod tilemap;

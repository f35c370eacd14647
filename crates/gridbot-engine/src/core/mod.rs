pub mod scene;
pub mod session;

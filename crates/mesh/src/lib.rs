//! Page curl geometry: mesh builder, texture pages and the locked handle
//! shared between input, animation and draw contexts.

pub mod curl;
pub mod handle;
pub mod page;
pub mod pool;
pub mod vertex;

pub use curl::{CurlMesh, MeshDraw};
pub use handle::MeshHandle;
pub use page::{PageProvider, PageSide, TexturePage};

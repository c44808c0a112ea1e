//! Page content for the book: RGBA8 page textures, a PNG directory page
//! provider and OBJ export of drawn meshes.

pub mod obj;
pub mod provider;
pub mod texture;

pub use obj::{save_obj, write_obj};
pub use provider::DirectoryProvider;
pub use texture::{TextureData, next_power_of_two};

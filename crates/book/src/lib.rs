//! Touch-driven page turning on top of the `mesh` crate: the curl
//! position solver, release animation, page layout and the book
//! controller that swaps meshes as pages turn.

pub mod animation;
pub mod book;
pub mod config;
pub mod layout;
pub mod solver;

pub use animation::{AnimationTarget, CurlAnimation, ease};
pub use book::{Book, TouchAction, TouchEvent};
pub use config::{BookConfig, Margins};
pub use layout::{Page, PageLayout, ViewMode};
pub use solver::{CurlCommand, CurlState, SolverInput, nominal_radius, solve};

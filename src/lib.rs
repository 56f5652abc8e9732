//! # nearthree
//!
//! `nearthree` is a Rust library for nearest-neighbor queries over static sets of
//! 3D points, designed to be used in Rust as well as compiled to WebAssembly
//! (WASM). A binary space partition is built once over the point set and then
//! answers nearest-point, k-nearest and fixed-radius queries with
//! branch-and-bound pruning.
//!
//! ## Features
//!
//! - **WASM-first**: Built with `wasm-bindgen` for seamless integration with JavaScript and TypeScript.
//! - **Build once, query many**: The index is immutable after a build; rebuilding replaces it wholesale.
//! - **Three query types**: nearest point, k-nearest points, and fixed-radius ball collection, each
//!   reporting how many leaves it had to scan.
//! - **Parallel batches**: Bulk nearest queries fan out over `rayon`.
//!
//! ## Main Interface
//!
//! Rust callers build a [`BspTree`] over any [`PointSet`]; JavaScript callers go
//! through the [`PointIndex`] wrapper.

mod bounds;
mod bsp;
mod error;
mod point_set;
mod query;
mod wasm;

pub use bounds::BoundingBox;
pub use bsp::BspTree;
pub use error::IndexError;
pub use point_set::PointSet;
pub use point_set::random_points;
pub use query::Ball;
pub use query::KNearest;
pub use query::Nearest;
pub use wasm::Nearest3D;
pub use wasm::PointIndex;

/// Procedural meshes

pub mod shape_builder;

pub use shape_builder::*;

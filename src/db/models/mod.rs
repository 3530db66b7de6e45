// src/db/models/mod.rs

//! Data models for registry entities

mod installed;
mod link;

pub use installed::InstalledRecipe;
pub use link::BinaryLink;

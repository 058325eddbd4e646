pub mod document;
pub mod error;
pub mod notegate;
pub mod query;
pub mod tags;
pub mod tree;
pub mod vector;

pub use error::{Error, Result};

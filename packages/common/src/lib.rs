//! # Layoutpad Common
//!
//! Plain data describing a canvas document: the container and the ordered
//! list of placed blocks. Everything here serializes losslessly to JSON;
//! import/export is a verbatim parse/stringify of this shape.

pub mod error;
pub mod model;
pub mod result;

pub use error::*;
pub use model::*;
pub use result::*;

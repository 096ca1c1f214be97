//! Asset readers.

pub mod obj_read;

pub use obj_read::{read_obj, read_obj_str, ObjMesh};

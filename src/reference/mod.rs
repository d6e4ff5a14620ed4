//! Reference data: prosecutors and the Penal Code catalog

pub mod penal_code;
pub mod prosecutors;

pub use penal_code::Article;
pub use prosecutors::{
    DirectoryError, NameIndex, ProsecutorDirectory, ProsecutorSource, StaticProsecutors,
    StoredProsecutors,
};

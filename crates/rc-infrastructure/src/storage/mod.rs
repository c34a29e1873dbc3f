pub mod atomic_file;
pub mod key_value;

pub use atomic_file::{AtomicFile, AtomicFileError, FileFormat};
pub use key_value::FileKeyValueStore;

pub mod cancel;
pub mod chunk;
pub mod document;
pub mod error;
pub mod options;

pub use cancel::CancelFlag;
pub use chunk::*;
pub use document::*;
pub use error::*;
pub use options::*;

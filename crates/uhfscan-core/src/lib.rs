pub mod constants;
pub mod error;
pub mod record;
pub mod types;
pub mod view;

pub use error::{Error, Result};
pub use record::{TagRecord, TagRecordBuilder};
pub use types::*;
pub use view::{DataTypeView, TagFields, hex_to_ascii};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

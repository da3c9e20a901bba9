pub mod category;
pub mod error;
pub mod session;
pub mod storage;
pub mod types;

pub use category::{CategorySelector, CategorySpec, CategoryTable};
pub use error::Error;
pub use session::{PageSession, SessionLauncher};
pub use storage::ArticleStorage;
pub use types::{ArticleRecord, ArticleRef, DateRange};

pub type Result<T> = std::result::Result<T, Error>;

pub mod csv_export;
pub mod json;
pub mod memory;

pub use csv_export::export_csv;
pub use json::JsonFileStorage;
pub use memory::MemoryStorage;

pub mod prelude {
    pub use super::json::JsonFileStorage;
    pub use super::memory::MemoryStorage;
    pub use kunuz_core::ArticleStorage;
}

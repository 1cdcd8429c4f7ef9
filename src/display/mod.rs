pub mod export;
pub mod linkify;

pub use export::ExportDocument;

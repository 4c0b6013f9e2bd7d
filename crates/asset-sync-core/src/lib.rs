pub mod analysis;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod progress;
pub mod rename;
pub mod report;
pub mod scanner;
pub mod upload;

pub use catalog::{CatalogRecord, CatalogSource, SqliteCatalog, StaticCatalog};
pub use config::AppConfig;
pub use convert::{CommandConverter, ImageConverter};
pub use engine::Pipeline;
pub use error::{ConvertError, Error};
pub use normalize::{normalize, NormalizedKey};
pub use progress::{ProgressReporter, SilentReporter};
pub use report::{Conflict, ItemStatus, RunReport};

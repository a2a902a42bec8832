mod layout_backend;
mod ocr_text;
mod run;
mod store;
mod tools;

pub use run::run;
pub(crate) use run::{DEFAULT_DB_FILE, LATEST_MANIFEST_FILE};

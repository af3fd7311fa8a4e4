pub mod configuration;
pub mod models;
pub mod run;
pub mod walker;
pub mod xkcd_client;

pub use configuration::Settings;
pub use models::ComicRecord;
pub use run::run;
pub use walker::{WalkReport, Walker};

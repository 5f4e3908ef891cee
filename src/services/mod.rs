pub mod file_store;
pub mod seeder;

pub use file_store::{file_id_from_link, FileStore, GoogleDriveStore, StoredFile};

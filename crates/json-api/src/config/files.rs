//! Files Config

use std::path::PathBuf;

use clap::Args;

/// Uploaded file storage.
#[derive(Debug, Args)]
pub struct FilesConfig {
    /// Directory uploaded files are written under
    #[arg(long, env = "FILES_STORAGE_ROOT", default_value = "storage/files")]
    pub files_storage_root: PathBuf,
}

use directories::ProjectDirs;
use std::path::PathBuf;

pub const APP_QUALIFIER: &str = "org";
pub const APP_ORG: &str = "podrafter";
pub const APP_NAME: &str = "locker";

pub const LOCKER_DB_FILE: &str = "podrafter-locker.db";
pub const QUEUE_DB_FILE: &str = "bg-sync.db";

pub fn data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(override_dir) = std::env::var("PD_DATA_DIR") {
        return Ok(PathBuf::from(override_dir));
    }
    let dirs = ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .ok_or_else(|| anyhow::anyhow!("cannot determine data directory"))?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Like [`data_dir`], falling back to the working directory when no home
/// directory can be resolved.
pub fn default_data_dir() -> PathBuf {
    data_dir().unwrap_or_else(|_| PathBuf::from("."))
}

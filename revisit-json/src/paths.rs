use directories::ProjectDirs;
use std::path::PathBuf;

pub fn data_root() -> PathBuf {
    if let Some(pd) = ProjectDirs::from("org", "revisit", "Revisit") {
        pd.data_dir().to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

pub fn default_store_file() -> (PathBuf, PathBuf) {
    let root = data_root();
    (root.join("revisit.json"), root.join("backups"))
}

/// Backups directory that sits next to an explicitly chosen store file.
pub fn backups_beside(file: &std::path::Path) -> PathBuf {
    file.with_extension("backups")
}

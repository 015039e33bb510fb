use directories::{ProjectDirs, UserDirs};
use std::fs;
use std::path::PathBuf;

/// Per-user locations. Export and import dialogs open in `exports`.
pub struct AppPaths {
    pub exports: PathBuf,
}

impl AppPaths {
    /// `Documents/Digital Binders`, or an `exports` folder in the app data
    /// directory when the platform has no documents folder.
    pub fn from_project_dirs() -> Option<Self> {
        ProjectDirs::from("com", "digitalbinder", "DigitalBinder").map(|dirs| {
            let exports = UserDirs::new()
                .and_then(|user| user.document_dir().map(|docs| docs.join("Digital Binders")))
                .unwrap_or_else(|| dirs.data_dir().join("exports"));

            Self { exports }
        })
    }

    pub fn ensure_dirs_exist(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.exports)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dirs_creates_exports() {
        let root = std::env::temp_dir().join(format!("digital_binder_paths_{}", std::process::id()));
        let paths = AppPaths {
            exports: root.join("Digital Binders"),
        };
        paths.ensure_dirs_exist().unwrap();
        paths.ensure_dirs_exist().unwrap();
        assert!(paths.exports.is_dir());
        fs::remove_dir_all(&root).unwrap();
    }
}

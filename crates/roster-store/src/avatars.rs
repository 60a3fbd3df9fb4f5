use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

/// An uploaded avatar image, still in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Avatar files on local disk, served publicly by file name.
#[derive(Clone, Debug)]
pub struct AvatarStore {
    dir: PathBuf,
}

impl AvatarStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the upload under a fresh name and returns that name.
    ///
    /// The client's file name only contributes its extension.
    pub async fn save(&self, upload: &AvatarUpload) -> std::io::Result<String> {
        fs::create_dir_all(&self.dir).await?;

        let ext = Path::new(&upload.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".into());
        let storedName = format!("{}.{ext}", Uuid::new_v4().simple());

        fs::write(self.dir.join(&storedName), &upload.bytes).await?;
        info!("stored avatar {storedName} ({} bytes)", upload.bytes.len());
        Ok(storedName)
    }

    pub async fn remove(&self, storedName: &str) {
        // Names are generated by save(); anything else is not ours to touch.
        if storedName.contains(['/', '\\']) || storedName.starts_with('.') {
            warn!("refusing to remove avatar with unexpected name {storedName:?}");
            return;
        }
        if let Err(e) = fs::remove_file(self.dir.join(storedName)).await {
            warn!("failed to remove avatar {storedName}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_uses_generated_name_with_client_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = AvatarStore::new(dir.path().join("avatars"));
        let upload = AvatarUpload {
            file_name: "../../Me.PNG".into(),
            content_type: Some("image/png".into()),
            bytes: vec![1, 2, 3],
        };

        let name = store.save(&upload).await.unwrap();
        assert!(name.ends_with(".png"));
        assert!(!name.contains('/'));
        assert_eq!(std::fs::read(store.dir().join(&name)).unwrap(), vec![1, 2, 3]);

        store.remove(&name).await;
        assert!(!store.dir().join(&name).exists());
    }
}

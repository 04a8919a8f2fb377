use uuid::Uuid;
use vidvault_core::sanitize_filename;

use crate::traits::{StorageError, StorageResult};

/// An in-flight chunked upload.
///
/// Sessions have no persisted record: they exist only as a `.part` file
/// whose name is derived from the owner, the client-chosen upload id and the
/// original filename. Both client values are sanitized before use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UploadSession {
    owner_id: Uuid,
    upload_id: String,
    filename: String,
}

impl UploadSession {
    pub fn new(owner_id: Uuid, upload_id: &str, original_filename: &str) -> StorageResult<Self> {
        let upload_id = sanitize_filename(upload_id)
            .map_err(|_| StorageError::InvalidKey(format!("Invalid upload id: {}", upload_id)))?;
        let filename = sanitize_filename(original_filename).map_err(|_| {
            StorageError::InvalidKey(format!("Invalid filename: {}", original_filename))
        })?;

        Ok(Self {
            owner_id,
            upload_id,
            filename,
        })
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    /// Sanitized original filename
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Key of the partial file: `{owner_id}/{upload_id}_{filename}.part`
    pub fn part_key(&self) -> String {
        format!("{}/{}_{}.part", self.owner_id, self.upload_id, self.filename)
    }

    /// Preferred key of the finalized file: `{owner_id}/{filename}`
    pub fn final_key(&self) -> String {
        format!("{}/{}", self.owner_id, self.filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_owner_scoped_and_sanitized() {
        let owner = Uuid::new_v4();
        let session = UploadSession::new(owner, "1700000000-My Show.mp4", "My Show S01E01.mp4")
            .unwrap();

        assert_eq!(session.filename(), "My_Show_S01E01.mp4");
        assert_eq!(
            session.part_key(),
            format!("{}/1700000000-My_Show.mp4_My_Show_S01E01.mp4.part", owner)
        );
        assert_eq!(session.final_key(), format!("{}/My_Show_S01E01.mp4", owner));
    }

    #[test]
    fn traversal_in_upload_id_cannot_escape_owner_dir() {
        let owner = Uuid::new_v4();
        let session = UploadSession::new(owner, "../../x", "movie.mp4").unwrap();
        assert!(!session.part_key().contains(".."));
    }

    #[test]
    fn unusable_names_are_rejected() {
        let owner = Uuid::new_v4();
        assert!(matches!(
            UploadSession::new(owner, "..", "movie.mp4"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            UploadSession::new(owner, "abc", "///"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}

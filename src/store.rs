use crate::sync_error::SyncError;

/// Storage operations the dispatcher needs. Albums are buckets, photos are objects.
pub(crate) trait PhotoStore {
    async fn list_albums(&self) -> Result<Vec<String>, SyncError>;

    /// Every key in `album`, in listing order. A missing album is
    /// `SyncError::AlbumNotFound`.
    async fn list_keys(&self, album: &str) -> Result<Vec<String>, SyncError>;

    async fn get_object(&self, album: &str, key: &str) -> Result<Vec<u8>, SyncError>;

    async fn put_object(&self, album: &str, key: &str, body: Vec<u8>) -> Result<(), SyncError>;

    async fn album_exists(&self, album: &str) -> Result<bool, SyncError>;

    async fn create_album(&self, album: &str) -> Result<(), SyncError>;
}

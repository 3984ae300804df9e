use agsync_core::{FileDescriptor, SyncError};
use agsync_infra::ApiClient;
use camino::Utf8Path;

/// Transport primitives the tree walk is written against.
#[async_trait::async_trait]
pub trait RemoteService: Send + Sync {
    async fn list(&self, listing_url: &str) -> Result<Vec<FileDescriptor>, SyncError>;
    async fn download(&self, url: &str, dest_dir: &Utf8Path, name: &str)
        -> Result<u64, SyncError>;
    async fn upload(
        &self,
        local: &Utf8Path,
        dir_url: &str,
        new_name: Option<&str>,
    ) -> Result<u64, SyncError>;
    async fn mkdir(&self, name: &str, parent_url: &str) -> Result<(), SyncError>;
    async fn ingest(
        &self,
        source: &str,
        dir_url: &str,
        file_name: Option<&str>,
    ) -> Result<serde_json::Value, SyncError>;
}

#[async_trait::async_trait]
impl RemoteService for ApiClient {
    async fn list(&self, listing_url: &str) -> Result<Vec<FileDescriptor>, SyncError> {
        ApiClient::list(self, listing_url).await
    }

    async fn download(
        &self,
        url: &str,
        dest_dir: &Utf8Path,
        name: &str,
    ) -> Result<u64, SyncError> {
        ApiClient::download(self, url, dest_dir, name).await
    }

    async fn upload(
        &self,
        local: &Utf8Path,
        dir_url: &str,
        new_name: Option<&str>,
    ) -> Result<u64, SyncError> {
        ApiClient::upload(self, local, dir_url, new_name).await
    }

    async fn mkdir(&self, name: &str, parent_url: &str) -> Result<(), SyncError> {
        ApiClient::mkdir(self, name, parent_url).await
    }

    async fn ingest(
        &self,
        source: &str,
        dir_url: &str,
        file_name: Option<&str>,
    ) -> Result<serde_json::Value, SyncError> {
        ApiClient::ingest(self, source, dir_url, file_name).await
    }
}

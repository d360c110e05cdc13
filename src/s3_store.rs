use rusoto_s3::{
    CreateBucketConfiguration, CreateBucketRequest, GetObjectRequest, HeadBucketError, HeadBucketRequest,
    ListObjectsV2Error, ListObjectsV2Request, PutObjectRequest, S3Client, StreamingBody, S3,
};
use rusoto_core::{HttpClient, Client, Region, RusotoError};
use rusoto_credential::StaticProvider;
use tokio::io::AsyncReadExt;
use tracing::debug;
use crate::settings::AwsSettings;
use crate::store::PhotoStore;
use crate::sync_error::SyncError;

#[derive(Clone)]
pub struct StoreClient {
    inner: S3Client,
    region: Region,
}

impl StoreClient {
    pub(crate) fn new(settings: &AwsSettings) -> Result<StoreClient, SyncError> {
        let region = settings.region()?;
        let dispatcher = HttpClient::new()
            .map_err(|err| SyncError::Init(format!("failed to create HTTP client: {}", err)))?;

        let credentials = StaticProvider::new_minimal(settings.accesskey.clone(), settings.secretkey.clone());
        let client = Client::new_with(credentials, dispatcher);
        let inner = S3Client::new_with_client(client, region.clone());

        Ok(StoreClient::with_client(inner, region))
    }

    pub(crate) fn with_client(inner: S3Client, region: Region) -> StoreClient {
        StoreClient { inner, region }
    }

    fn location_constraint(&self) -> Option<CreateBucketConfiguration> {
        // us-east-1 rejects an explicit constraint
        match self.region {
            Region::UsEast1 => None,
            _ => Some(CreateBucketConfiguration {
                location_constraint: Some(self.region.name().to_owned()),
            }),
        }
    }
}

fn store_error<E: std::error::Error + 'static>(err: RusotoError<E>) -> SyncError {
    SyncError::Store(err.to_string())
}

/// S3 answers HEAD and some listing requests for absent buckets with a bare 404.
fn is_missing<E>(err: &RusotoError<E>) -> bool {
    matches!(err, RusotoError::Unknown(response) if response.status.as_u16() == 404)
}

impl PhotoStore for StoreClient {
    async fn list_albums(&self) -> Result<Vec<String>, SyncError> {
        debug!("listing buckets");
        let resp = self.inner.list_buckets().await.map_err(store_error)?;

        let names = resp.buckets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|b| b.name)
            .collect();

        Ok(names)
    }

    async fn list_keys(&self, album: &str) -> Result<Vec<String>, SyncError> {
        let mut keys = Vec::new();
        let mut continuation_token = None;

        loop {
            let req = ListObjectsV2Request {
                bucket: album.to_owned(),
                continuation_token: continuation_token.take(),
                ..ListObjectsV2Request::default()
            };
            debug!(bucket = album, token = ?req.continuation_token, "listing objects");

            let resp = match self.inner.list_objects_v2(req).await {
                Ok(resp) => resp,
                Err(RusotoError::Service(ListObjectsV2Error::NoSuchBucket(reason))) => {
                    return Err(SyncError::AlbumNotFound { album: album.to_owned(), reason });
                }
                Err(err) if is_missing(&err) => {
                    return Err(SyncError::AlbumNotFound { album: album.to_owned(), reason: err.to_string() });
                }
                Err(err) => return Err(store_error(err)),
            };

            keys.extend(resp.contents
                .unwrap_or_default()
                .into_iter()
                .filter_map(|o| o.key));

            match resp.next_continuation_token {
                Some(token) if resp.is_truncated.unwrap_or(false) => continuation_token = Some(token),
                _ => break,
            }
        }

        Ok(keys)
    }

    async fn get_object(&self, album: &str, key: &str) -> Result<Vec<u8>, SyncError> {
        let req = GetObjectRequest {
            bucket: album.to_owned(),
            key: key.to_owned(),
            ..GetObjectRequest::default()
        };
        debug!(bucket = album, key, "fetching object");

        let res = self.inner.get_object(req).await.map_err(store_error)?;

        let mut buffer = Vec::new();
        if let Some(body) = res.body {
            body.into_async_read().read_to_end(&mut buffer).await?;
        }

        Ok(buffer)
    }

    async fn put_object(&self, album: &str, key: &str, body: Vec<u8>) -> Result<(), SyncError> {
        let req = PutObjectRequest {
            key: key.to_owned(),
            body: Some(StreamingBody::from(body)),
            bucket: album.to_owned(),
            ..Default::default()
        };
        debug!(bucket = album, key, "putting object");

        let res = self.inner.put_object(req).await.map_err(store_error)?;
        debug!(bucket = album, key, e_tag = ?res.e_tag, "object stored");
        Ok(())
    }

    async fn album_exists(&self, album: &str) -> Result<bool, SyncError> {
        let req = HeadBucketRequest {
            bucket: album.to_owned(),
            ..HeadBucketRequest::default()
        };

        match self.inner.head_bucket(req).await {
            Ok(()) => Ok(true),
            Err(RusotoError::Service(HeadBucketError::NoSuchBucket(_))) => Ok(false),
            Err(err) if is_missing(&err) => Ok(false),
            Err(err) => Err(store_error(err)),
        }
    }

    async fn create_album(&self, album: &str) -> Result<(), SyncError> {
        let request = CreateBucketRequest {
            acl: None,
            bucket: album.to_owned(),
            create_bucket_configuration: self.location_constraint(),
            ..CreateBucketRequest::default()
        };

        let res = self.inner.create_bucket(request).await.map_err(store_error)?;
        debug!(bucket = album, location = ?res.location, "bucket created");

        Ok(())
    }
}

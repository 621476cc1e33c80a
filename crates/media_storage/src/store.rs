use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;
use uuid::Uuid;

/// Image-host client backed by S3.
#[derive(Debug, Clone)]
pub struct MediaStore {
    s3_client: S3Client,
    bucket: String,
    region: String,
}

/// A stored image: the URL it is served from and the id used to delete it.
#[derive(Debug, Clone)]
pub struct StoredImage {
    /// Secure URL serving the image
    pub secure_url: String,
    /// Public id (object key) used for deletion
    pub public_id: String,
}

/// Custom error type for image-host operations
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// S3 upload or delete failed
    #[error("Image host error: {0}")]
    S3Error(String),
}

impl MediaStore {
    /// Creates a new media store with an S3 client initialized from the
    /// ambient AWS configuration. Bucket and region come from the
    /// `MEDIA_BUCKET` and `AWS_REGION` environment variables.
    pub async fn new() -> Result<Self, MediaError> {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        let s3_client = S3Client::new(&config);

        let bucket =
            std::env::var("MEDIA_BUCKET").unwrap_or_else(|_| "campstead-media".to_string());
        let region = std::env::var("AWS_REGION").unwrap_or_else(|_| "us-west-2".to_string());

        Ok(Self {
            s3_client,
            bucket,
            region,
        })
    }

    /// Uploads image bytes and returns the stored image reference.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredImage, MediaError> {
        let public_id = format!("campgrounds/{}", Uuid::new_v4());

        log::info!(
            "Uploading {} byte image to s3://{}/{}",
            bytes.len(),
            self.bucket,
            public_id
        );

        self.s3_client
            .put_object()
            .bucket(&self.bucket)
            .key(&public_id)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| MediaError::S3Error(e.to_string()))?;

        Ok(StoredImage {
            secure_url: object_url(&self.bucket, &self.region, &public_id),
            public_id,
        })
    }

    /// Deletes a stored image by its public id.
    pub async fn delete(&self, public_id: &str) -> Result<(), MediaError> {
        log::info!("Deleting image s3://{}/{}", self.bucket, public_id);

        self.s3_client
            .delete_object()
            .bucket(&self.bucket)
            .key(public_id)
            .send()
            .await
            .map_err(|e| MediaError::S3Error(e.to_string()))?;

        Ok(())
    }
}

fn object_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_url_shape() {
        let url = object_url("campstead-media", "us-west-2", "campgrounds/abc");

        assert_eq!(
            url,
            "https://campstead-media.s3.us-west-2.amazonaws.com/campgrounds/abc"
        );
    }
}

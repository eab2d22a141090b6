//! S3 upload of finished exports
//!
//! Optionally gzip-compresses the CSV before upload. The temporary `.gz`
//! file is removed whether or not the upload succeeds.

use crate::domain::{DrainError, Result};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Uploads export files to an S3 bucket.
pub struct S3Uploader {
    client: Client,
}

impl S3Uploader {
    /// Connects using the default AWS credential chain.
    pub async fn connect(region: &str, profile: Option<&str>) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        Self {
            client: Client::new(&config),
        }
    }

    /// Uploads `file` to `s3://{bucket}/{key}` and returns the object key.
    ///
    /// The key defaults to the file name. With `compress`, the object is
    /// gzip-compressed first and the default key gains a `.gz` suffix.
    pub async fn upload_file(
        &self,
        file: &Path,
        bucket: &str,
        key: Option<&str>,
        compress: bool,
    ) -> Result<String> {
        let (upload_path, default_key, temporary) = if compress {
            let gz_path = gzip_sibling(file);
            compress_file(file, &gz_path)?;
            let name = object_name(&gz_path)?;
            (gz_path.clone(), name, Some(gz_path))
        } else {
            (file.to_path_buf(), object_name(file)?, None)
        };
        let object_key = key.map(str::to_string).unwrap_or(default_key);

        let result = self.put_object(&upload_path, bucket, &object_key).await;

        if let Some(gz_path) = temporary {
            if let Err(err) = std::fs::remove_file(&gz_path) {
                tracing::warn!(
                    path = %gz_path.display(),
                    error = %err,
                    "Failed to remove temporary compressed file"
                );
            }
        }

        result?;
        tracing::info!(bucket, key = %object_key, "Uploaded export to S3");
        Ok(object_key)
    }

    async fn put_object(&self, path: &Path, bucket: &str, key: &str) -> Result<()> {
        let body = ByteStream::from_path(path).await.map_err(|e| {
            DrainError::Upload(format!("failed to read {}: {e}", path.display()))
        })?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| DrainError::Upload(format!("put_object failed: {e}")))?;
        Ok(())
    }
}

/// `users.csv` becomes `users.csv.gz`, next to the original.
fn gzip_sibling(file: &Path) -> PathBuf {
    let mut name = file.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

fn object_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            DrainError::Upload(format!(
                "cannot derive an object key from {}",
                path.display()
            ))
        })
}

fn compress_file(source: &Path, target: &Path) -> Result<()> {
    let mut input = File::open(source).map_err(|e| {
        DrainError::Upload(format!("failed to open {}: {e}", source.display()))
    })?;
    let output = File::create(target).map_err(|e| {
        DrainError::Upload(format!("failed to create {}: {e}", target.display()))
    })?;

    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut input, &mut encoder)
        .map_err(|e| DrainError::Upload(format!("failed to compress: {e}")))?;
    encoder
        .finish()
        .map_err(|e| DrainError::Upload(format!("failed to finish compression: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_gzip_sibling_appends_suffix() {
        assert_eq!(
            gzip_sibling(Path::new("exports/users.csv")),
            Path::new("exports/users.csv.gz")
        );
    }

    #[test]
    fn test_object_name_uses_file_name() {
        assert_eq!(
            object_name(Path::new("exports/users.csv")).unwrap(),
            "users.csv"
        );
    }

    #[test]
    fn test_compress_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("users.csv");
        let target = dir.path().join("users.csv.gz");
        std::fs::write(&source, "sub,email\n1,a@x.com\n").unwrap();

        compress_file(&source, &target).unwrap();

        let mut decoder = GzDecoder::new(File::open(&target).unwrap());
        let mut decompressed = String::new();
        decoder.read_to_string(&mut decompressed).unwrap();
        assert_eq!(decompressed, "sub,email\n1,a@x.com\n");
    }
}

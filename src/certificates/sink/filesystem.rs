use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

use super::OutputSink;
use crate::certificates::authority::IssuedCertificate;
use crate::certificates::request::KeyPair;
use crate::errors::{DeliveryPart, Error, Result};

const KEY_FILE_MODE: u32 = 0o600;
const CERT_FILE_MODE: u32 = 0o644;

/// Writes `{label}-key.pem` and `{label}.pem` (leaf then chain) into a
/// directory.
///
/// Each file is written to a temporary file in the same directory and
/// renamed over the destination, so a reader never observes a partially
/// written file. The certificate is written first.
#[derive(Debug, Clone)]
pub struct FilesystemSink {
    output_dir: PathBuf,
}

/// Paths written by [`FilesystemSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFiles {
    pub private_key: PathBuf,
    pub certificate: PathBuf,
}

impl FilesystemSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn key_path(&self, label: &str) -> PathBuf {
        self.output_dir.join(format!("{label}-key.pem"))
    }

    pub fn certificate_path(&self, label: &str) -> PathBuf {
        self.output_dir.join(format!("{label}.pem"))
    }
}

#[async_trait]
impl OutputSink for FilesystemSink {
    type Output = WrittenFiles;

    fn check_label(&self, label: &str) -> Result<()> {
        if label.is_empty() || label.contains(['/', '\\']) || label == "." || label == ".." {
            return Err(Error::config(format!("'{label}' is not a usable file name stem")));
        }
        Ok(())
    }

    async fn deliver(
        &self,
        label: &str,
        key_pair: KeyPair,
        certificate: IssuedCertificate,
    ) -> Result<WrittenFiles> {
        self.check_label(label)?;

        let dir = self.output_dir.clone();
        let files = WrittenFiles { private_key: self.key_path(label), certificate: self.certificate_path(label) };
        let written = files.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            std::fs::create_dir_all(&dir).map_err(|e| {
                Error::delivery_failed(
                    DeliveryPart::Certificate,
                    &[],
                    format!("cannot create {}: {e}", dir.display()),
                )
            })?;

            write_atomic(&dir, &files.certificate, certificate.full_chain().as_bytes(), CERT_FILE_MODE)
                .map_err(|e| Error::delivery_failed(DeliveryPart::Certificate, &[], e.to_string()))?;

            write_atomic(
                &dir,
                &files.private_key,
                key_pair.private_key_pem().expose_secret().as_bytes(),
                KEY_FILE_MODE,
            )
            .map_err(|e| {
                Error::delivery_failed(DeliveryPart::PrivateKey, &[DeliveryPart::Certificate], e.to_string())
            })
        })
        .await
        .map_err(|e| Error::io(std::io::Error::other(e), "filesystem delivery task failed"))??;

        info!(
            label = %label,
            certificate = %written.certificate.display(),
            private_key = %written.private_key.display(),
            "Wrote certificate and private key"
        );
        Ok(written)
    }
}

fn write_atomic(dir: &Path, destination: &Path, contents: &[u8], mode: u32) -> std::io::Result<()> {
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;
    set_mode(temp.path(), mode)?;
    temp.persist(destination).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

//! Files Data

use jiff::Timestamp;
use rand::{Rng, distributions::Alphanumeric, rngs::OsRng};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::{
    auth::UserUuid,
    domain::{
        files::records::{FileKind, FileRecord, FileUuid},
        orders::records::OrderUuid,
    },
};

/// Largest accepted upload (50 MiB).
pub const MAX_FILE_SIZE: u64 = 52_428_800;

pub const ORIGINAL_NAME_MAX_LEN: usize = 255;

pub const DESCRIPTION_MAX_LEN: usize = 500;

/// Most files one bulk upload may carry.
pub const MAX_BULK_FILES: usize = 10;

pub const DEFAULT_PER_PAGE: u32 = 15;
pub const MAX_PER_PAGE: u32 = 100;

pub const ALLOWED_MIME_TYPES: [&str; 14] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.oasis.opendocument.text",
    "text/plain",
    "text/rtf",
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    "application/zip",
    "application/x-rar-compressed",
    "application/x-7z-compressed",
];

pub const BLOCKED_EXTENSIONS: [&str; 9] =
    ["php", "exe", "bat", "cmd", "com", "pif", "scr", "vbs", "js"];

const RANDOM_SUFFIX_LEN: usize = 8;

/// Why an upload was refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidUpload {
    #[error("file is empty")]
    Empty,

    #[error("file of {0} bytes exceeds the size limit")]
    TooLarge(u64),

    #[error("file type {0} is not allowed")]
    MimeType(String),

    #[error("file extension {0} is not allowed")]
    Extension(String),

    #[error("invalid file name")]
    Name,

    #[error("description is too long")]
    Description,
}

/// An upload as received from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub original_name: String,
    pub mime_type: String,
    pub kind: FileKind,
    pub order_uuid: Option<OrderUuid>,
    pub description: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    /// # Errors
    ///
    /// Returns the first rule the upload breaks.
    pub fn validate(&self) -> Result<(), InvalidUpload> {
        let size = self.size();

        if size == 0 {
            return Err(InvalidUpload::Empty);
        }

        if size > MAX_FILE_SIZE {
            return Err(InvalidUpload::TooLarge(size));
        }

        if !ALLOWED_MIME_TYPES.contains(&self.mime_type.as_str()) {
            return Err(InvalidUpload::MimeType(self.mime_type.clone()));
        }

        if self.original_name.trim().is_empty()
            || self.original_name.contains('\0')
            || self.original_name.chars().count() > ORIGINAL_NAME_MAX_LEN
        {
            return Err(InvalidUpload::Name);
        }

        let extension = extension(&self.original_name);

        if BLOCKED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(InvalidUpload::Extension(extension));
        }

        if self
            .description
            .as_deref()
            .is_some_and(|description| description.chars().count() > DESCRIPTION_MAX_LEN)
        {
            return Err(InvalidUpload::Description);
        }

        Ok(())
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        u64::try_from(self.bytes.len()).unwrap_or(u64::MAX)
    }
}

/// File row as written on upload.
#[derive(Debug, Clone)]
pub(crate) struct NewFile {
    pub uuid: FileUuid,
    pub user_uuid: UserUuid,
    pub order_uuid: Option<OrderUuid>,
    pub original_name: String,
    pub filename: String,
    pub path: String,
    pub mime_type: String,
    pub size: u64,
    pub hash: String,
    pub kind: FileKind,
    pub metadata: Value,
}

/// Listing filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFilter {
    pub kind: Option<FileKind>,
    pub order_uuid: Option<OrderUuid>,
    pub page: u32,
    pub per_page: u32,
}

impl Default for FileFilter {
    fn default() -> Self {
        Self {
            kind: None,
            order_uuid: None,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl FileFilter {
    #[must_use]
    pub fn limit_offset(&self) -> (i64, i64) {
        let per_page = self.per_page.clamp(1, MAX_PER_PAGE);
        let page = self.page.max(1);

        (
            i64::from(per_page),
            i64::from(page - 1) * i64::from(per_page),
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FilePage {
    pub files: Vec<FileRecord>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

/// File metadata plus its bytes.
#[derive(Debug, Clone)]
pub struct FileDownload {
    pub file: FileRecord,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindUsage {
    pub kind: FileKind,
    pub count: u64,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageUsage {
    pub total_size: u64,
    pub total_files: u64,
    pub type_breakdown: Vec<KindUsage>,
}

impl StorageUsage {
    #[must_use]
    pub fn from_breakdown(type_breakdown: Vec<KindUsage>) -> Self {
        Self {
            total_size: type_breakdown.iter().map(|usage| usage.size).sum(),
            total_files: type_breakdown.iter().map(|usage| usage.count).sum(),
            type_breakdown,
        }
    }
}

/// Lowercased extension after the last dot, or empty.
#[must_use]
pub fn extension(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Lowercase ASCII slug with runs of anything else collapsed into `-`.
#[must_use]
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());

    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// `{slug(stem)}_{8 random alphanumerics}.{ext}`.
#[must_use]
pub fn stored_filename(original_name: &str) -> String {
    let stem = original_name
        .rsplit_once('.')
        .map_or(original_name, |(stem, _)| stem);

    let mut slug = slugify(stem);

    if slug.is_empty() {
        slug.push_str("file");
    }

    let suffix: String = OsRng
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(char::from)
        .collect();

    match extension(original_name).as_str() {
        "" => format!("{slug}_{suffix}"),
        ext => format!("{slug}_{suffix}.{ext}"),
    }
}

/// `uploads/{kind}/{YYYY}/{MM}/{user}/{filename}`, dated in UTC.
#[must_use]
pub fn storage_path(kind: FileKind, now: Timestamp, user: UserUuid, filename: &str) -> String {
    format!(
        "uploads/{kind}/{}/{user}/{filename}",
        now.strftime("%Y/%m")
    )
}

/// Hex SHA-256 of the content.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use testresult::TestResult;

    use super::*;

    fn upload(name: &str, mime_type: &str, bytes: &[u8]) -> FileUpload {
        FileUpload {
            original_name: name.to_string(),
            mime_type: mime_type.to_string(),
            kind: FileKind::Manuscript,
            order_uuid: None,
            description: None,
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn accepts_plain_documents() {
        assert_eq!(upload("draft.txt", "text/plain", b"hello").validate(), Ok(()));
    }

    #[test]
    fn rejects_empty_and_disallowed_uploads() {
        assert_eq!(
            upload("draft.txt", "text/plain", b"").validate(),
            Err(InvalidUpload::Empty)
        );
        assert_eq!(
            upload("a.html", "text/html", b"x").validate(),
            Err(InvalidUpload::MimeType("text/html".to_string()))
        );
        assert_eq!(
            upload("run.JS", "text/plain", b"x").validate(),
            Err(InvalidUpload::Extension("js".to_string()))
        );
        assert_eq!(
            upload("bad\0name.txt", "text/plain", b"x").validate(),
            Err(InvalidUpload::Name)
        );
        assert_eq!(
            upload(&"n".repeat(256), "text/plain", b"x").validate(),
            Err(InvalidUpload::Name)
        );
    }

    #[test]
    fn rejects_oversized_uploads() {
        let size = usize::try_from(MAX_FILE_SIZE + 1).unwrap_or(usize::MAX);
        let big = upload("big.zip", "application/zip", &vec![0; size]);

        assert_eq!(big.validate(), Err(InvalidUpload::TooLarge(MAX_FILE_SIZE + 1)));
    }

    #[test]
    fn slugs_collapse_punctuation() {
        assert_eq!(slugify("My Novel: Draft #2 "), "my-novel-draft-2");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn stored_filenames_keep_extension() {
        let name = stored_filename("Chapter One.DOCX");
        let (stem, ext) = name.rsplit_once('.').unwrap_or_default();
        let (slug, suffix) = stem.rsplit_once('_').unwrap_or_default();

        assert_eq!(ext, "docx");
        assert_eq!(slug, "chapter-one");
        assert_eq!(suffix.len(), RANDOM_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));

        assert!(stored_filename("???").starts_with("file_"));
    }

    #[test]
    fn paths_are_dated_per_user() -> TestResult {
        let now = Timestamp::from_str("2026-03-09T12:00:00Z")?;
        let user = UserUuid::new();

        assert_eq!(
            storage_path(FileKind::Cover, now, user, "cover_abc.png"),
            format!("uploads/cover/2026/03/{user}/cover_abc.png")
        );

        Ok(())
    }

    #[test]
    fn hashes_are_sha256_hex() {
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn usage_totals_sum_the_breakdown() {
        let usage = StorageUsage::from_breakdown(vec![
            KindUsage {
                kind: FileKind::Document,
                count: 2,
                size: 300,
            },
            KindUsage {
                kind: FileKind::Image,
                count: 1,
                size: 50,
            },
        ]);

        assert_eq!(usage.total_files, 3);
        assert_eq!(usage.total_size, 350);
    }
}

//! File Records

use std::{fmt, str::FromStr};

use folio::pricing::UnknownVariant;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    auth::{Actor, UserUuid},
    domain::orders::records::OrderUuid,
    uuids::TypedUuid,
};

/// File UUID
pub type FileUuid = TypedUuid<FileRecord>;

/// What an uploaded file is for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    #[default]
    Document,
    Image,
    Archive,
    Manuscript,
    Cover,
    Illustration,
}

impl FileKind {
    pub const ALL: [Self; 6] = [
        Self::Document,
        Self::Image,
        Self::Archive,
        Self::Manuscript,
        Self::Cover,
        Self::Illustration,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Image => "image",
            Self::Archive => "archive",
            Self::Manuscript => "manuscript",
            Self::Cover => "cover",
            Self::Illustration => "illustration",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownVariant(value.to_string()))
    }
}

/// Stored file metadata. The blob path never leaves the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    pub uuid: FileUuid,
    pub user_uuid: UserUuid,
    pub order_uuid: Option<OrderUuid>,
    pub original_name: String,
    pub filename: String,

    #[serde(skip)]
    pub path: String,

    pub mime_type: String,
    pub size: u64,
    pub hash: String,
    pub kind: FileKind,
    pub is_processed: bool,
    pub is_public: bool,
    pub metadata: Value,

    /// Editor assigned to the linked order.
    #[serde(skip)]
    pub order_editor_uuid: Option<UserUuid>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FileRecord {
    /// Anyone for public files, signed in or not. Otherwise the owner, an
    /// admin, or the linked order's editor.
    #[must_use]
    pub fn is_readable_by(&self, reader: Option<&Actor>) -> bool {
        if self.is_public {
            return true;
        }

        reader.is_some_and(|actor| {
            self.user_uuid == actor.user
                || actor.is_admin()
                || (actor.is_editor() && self.order_editor_uuid == Some(actor.user))
        })
    }

    /// Owner or admin: may delete the file or change its visibility.
    #[must_use]
    pub fn is_managed_by(&self, actor: &Actor) -> bool {
        self.user_uuid == actor.user || actor.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::auth::Role;

    use super::*;

    fn file(owner: UserUuid) -> FileRecord {
        FileRecord {
            uuid: FileUuid::new(),
            user_uuid: owner,
            order_uuid: None,
            original_name: "chapter-1.docx".to_string(),
            filename: "chapter-1_ab12cd34.docx".to_string(),
            path: "uploads/manuscript/2026/03/x/chapter-1_ab12cd34.docx".to_string(),
            mime_type: "text/plain".to_string(),
            size: 10,
            hash: String::new(),
            kind: FileKind::Manuscript,
            is_processed: false,
            is_public: false,
            metadata: json!({}),
            order_editor_uuid: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn actor(role: Role) -> Actor {
        Actor {
            user: UserUuid::new(),
            role,
        }
    }

    #[test]
    fn editors_read_files_of_their_orders_only() {
        let editor = actor(Role::Editor);
        let mut record = file(UserUuid::new());

        assert!(!record.is_readable_by(Some(&editor)));

        record.order_editor_uuid = Some(editor.user);

        assert!(record.is_readable_by(Some(&editor)));
        assert!(!record.is_managed_by(&editor));
    }

    #[test]
    fn public_files_are_readable_but_not_managed() {
        let stranger = actor(Role::Customer);
        let record = FileRecord {
            is_public: true,
            ..file(UserUuid::new())
        };

        assert!(record.is_readable_by(Some(&stranger)));
        assert!(!record.is_managed_by(&stranger));
    }

    #[test]
    fn anonymous_readers_see_public_files_only() {
        let mut record = file(UserUuid::new());

        assert!(!record.is_readable_by(None));

        record.is_public = true;

        assert!(record.is_readable_by(None));
    }

    #[test]
    fn path_is_not_serialized() -> Result<(), serde_json::Error> {
        let value = serde_json::to_value(file(UserUuid::new()))?;

        assert!(value.get("path").is_none());
        assert_eq!(value.get("kind"), Some(&json!("manuscript")));

        Ok(())
    }
}

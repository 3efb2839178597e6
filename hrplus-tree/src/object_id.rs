use crate::hr_tree::{HRTreeError, HRTreeResult};
use std::fmt::{Debug, Display};
use uuid::Uuid;

/// An opaque 16-byte identifier for features and versions.
///
/// The index never interprets an `ObjectId`. It only stores, compares and
/// hashes it. The surrounding store derives ids from content hashes; callers
/// that have no such hash can use [`ObjectId::for_name`] for a deterministic
/// id or [`ObjectId::random`] for a fresh one.
///
/// # Examples
///
/// ```rust
/// use hrplus_tree::ObjectId;
///
/// let v1 = ObjectId::for_name("commit-1");
/// assert_eq!(v1, ObjectId::for_name("commit-1"));
/// assert_ne!(v1, ObjectId::for_name("commit-2"));
/// assert!(ObjectId::NULL.is_null());
/// ```
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy, serde::Deserialize, serde::Serialize)]
pub struct ObjectId {
    uuid: Uuid,
}

impl ObjectId {
    /// The all-zero id. Stored as the feature id of entries inserted without one.
    pub const NULL: ObjectId = ObjectId { uuid: Uuid::nil() };

    /// Generates a new random id.
    pub fn random() -> Self {
        ObjectId {
            uuid: Uuid::new_v4(),
        }
    }

    /// Derives a stable id from a name. The same name always yields the same id.
    pub fn for_name(name: &str) -> Self {
        ObjectId {
            uuid: Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()),
        }
    }

    /// Wraps 16 raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        ObjectId {
            uuid: Uuid::from_bytes(bytes),
        }
    }

    /// Parses the hyphenated or simple hex form produced by `Display`.
    ///
    /// # Errors
    ///
    /// Returns [`HRTreeError::InvalidArgument`] if `text` is not a valid id.
    pub fn parse_str(text: &str) -> HRTreeResult<Self> {
        match Uuid::parse_str(text) {
            Ok(uuid) => Ok(ObjectId { uuid }),
            Err(err) => {
                log::error!("Invalid object id {:?}: {}", text, err);
                Err(HRTreeError::InvalidArgument(format!(
                    "invalid object id '{}': {}",
                    text, err
                )))
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.uuid.as_bytes()
    }

    pub fn is_null(&self) -> bool {
        self.uuid.is_nil()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        ObjectId::NULL
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uuid.hyphenated())
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // short form, like an abbreviated commit hash
        let simple = self.uuid.simple().to_string();
        write!(f, "ObjectId({})", &simple[..8])
    }
}

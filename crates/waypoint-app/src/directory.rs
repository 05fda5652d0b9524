//! User directory.
//!
//! An ordered, read-only list of users loaded once at startup. Ids are
//! 1-based and equal to the record's position, so lookup by id is lookup
//! by index.

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// A user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// 1-based id, equal to the record's position.
    pub id: u32,
    /// Display name.
    pub name: String,
}

impl UserRecord {
    /// Create a record.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Directory validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("user at position {position} has id {id}")]
    IdMismatch { position: usize, id: u32 },

    #[error("user {0} has an empty name")]
    EmptyName(u32),
}

/// The user directory. Cheap to clone.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    users: Arc<[UserRecord]>,
}

impl UserDirectory {
    /// Build a directory, checking that ids match positions.
    ///
    /// # Errors
    ///
    /// Returns an error if an id does not equal its 1-based position or a
    /// name is empty.
    pub fn new(users: Vec<UserRecord>) -> Result<Self, DirectoryError> {
        for (i, user) in users.iter().enumerate() {
            let position = i + 1;
            if usize::try_from(user.id).map_or(true, |id| id != position) {
                return Err(DirectoryError::IdMismatch {
                    position,
                    id: user.id,
                });
            }
            if user.name.trim().is_empty() {
                return Err(DirectoryError::EmptyName(user.id));
            }
        }
        Ok(Self {
            users: users.into(),
        })
    }

    /// Look up a user by the raw `userId` parameter.
    ///
    /// Only canonical decimal ids match: no sign, padding or leading zeros.
    /// Anything else, zero, and out-of-range ids yield `None`.
    #[must_use]
    pub fn lookup(&self, raw_id: &str) -> Option<&UserRecord> {
        if raw_id.starts_with('0') || !raw_id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let position: usize = raw_id.parse().ok()?;
        let user = self.users.get(position.checked_sub(1)?);
        debug!(user_id = raw_id, found = user.is_some(), "User lookup");
        user
    }

    /// All users, in order.
    #[must_use]
    pub fn users(&self) -> &[UserRecord] {
        &self.users
    }

    /// Number of users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }
}

/// Where the directory's records come from.
#[async_trait]
pub trait UserSource: Send + Sync {
    /// Produce the ordered list of users.
    async fn load(&self) -> anyhow::Result<Vec<UserRecord>>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// The built-in user list.
#[derive(Debug, Clone)]
pub struct StaticUsers {
    users: Vec<UserRecord>,
}

impl StaticUsers {
    /// A source over the given records.
    #[must_use]
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self { users }
    }
}

impl Default for StaticUsers {
    fn default() -> Self {
        Self::new(vec![
            UserRecord::new(1, "Ada"),
            UserRecord::new(2, "Grace"),
            UserRecord::new(3, "Linus"),
        ])
    }
}

#[async_trait]
impl UserSource for StaticUsers {
    async fn load(&self) -> anyhow::Result<Vec<UserRecord>> {
        Ok(self.users.clone())
    }

    fn describe(&self) -> String {
        "built-in".to_string()
    }
}

/// Users read from a TOML file with `[[users]]` tables.
#[derive(Debug, Clone)]
pub struct TomlUsers {
    path: PathBuf,
}

#[derive(Deserialize)]
struct UsersFile {
    #[serde(default)]
    users: Vec<UserRecord>,
}

impl TomlUsers {
    /// A source reading `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse(contents: &str) -> anyhow::Result<Vec<UserRecord>> {
        let file: UsersFile = toml::from_str(contents)?;
        Ok(file.users)
    }
}

#[async_trait]
impl UserSource for TomlUsers {
    async fn load(&self) -> anyhow::Result<Vec<UserRecord>> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read users file: {}", self.path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse users file: {}", self.path.display()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Load and validate a directory from a source.
///
/// # Errors
///
/// Returns an error if the source fails or its records are invalid.
pub async fn load_directory(source: &dyn UserSource) -> anyhow::Result<UserDirectory> {
    let users = source.load().await?;
    let directory = UserDirectory::new(users)
        .with_context(|| format!("Invalid user directory from {}", source.describe()))?;
    info!(
        source = %source.describe(),
        users = directory.len(),
        "User directory loaded"
    );
    Ok(directory)
}

// ============================
// linkbranch-backend/src/storage.rs
// ============================
//! Storage abstraction with flat-file implementation.
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::{fs as tokio_fs, sync::RwLock};
use uuid::Uuid;

use crate::auth::HashedPassword;
use crate::error::AppError;

const USERS_FILE: &str = "users.json";
const LINKS_FILE: &str = "links.json";

/// Icon stored when a link is added without one
pub const DEFAULT_LINK_ICON: &str = "default-icon";

/// A stored user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub password: HashedPassword,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_pic: String,
    #[serde(default)]
    pub visit_count: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub fullname: String,
    pub username: String,
    pub email: String,
    pub password: HashedPassword,
}

/// Profile fields to overwrite; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub fullname: Option<String>,
    pub bio: Option<String>,
    pub profile_pic: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.fullname.is_none() && self.bio.is_none() && self.profile_pic.is_none()
    }
}

/// A stored link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: Uuid,
    pub user: Uuid,
    pub title: String,
    pub url: String,
    pub icon: String,
    #[serde(default)]
    pub background_image: Option<String>,
    pub order: u32,
    #[serde(default)]
    pub clicks: u64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to create a link
#[derive(Debug, Clone)]
pub struct NewLink {
    pub user: Uuid,
    pub title: String,
    pub url: String,
    pub icon: String,
}

/// Link fields to overwrite; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct LinkUpdate {
    pub title: Option<String>,
    pub url: Option<String>,
    pub background_image: Option<String>,
}

/// Outcome of [`Storage::create_user`]
#[derive(Debug)]
pub enum UserInsert {
    Created(UserRecord),
    /// Username or email already belongs to another account
    Taken,
}

/// Outcome of [`Storage::insert_link`]
#[derive(Debug)]
pub enum LinkInsert {
    Inserted(LinkRecord),
    LimitReached,
    DuplicateUrl,
}

/// Outcome of [`Storage::update_link`]
#[derive(Debug)]
pub enum LinkChange {
    Updated(LinkRecord),
    /// Missing, or owned by somebody else
    NotFound,
    DuplicateUrl,
}

/// Outcome of [`Storage::reorder_links`]
#[derive(Debug, PartialEq, Eq)]
pub enum Reorder {
    Applied,
    /// The ids were not exactly the owner's links
    Mismatch,
}

/// A user together with their links in display order
#[derive(Debug, Clone)]
pub struct ProfileWithLinks {
    pub user: UserRecord,
    pub links: Vec<LinkRecord>,
}

/// Trait for storage backends.
///
/// Every operation that guards an invariant (unique users, the per-user link
/// cap, unique urls, owner-scoped changes) performs its check and its write
/// as a single step.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Insert a user unless the username or email is taken
    async fn create_user(&self, user: NewUser) -> Result<UserInsert, AppError>;

    /// Whether a user with this username or email exists
    async fn user_exists(&self, username: &str, email: &str) -> Result<bool, AppError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError>;

    async fn find_user_by_username(&self, username: &str)
        -> Result<Option<UserRecord>, AppError>;

    /// Look a user up by email (case-insensitive), then by username
    async fn find_user_by_identity(&self, identity: &str)
        -> Result<Option<UserRecord>, AppError>;

    /// Replace the stored refresh token; returns false if the user is gone
    async fn set_refresh_token(&self, id: Uuid, token: Option<String>) -> Result<bool, AppError>;

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<UserRecord>, AppError>;

    /// Increment and return the visit counter of a user
    async fn increment_visit_count(&self, username: &str) -> Result<Option<u64>, AppError>;

    /// Append a link unless the owner is at `cap` links or already has the url
    async fn insert_link(&self, link: NewLink, cap: usize) -> Result<LinkInsert, AppError>;

    /// Update a link owned by `owner`
    async fn update_link(
        &self,
        owner: Uuid,
        id: Uuid,
        update: LinkUpdate,
    ) -> Result<LinkChange, AppError>;

    /// Delete a link owned by `owner`; returns false if nothing was deleted
    async fn delete_link(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError>;

    /// Renumber the owner's links densely in the given order
    async fn reorder_links(&self, owner: Uuid, ids: &[Uuid]) -> Result<Reorder, AppError>;

    /// Read a user and their links, sorted for display, in one step
    async fn load_profile(&self, user_id: Uuid) -> Result<Option<ProfileWithLinks>, AppError>;
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<Uuid, UserRecord>,
    links: BTreeMap<Uuid, LinkRecord>,
}

impl Tables {
    fn user_by_username(&self, username: &str) -> Option<&UserRecord> {
        self.users.values().find(|u| u.username == username)
    }

    /// Usernames and emails share one namespace of login identities
    fn username_or_email_taken(&self, username: &str, email: &str) -> bool {
        let email = email.to_lowercase();
        let username_as_email = username.to_lowercase();
        self.users.values().any(|u| {
            u.username == username
                || u.email == email
                || u.email == username_as_email
                || u.username == email
        })
    }

    fn links_of(&self, owner: Uuid) -> impl Iterator<Item = &LinkRecord> {
        self.links.values().filter(move |l| l.user == owner)
    }

    fn sorted_links_of(&self, owner: Uuid) -> Vec<LinkRecord> {
        let mut links: Vec<LinkRecord> = self.links_of(owner).cloned().collect();
        links.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        links
    }
}

/// Flat-file implementation of the Storage trait.
///
/// Tables live in memory behind one lock. A write builds a modified copy of
/// its table, flushes it to a JSON snapshot under `root` and only then
/// replaces the live table, so a failed flush leaves memory untouched.
#[derive(Clone)]
pub struct FlatFileStorage {
    root: PathBuf,
    tables: Arc<RwLock<Tables>>,
}

impl FlatFileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let users: Vec<UserRecord> = load_snapshot(&root.join(USERS_FILE))?;
        let links: Vec<LinkRecord> = load_snapshot(&root.join(LINKS_FILE))?;
        let tables = Tables {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
            links: links.into_iter().map(|l| (l.id, l)).collect(),
        };

        tracing::info!(
            root = %root.display(),
            users = tables.users.len(),
            links = tables.links.len(),
            "storage opened"
        );

        Ok(Self {
            root,
            tables: Arc::new(RwLock::new(tables)),
        })
    }

    /// Flush a modified copy of the users table, then swap it in
    async fn commit_users(
        &self,
        tables: &mut Tables,
        users: BTreeMap<Uuid, UserRecord>,
    ) -> Result<(), AppError> {
        {
            let rows: Vec<&UserRecord> = users.values().collect();
            write_snapshot(&self.root.join(USERS_FILE), &rows).await?;
        }
        tables.users = users;
        Ok(())
    }

    /// Flush a modified copy of the links table, then swap it in
    async fn commit_links(
        &self,
        tables: &mut Tables,
        links: BTreeMap<Uuid, LinkRecord>,
    ) -> Result<(), AppError> {
        {
            let rows: Vec<&LinkRecord> = links.values().collect();
            write_snapshot(&self.root.join(LINKS_FILE), &rows).await?;
        }
        tables.links = links;
        Ok(())
    }
}

fn load_snapshot<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&content)?)
}

/// Write to a sibling temp file, then rename over the snapshot
async fn write_snapshot<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(rows)?;
    let tmp = path.with_extension("json.tmp");
    tokio_fs::write(&tmp, json).await?;
    tokio_fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl Storage for FlatFileStorage {
    async fn create_user(&self, user: NewUser) -> Result<UserInsert, AppError> {
        let mut tables = self.tables.write().await;
        if tables.username_or_email_taken(&user.username, &user.email) {
            return Ok(UserInsert::Taken);
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            fullname: user.fullname,
            username: user.username,
            email: user.email.to_lowercase(),
            password: user.password,
            bio: String::new(),
            profile_pic: String::new(),
            visit_count: 0,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        let mut users = tables.users.clone();
        users.insert(record.id, record.clone());
        self.commit_users(&mut tables, users).await?;

        Ok(UserInsert::Created(record))
    }

    async fn user_exists(&self, username: &str, email: &str) -> Result<bool, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.username_or_email_taken(username, email))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.user_by_username(username).cloned())
    }

    async fn find_user_by_identity(
        &self,
        identity: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let email = identity.to_lowercase();
        let tables = self.tables.read().await;
        let by_email = tables.users.values().find(|u| u.email == email);
        Ok(by_email
            .or_else(|| tables.user_by_username(identity))
            .cloned())
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<String>) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let mut users = tables.users.clone();
        let Some(user) = users.get_mut(&id) else {
            return Ok(false);
        };
        user.refresh_token = token;
        user.updated_at = Utc::now();

        self.commit_users(&mut tables, users).await?;
        Ok(true)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> Result<Option<UserRecord>, AppError> {
        let mut tables = self.tables.write().await;
        let mut users = tables.users.clone();
        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(fullname) = update.fullname {
            user.fullname = fullname;
        }
        if let Some(bio) = update.bio {
            user.bio = bio;
        }
        if let Some(profile_pic) = update.profile_pic {
            user.profile_pic = profile_pic;
        }
        user.updated_at = Utc::now();
        let updated = user.clone();

        self.commit_users(&mut tables, users).await?;
        Ok(Some(updated))
    }

    async fn increment_visit_count(&self, username: &str) -> Result<Option<u64>, AppError> {
        let mut tables = self.tables.write().await;
        let mut users = tables.users.clone();
        let Some(user) = users.values_mut().find(|u| u.username == username) else {
            return Ok(None);
        };
        user.visit_count += 1;
        let count = user.visit_count;

        self.commit_users(&mut tables, users).await?;
        Ok(Some(count))
    }

    async fn insert_link(&self, link: NewLink, cap: usize) -> Result<LinkInsert, AppError> {
        let mut tables = self.tables.write().await;

        let count = tables.links_of(link.user).count();
        if count >= cap {
            return Ok(LinkInsert::LimitReached);
        }
        if tables.links_of(link.user).any(|l| l.url == link.url) {
            return Ok(LinkInsert::DuplicateUrl);
        }

        let now = Utc::now();
        let record = LinkRecord {
            id: Uuid::new_v4(),
            user: link.user,
            title: link.title,
            url: link.url,
            icon: link.icon,
            background_image: None,
            order: u32::try_from(count).unwrap_or(u32::MAX),
            clicks: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let mut links = tables.links.clone();
        links.insert(record.id, record.clone());
        self.commit_links(&mut tables, links).await?;

        Ok(LinkInsert::Inserted(record))
    }

    async fn update_link(
        &self,
        owner: Uuid,
        id: Uuid,
        update: LinkUpdate,
    ) -> Result<LinkChange, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.links.get(&id).is_some_and(|l| l.user == owner) {
            return Ok(LinkChange::NotFound);
        }
        if let Some(url) = &update.url {
            if tables.links_of(owner).any(|l| l.id != id && &l.url == url) {
                return Ok(LinkChange::DuplicateUrl);
            }
        }

        let mut links = tables.links.clone();
        let Some(link) = links.get_mut(&id) else {
            return Ok(LinkChange::NotFound);
        };
        if let Some(title) = update.title {
            link.title = title;
        }
        if let Some(url) = update.url {
            link.url = url;
        }
        if let Some(background_image) = update.background_image {
            link.background_image = Some(background_image);
        }
        link.updated_at = Utc::now();
        let updated = link.clone();

        self.commit_links(&mut tables, links).await?;
        Ok(LinkChange::Updated(updated))
    }

    async fn delete_link(&self, owner: Uuid, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.links.get(&id).is_some_and(|l| l.user == owner) {
            return Ok(false);
        }
        let mut links = tables.links.clone();
        links.remove(&id);
        self.commit_links(&mut tables, links).await?;
        Ok(true)
    }

    async fn reorder_links(&self, owner: Uuid, ids: &[Uuid]) -> Result<Reorder, AppError> {
        let mut tables = self.tables.write().await;

        let owned: HashSet<Uuid> = tables.links_of(owner).map(|l| l.id).collect();
        let requested: HashSet<Uuid> = ids.iter().copied().collect();
        if requested.len() != ids.len() || requested != owned {
            return Ok(Reorder::Mismatch);
        }

        let now = Utc::now();
        let mut links = tables.links.clone();
        for (position, id) in ids.iter().enumerate() {
            if let Some(link) = links.get_mut(id) {
                link.order = u32::try_from(position).unwrap_or(u32::MAX);
                link.updated_at = now;
            }
        }

        self.commit_links(&mut tables, links).await?;
        Ok(Reorder::Applied)
    }

    async fn load_profile(&self, user_id: Uuid) -> Result<Option<ProfileWithLinks>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&user_id).map(|user| ProfileWithLinks {
            user: user.clone(),
            links: tables.sorted_links_of(user_id),
        }))
    }
}

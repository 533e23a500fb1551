// ============================
// linkbranch-backend/src/profile.rs
// ============================
//! Profile reads and updates.
use linkbranch_common::{LinkView, OwnProfile, PublicProfile, UserLinks};
use uuid::Uuid;

use crate::blob::{BlobStore, Upload};
use crate::error::{AppError, AppResult};
use crate::storage::{LinkRecord, ProfileUpdate, ProfileWithLinks, Storage, UserRecord};

pub(crate) const USER_NOT_FOUND: &str = "User not found";

impl From<&UserRecord> for PublicProfile {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            fullname: user.fullname.clone(),
            username: user.username.clone(),
            profile_pic: user.profile_pic.clone(),
            bio: user.bio.clone(),
        }
    }
}

impl From<&LinkRecord> for LinkView {
    fn from(link: &LinkRecord) -> Self {
        Self {
            id: link.id,
            user: link.user,
            title: link.title.clone(),
            url: link.url.clone(),
            icon: link.icon.clone(),
            background_image: link.background_image.clone(),
            order: link.order,
            clicks: link.clicks,
            is_active: link.is_active,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// The owner's view of a user, optionally with their links embedded
pub fn own_profile(user: &UserRecord, links: Option<&[LinkRecord]>) -> OwnProfile {
    OwnProfile {
        id: user.id,
        fullname: user.fullname.clone(),
        username: user.username.clone(),
        email: user.email.clone(),
        bio: user.bio.clone(),
        profile_pic: user.profile_pic.clone(),
        visit_count: user.visit_count,
        links: links.map(|links| links.iter().map(LinkView::from).collect()),
    }
}

impl From<&ProfileWithLinks> for UserLinks {
    fn from(profile: &ProfileWithLinks) -> Self {
        Self {
            user_details: PublicProfile::from(&profile.user),
            links: profile.links.iter().map(LinkView::from).collect(),
        }
    }
}

async fn load<S: Storage>(storage: &S, user_id: Uuid) -> AppResult<ProfileWithLinks> {
    storage
        .load_profile(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))
}

/// The caller's profile with links
pub async fn load_own_profile<S: Storage>(storage: &S, user_id: Uuid) -> AppResult<OwnProfile> {
    let profile = load(storage, user_id).await?;
    Ok(own_profile(&profile.user, Some(&profile.links)))
}

/// The caller's public details and links
pub async fn load_user_links<S: Storage>(storage: &S, user_id: Uuid) -> AppResult<UserLinks> {
    Ok(UserLinks::from(&load(storage, user_id).await?))
}

/// The public details and links of any user, by username
pub async fn load_public_links<S: Storage>(storage: &S, username: &str) -> AppResult<UserLinks> {
    let user = storage
        .find_user_by_username(username)
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))?;
    load_user_links(storage, user.id).await
}

/// Profile fields submitted by the owner
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub fullname: Option<String>,
    pub bio: Option<String>,
    pub profile_pic: Option<Upload>,
}

/// Apply a profile form; a new avatar replaces and deletes the old one
pub async fn update_profile<S: Storage>(
    storage: &S,
    blobs: &dyn BlobStore,
    user: &UserRecord,
    form: ProfileForm,
) -> AppResult<OwnProfile> {
    let mut update = ProfileUpdate {
        fullname: form
            .fullname
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()),
        bio: form.bio.filter(|bio| !bio.trim().is_empty()),
        profile_pic: None,
    };

    if let Some(upload) = form.profile_pic {
        let stored = blobs
            .upload(upload)
            .await
            .ok_or_else(|| AppError::BadRequest("Couldn't upload image".to_string()))?;
        update.profile_pic = Some(stored.url);
    }

    if update.is_empty() {
        return Err(AppError::BadRequest(
            "No valid fields provided for update".to_string(),
        ));
    }

    let new_pic = update.profile_pic.clone();
    let replaced_pic = new_pic.as_ref().map(|_| user.profile_pic.clone());
    let updated = match storage.update_profile(user.id, update).await {
        Ok(Some(updated)) => updated,
        outcome => {
            // The upload is unreferenced unless the record was written
            if let Some(url) = &new_pic {
                blobs.delete(url).await;
            }
            return Err(match outcome {
                Err(err) => err,
                _ => AppError::NotFound(USER_NOT_FOUND.to_string()),
            });
        },
    };

    if let Some(old) = replaced_pic.filter(|old| !old.is_empty()) {
        blobs.delete(&old).await;
    }

    tracing::info!(user_id = %updated.id, "profile updated");
    Ok(own_profile(&updated, None))
}

/// Store a new avatar for the user and return its URL
pub async fn replace_avatar<S: Storage>(
    storage: &S,
    blobs: &dyn BlobStore,
    user: &UserRecord,
    upload: Upload,
) -> AppResult<String> {
    let form = ProfileForm {
        profile_pic: Some(upload),
        ..ProfileForm::default()
    };
    let profile = update_profile(storage, blobs, user, form).await?;
    Ok(profile.profile_pic)
}

// ============================
// linkbranch-backend/src/links.rs
// ============================
//! Link collection management.
//!
//! Each user owns at most [`MAX_LINKS_PER_USER`] links, never two with the
//! same url. New links are appended with `order` equal to the number of links
//! the owner already had; deletions leave gaps until the owner reorders.
use linkbranch_common::{
    AddLinkRequest, LinkView, OwnProfile, ReorderLinksRequest, UpdateLinkRequest,
    MAX_LINKS_PER_USER,
};
use metrics::counter;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::profile::{load_own_profile, USER_NOT_FOUND};
use crate::storage::{
    LinkChange, LinkInsert, LinkUpdate, NewLink, Reorder, Storage, DEFAULT_LINK_ICON,
};
use crate::telemetry::{LINK_ADDED, LINK_DELETED, PROFILE_VISIT};
use crate::validation::is_valid_link_url;

const LINK_NOT_FOUND: &str = "Link not found or unauthorized";
const DUPLICATE_LINK: &str = "Link already exists for this platform and URL";
const INVALID_URL: &str = "Invalid URL format";

/// Parse a link id taken from the request path
pub fn parse_link_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid link ID".to_string()))
}

/// Add a link for `owner` and return the owner's refreshed profile
pub async fn add_link<S: Storage>(
    storage: &S,
    owner: Uuid,
    req: AddLinkRequest,
) -> AppResult<OwnProfile> {
    let title = req.platform.trim().to_string();
    let url = req.url.trim().to_string();

    if title.is_empty() || url.is_empty() {
        return Err(AppError::BadRequest(
            "Platform and URL cannot be empty".to_string(),
        ));
    }
    if !is_valid_link_url(&url) {
        return Err(AppError::BadRequest(INVALID_URL.to_string()));
    }

    let icon = req
        .icon
        .map(|icon| icon.trim().to_string())
        .filter(|icon| !icon.is_empty())
        .unwrap_or_else(|| DEFAULT_LINK_ICON.to_string());

    let link = NewLink {
        user: owner,
        title,
        url,
        icon,
    };
    match storage.insert_link(link, MAX_LINKS_PER_USER).await? {
        LinkInsert::Inserted(link) => {
            counter!(LINK_ADDED).increment(1);
            tracing::info!(user_id = %owner, link_id = %link.id, order = link.order, "link added");
        },
        LinkInsert::LimitReached => {
            return Err(AppError::BadRequest(format!(
                "You can only add up to {MAX_LINKS_PER_USER} links"
            )));
        },
        LinkInsert::DuplicateUrl => return Err(AppError::Conflict(DUPLICATE_LINK.to_string())),
    }

    load_own_profile(storage, owner).await
}

/// Update the title, url or background image of a link owned by `owner`
pub async fn update_link<S: Storage>(
    storage: &S,
    owner: Uuid,
    link_id: Uuid,
    req: UpdateLinkRequest,
) -> AppResult<LinkView> {
    let title = match req.title {
        Some(title) if title.trim().is_empty() => {
            return Err(AppError::BadRequest("Title cannot be empty".to_string()));
        },
        other => other.map(|t| t.trim().to_string()),
    };
    let url = match req.url.map(|u| u.trim().to_string()) {
        Some(url) if !is_valid_link_url(&url) => {
            return Err(AppError::BadRequest(INVALID_URL.to_string()));
        },
        other => other,
    };

    let update = LinkUpdate {
        title,
        url,
        background_image: req.background_image,
    };
    match storage.update_link(owner, link_id, update).await? {
        LinkChange::Updated(link) => {
            tracing::info!(user_id = %owner, link_id = %link.id, "link updated");
            Ok(LinkView::from(&link))
        },
        LinkChange::NotFound => Err(AppError::NotFound(LINK_NOT_FOUND.to_string())),
        LinkChange::DuplicateUrl => Err(AppError::Conflict(DUPLICATE_LINK.to_string())),
    }
}

/// Delete a link owned by `owner` and return the owner's refreshed profile
pub async fn delete_link<S: Storage>(
    storage: &S,
    owner: Uuid,
    link_id: Uuid,
) -> AppResult<OwnProfile> {
    if !storage.delete_link(owner, link_id).await? {
        return Err(AppError::NotFound(LINK_NOT_FOUND.to_string()));
    }

    counter!(LINK_DELETED).increment(1);
    tracing::info!(user_id = %owner, link_id = %link_id, "link deleted");

    load_own_profile(storage, owner).await
}

/// Renumber all of the owner's links in the requested order
pub async fn reorder_links<S: Storage>(
    storage: &S,
    owner: Uuid,
    req: ReorderLinksRequest,
) -> AppResult<OwnProfile> {
    let ids = req
        .link_ids
        .iter()
        .map(|raw| parse_link_id(raw))
        .collect::<AppResult<Vec<Uuid>>>()?;

    match storage.reorder_links(owner, &ids).await? {
        Reorder::Applied => {
            tracing::info!(user_id = %owner, count = ids.len(), "links reordered");
            load_own_profile(storage, owner).await
        },
        Reorder::Mismatch => Err(AppError::BadRequest(
            "Link order must list each of your links exactly once".to_string(),
        )),
    }
}

/// Count a visit to a public profile
pub async fn record_visit<S: Storage>(storage: &S, username: &str) -> AppResult<u64> {
    let count = storage
        .increment_visit_count(username)
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))?;

    counter!(PROFILE_VISIT).increment(1);
    tracing::debug!(username, visit_count = count, "profile visit");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialHasher;
    use crate::storage::{FlatFileStorage, NewUser, UserInsert};
    use tempfile::TempDir;

    async fn setup(dir: &TempDir) -> (FlatFileStorage, Uuid) {
        let storage = FlatFileStorage::new(dir.path()).unwrap();
        let user = match storage
            .create_user(NewUser {
                fullname: "Ada".to_string(),
                username: "ada".to_string(),
                email: "ada@example.com".to_string(),
                password: CredentialHasher::new(4).unwrap().hash_password("pass").unwrap(),
            })
            .await
            .unwrap()
        {
            UserInsert::Created(user) => user,
            UserInsert::Taken => unreachable!(),
        };
        (storage, user.id)
    }

    fn add_req(platform: &str, url: &str) -> AddLinkRequest {
        AddLinkRequest {
            platform: platform.to_string(),
            url: url.to_string(),
            icon: None,
        }
    }

    fn links_of(profile: &OwnProfile) -> &[LinkView] {
        profile.links.as_deref().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_add_link_validates_input() {
        let dir = TempDir::new().unwrap();
        let (storage, owner) = setup(&dir).await;

        for req in [add_req("", "https://x.com"), add_req("GitHub", "  ")] {
            let err = add_link(&storage, owner, req).await.unwrap_err();
            assert_eq!(err.to_string(), "Platform and URL cannot be empty");
        }
        let err = add_link(&storage, owner, add_req("GitHub", "not-a-url")).await.unwrap_err();
        assert_eq!(err.to_string(), INVALID_URL);
    }

    #[tokio::test]
    async fn test_add_link_defaults_icon_and_appends() {
        let dir = TempDir::new().unwrap();
        let (storage, owner) = setup(&dir).await;

        add_link(&storage, owner, add_req("GitHub", "https://github.com/ada")).await.unwrap();
        let profile = add_link(&storage, owner, add_req("Blog", "https://ada.dev"))
            .await
            .unwrap();

        let links = links_of(&profile);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].icon, DEFAULT_LINK_ICON);
        assert_eq!(links[0].title, "GitHub");
        assert_eq!(links[1].order, 1);
    }

    #[tokio::test]
    async fn test_seventh_link_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (storage, owner) = setup(&dir).await;

        for i in 0..MAX_LINKS_PER_USER {
            add_link(&storage, owner, add_req("Site", &format!("https://{i}.example.com")))
                .await
                .unwrap();
        }
        let err = add_link(&storage, owner, add_req("Site", "https://7.example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "You can only add up to 6 links");
    }

    #[tokio::test]
    async fn test_update_link_checks_fields() {
        let dir = TempDir::new().unwrap();
        let (storage, owner) = setup(&dir).await;
        let profile = add_link(&storage, owner, add_req("GitHub", "https://github.com/ada"))
            .await
            .unwrap();
        let link_id = links_of(&profile)[0].id;

        let blank = UpdateLinkRequest {
            title: Some(" ".to_string()),
            ..UpdateLinkRequest::default()
        };
        assert!(matches!(
            update_link(&storage, owner, link_id, blank).await,
            Err(AppError::BadRequest(_))
        ));

        let bad_url = UpdateLinkRequest {
            url: Some("ftp:/nowhere".to_string()),
            ..UpdateLinkRequest::default()
        };
        assert!(matches!(
            update_link(&storage, owner, link_id, bad_url).await,
            Err(AppError::BadRequest(_))
        ));

        let rename = UpdateLinkRequest {
            title: Some("Code".to_string()),
            background_image: Some("https://img.example.com/bg.png".to_string()),
            ..UpdateLinkRequest::default()
        };
        let updated = update_link(&storage, owner, link_id, rename).await.unwrap();
        assert_eq!(updated.title, "Code");
        assert_eq!(updated.url, "https://github.com/ada");
        assert!(updated.background_image.is_some());

        let missing = update_link(&storage, owner, Uuid::new_v4(), UpdateLinkRequest::default())
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reorder_rejects_bad_ids() {
        let dir = TempDir::new().unwrap();
        let (storage, owner) = setup(&dir).await;
        add_link(&storage, owner, add_req("GitHub", "https://github.com/ada")).await.unwrap();

        let req = ReorderLinksRequest {
            link_ids: vec!["not-a-uuid".to_string()],
        };
        let err = reorder_links(&storage, owner, req).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid link ID");

        let req = ReorderLinksRequest { link_ids: vec![] };
        assert!(matches!(
            reorder_links(&storage, owner, req).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_record_visit() {
        let dir = TempDir::new().unwrap();
        let (storage, _) = setup(&dir).await;

        assert_eq!(record_visit(&storage, "ada").await.unwrap(), 1);
        assert_eq!(record_visit(&storage, "ada").await.unwrap(), 2);
        assert!(matches!(
            record_visit(&storage, "nobody").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_parse_link_id() {
        assert!(parse_link_id(&Uuid::new_v4().to_string()).is_ok());
        assert!(matches!(parse_link_id("123"), Err(AppError::BadRequest(_))));
    }
}

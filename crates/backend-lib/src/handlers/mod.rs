// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP handlers and the extractors they share.
pub mod auth;
pub mod links;
pub mod user;

use axum::extract::{FromRequest, Multipart, Request};

use crate::blob::Upload;
use crate::error::AppError;
use crate::profile::ProfileForm;

/// JSON body whose rejections use the API error envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Multipart profile form with `fullname`, `bio` and `profilePic` parts
#[derive(Debug)]
pub struct ProfileMultipart(pub ProfileForm);

impl<S: Send + Sync> FromRequest<S> for ProfileMultipart {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state).await?;
        let mut form = ProfileForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "fullname" => form.fullname = non_blank(field.text().await?),
                "bio" => form.bio = non_blank(field.text().await?),
                "profilePic" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    if !(file_name.is_empty() && bytes.is_empty()) {
                        form.profile_pic = Some(Upload { file_name, bytes });
                    }
                },
                _ => {},
            }
        }

        Ok(Self(form))
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

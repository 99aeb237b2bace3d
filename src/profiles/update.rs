use std::{path::Path, sync::Arc};

use axum::{
    body::Bytes,
    debug_handler,
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{
    auth::register::{check_email, check_username},
    db::{ProfileUpdate, User, UserRepository},
    include_res,
    res::{self, escape, fill},
    session::{self, LoggedIn},
    AppResult, AppState, Config,
};

pub(crate) const AVATAR_DIR: &str = "avatars";

/// Largest accepted `/update-user/` request body, avatar included.
pub(crate) const UPLOAD_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Debug, Default)]
struct ProfileForm {
    name: String,
    username: String,
    email: String,
    bio: String,
    avatar: Option<Upload>,
}

#[derive(Debug)]
struct Upload {
    content_type: Option<String>,
    file_name: Option<String>,
    data: Bytes,
}

impl ProfileForm {
    fn from_user(user: &User) -> Self {
        ProfileForm {
            name: user.name.clone().unwrap_or_default(),
            username: user.username.clone(),
            email: user.email.clone(),
            bio: user.bio.clone().unwrap_or_default(),
            avatar: None,
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut form = ProfileForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match name.as_str() {
                "avatar" => {
                    let content_type = field.content_type().map(str::to_owned);
                    let file_name = field.file_name().map(str::to_owned);
                    let data = field.bytes().await?;
                    // browsers send an empty part when no file was picked
                    if !data.is_empty() {
                        form.avatar = Some(Upload { content_type, file_name, data });
                    }
                }
                "name" => form.name = field.text().await?,
                "username" => form.username = field.text().await?,
                "email" => form.email = field.text().await?,
                "bio" => form.bio = field.text().await?,
                _ => {}
            }
        }

        Ok(form)
    }
}

impl Upload {
    /// File extension for an accepted image type.
    fn extension(&self) -> Option<&'static str> {
        let by_type = match self.content_type.as_deref() {
            Some("image/png") => Some("png"),
            Some("image/jpeg") => Some("jpg"),
            Some("image/gif") => Some("gif"),
            Some("image/webp") => Some("webp"),
            _ => None,
        };
        by_type.or_else(|| {
            let name = self.file_name.as_deref()?;
            let (_, ext) = name.rsplit_once('.')?;
            match ext.to_ascii_lowercase().as_str() {
                "png" => Some("png"),
                "jpg" | "jpeg" => Some("jpg"),
                "gif" => Some("gif"),
                "webp" => Some("webp"),
                _ => None,
            }
        })
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_user_page(LoggedIn { session, user }: LoggedIn) -> AppResult<Response> {
    render(&session, &user, &ProfileForm::from_user(&user)).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_user(
    State(db_pool): State<SqlitePool>,
    State(config): State<Arc<Config>>,
    LoggedIn { session, user }: LoggedIn,
    multipart: Multipart,
) -> AppResult<Response> {
    let form = match ProfileForm::from_multipart(multipart).await {
        Ok(form) => form,
        Err(err) => {
            tracing::debug!("@{} sent an unreadable profile form: {err}", user.username);
            let message = if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
                format!("That image is too large. Uploads are limited to {} MB.", UPLOAD_LIMIT / (1024 * 1024))
            } else {
                "The form could not be read. Please try again.".to_owned()
            };
            session::flash(&session, message).await?;
            return render(&session, &user, &ProfileForm::from_user(&user)).await;
        }
    };

    let mut errors = Vec::new();
    if let Some(error) = check_username(&form.username) {
        errors.push(error);
    } else if UserRepository::username_taken(&db_pool, form.username.trim(), Some(&user.id)).await? {
        errors.push("A user with that username already exists.".to_owned());
    }
    if let Some(error) = check_email(&form.email) {
        errors.push(error);
    } else if UserRepository::email_taken(&db_pool, form.email.trim(), Some(&user.id)).await? {
        errors.push("A user with that email already exists.".to_owned());
    }
    let extension = match &form.avatar {
        Some(upload) => match upload.extension() {
            Some(extension) => Some(extension),
            None => {
                errors.push("Upload a valid image (png, jpeg, gif or webp).".to_owned());
                None
            }
        },
        None => None,
    };

    if !errors.is_empty() {
        for error in errors {
            session::flash(&session, error).await?;
        }
        return render(&session, &user, &form).await;
    }

    let avatar = match (&form.avatar, extension) {
        (Some(upload), Some(extension)) => Some(save_avatar(&config.media_dir, upload, extension).await?),
        _ => None,
    };

    let name = form.name.trim();
    let bio = form.bio.trim();
    let email = form.email.trim().to_lowercase();
    UserRepository::update_profile(
        &db_pool,
        &user.id,
        ProfileUpdate {
            name: (!name.is_empty()).then_some(name),
            username: form.username.trim(),
            email: &email,
            bio: (!bio.is_empty()).then_some(bio),
            avatar: avatar.as_deref(),
        },
    )
    .await?;
    tracing::info!("@{} updated their profile", user.username);

    if let (Some(_), Some(old)) = (&avatar, &user.avatar) {
        remove_avatar(&config.media_dir, old).await?;
    }

    Ok(Redirect::to(&format!("/profile/{}/", user.id)).into_response())
}

/// Writes the image under a fresh name and returns its path relative to the media dir.
async fn save_avatar(media_dir: &Path, upload: &Upload, extension: &str) -> AppResult<String> {
    let dir = media_dir.join(AVATAR_DIR);
    tokio::fs::create_dir_all(&dir).await?;

    let file_name = format!("{}.{extension}", Uuid::now_v7().simple());
    tokio::fs::write(dir.join(&file_name), &upload.data).await?;
    tracing::debug!("saved avatar {file_name} ({} bytes)", upload.data.len());

    Ok(format!("{AVATAR_DIR}/{file_name}"))
}

/// Deletes a replaced avatar. A file that is already gone is fine.
async fn remove_avatar(media_dir: &Path, avatar: &str) -> AppResult<()> {
    match tokio::fs::remove_file(media_dir.join(avatar)).await {
        Ok(()) => {
            tracing::debug!("removed avatar {avatar}");
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

async fn render(session: &Session, user: &User, form: &ProfileForm) -> AppResult<Response> {
    let content = fill(
        include_res!(str, "/pages/profiles/update_user.html"),
        &[
            ("avatar", escape(&user.avatar_url()).as_str()),
            ("name", escape(&form.name).as_str()),
            ("username", escape(&form.username).as_str()),
            ("email", escape(&form.email).as_str()),
            ("bio", escape(&form.bio).as_str()),
        ],
    );
    res::page(session, Some(user), "Edit profile", &content).await
}

//! The signed-in user's profile.

use std::sync::Arc;

use souk_protocol::endpoints::PROFILE;
use souk_protocol::validate::validate_required;
use souk_protocol::{User, UserData};
use souk_session::ApiClient;
use souk_store::SessionStore;
use souk_transport::{ApiRequest, FormPart, HttpTransport, ImageAsset};

use crate::{MarketError, ProfileConfig};

/// File name used for a profile picture that came without one.
pub const DEFAULT_PROFILE_IMAGE_NAME: &str = "profile.jpg";

/// What the edit-profile screen submits.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    /// A newly picked picture. `None` keeps the current one.
    pub profile_image: Option<ImageAsset>,
}

impl ProfileUpdate {
    pub fn validate(&self) -> Result<(), MarketError> {
        validate_required("First name", &self.first_name)
            .and_then(|()| validate_required("Last name", &self.last_name))
            .map_err(|e| MarketError::Invalid(e.to_string()))
    }

    async fn into_parts(self) -> Result<Vec<FormPart>, MarketError> {
        let mut parts = vec![
            FormPart::text("firstName", self.first_name.trim()),
            FormPart::text("lastName", self.last_name.trim()),
        ];
        if let Some(image) = self.profile_image {
            let file_name = image
                .file_name
                .or_else(|| Some(DEFAULT_PROFILE_IMAGE_NAME.to_string()));
            let part = FormPart::read_file("profileImage", &image.path, file_name, image.content_type)
                .await
                .map_err(MarketError::Image)?;
            parts.push(part);
        }
        Ok(parts)
    }
}

/// `GET` and `PUT /user/profile`.
pub struct ProfileApi<T, S> {
    client: Arc<ApiClient<T, S>>,
    config: ProfileConfig,
}

impl<T: HttpTransport, S: SessionStore> ProfileApi<T, S> {
    pub fn new(client: Arc<ApiClient<T, S>>, config: ProfileConfig) -> Self {
        Self { client, config }
    }

    /// Fetches the profile once.
    pub async fn fetch(&self) -> Result<User, MarketError> {
        let data: UserData = self.client.send_json(ApiRequest::get(PROFILE)).await?;
        Ok(data.user)
    }

    /// Fetches the profile, retrying per [`ProfileConfig`].
    ///
    /// A 401 is not retried: by the time it reaches here the pipeline has
    /// already tried a refresh and signed the user out.
    pub async fn fetch_with_retry(&self) -> Result<User, MarketError> {
        let attempts = self.config.fetch_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.fetch().await {
                Ok(user) => return Ok(user),
                Err(MarketError::Api(e)) if e.is_unauthorized() => return Err(e.into()),
                Err(e) if attempt < attempts => {
                    tracing::warn!(attempt, error = %e, "profile fetch failed, retrying");
                    tokio::time::sleep(self.config.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(attempts, error = %e, "profile fetch failed");
                    return Err(e);
                }
            }
        }
    }

    /// Saves the profile and returns the user as the server now has it.
    ///
    /// Pass the result to
    /// [`SessionManager::update_user`](souk_session::SessionManager::update_user)
    /// so the session and its cache see the change.
    pub async fn update(&self, update: ProfileUpdate) -> Result<User, MarketError> {
        update.validate()?;
        let request = ApiRequest::put(PROFILE).multipart(update.into_parts().await?);
        let data: UserData = self.client.send_json(request).await?;
        tracing::info!(user = %data.user.id, "profile updated");
        Ok(data.user)
    }
}

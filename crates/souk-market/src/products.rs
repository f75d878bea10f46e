//! Product listings: browse, create, edit, delete.
//!
//! Create and edit are multipart forms. The two forms differ in small ways
//! the backend depends on:
//!
//! | Field              | create            | edit              |
//! |--------------------|-------------------|-------------------|
//! | listing name       | `title`           | `name`            |
//! | unnamed image file | `photo_{i}.jpg`   | `image_{i}.jpg`   |
//! | images required    | at least one new  | at least one kept or new |

use std::sync::Arc;

use souk_protocol::endpoints::{PRODUCTS, product};
use souk_protocol::{Codec, Envelope, JsonCodec, Location, Product};
use souk_session::ApiClient;
use souk_store::SessionStore;
use souk_transport::{ApiRequest, FormPart, HttpTransport, ImageAsset};

use crate::MarketError;

/// Shown when the create form is incomplete.
pub const MISSING_FIELDS_MESSAGE: &str = "Please complete all fields.";

/// Shown when the price isn't a positive number.
pub const INVALID_PRICE_MESSAGE: &str = "Price must be a positive number.";

/// Minimum name and description length on the edit form.
pub const MIN_EDIT_TEXT_LEN: usize = 3;

// ---------------------------------------------------------------------------
// ProductQuery
// ---------------------------------------------------------------------------

/// Filters for `GET /products`. Unset fields are left off the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub user_email: Option<String>,
}

impl ProductQuery {
    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn owned_by(mut self, email: impl Into<String>) -> Self {
        self.user_email = Some(email.into());
        self
    }

    fn apply(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(page) = self.page {
            request = request.query("page", page);
        }
        if let Some(limit) = self.limit {
            request = request.query("limit", limit);
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            request = request.query("search", search);
        }
        if let Some(email) = &self.user_email {
            request = request.query("userEmail", email);
        }
        request
    }
}

// ---------------------------------------------------------------------------
// ProductDraft
// ---------------------------------------------------------------------------

/// The add/edit product form, as typed.
#[derive(Debug, Clone, Default)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    /// The price field's text. Parsed by validation.
    pub price: String,
    pub location: Option<Location>,
    /// Newly picked images to upload.
    pub images: Vec<ImageAsset>,
}

impl ProductDraft {
    /// Checks the add-product form. Returns the parsed price.
    pub fn validate_new(&self) -> Result<f64, MarketError> {
        let incomplete = self.name.trim().is_empty()
            || self.description.trim().is_empty()
            || self.price.trim().is_empty()
            || self.images.is_empty()
            || self.location.as_ref().is_none_or(|l| l.name.trim().is_empty());
        if incomplete {
            return Err(MarketError::Invalid(MISSING_FIELDS_MESSAGE.into()));
        }
        parse_price(&self.price).ok_or_else(|| MarketError::Invalid(INVALID_PRICE_MESSAGE.into()))
    }

    /// Checks the edit-product form. `kept_images` is how many of the
    /// listing's current images the user left in place.
    pub fn validate_edit(&self, kept_images: usize) -> Result<f64, MarketError> {
        let invalid = |msg: &str| MarketError::Invalid(msg.to_string());
        if self.name.trim().chars().count() < MIN_EDIT_TEXT_LEN {
            return Err(invalid("Name too short"));
        }
        if self.description.trim().chars().count() < MIN_EDIT_TEXT_LEN {
            return Err(invalid("Description too short"));
        }
        let price = parse_price(&self.price).ok_or_else(|| invalid("Invalid price"))?;
        if kept_images + self.images.len() == 0 {
            return Err(invalid("Add at least one image"));
        }
        if self.location.is_none() {
            return Err(invalid("Select a location"));
        }
        Ok(price)
    }

    async fn into_parts(
        self,
        name_field: &str,
        image_prefix: &str,
    ) -> Result<Vec<FormPart>, MarketError> {
        let mut parts = vec![
            FormPart::text(name_field, self.name.trim()),
            FormPart::text("description", self.description.trim()),
            FormPart::text("price", self.price.trim()),
        ];
        if let Some(location) = self.location {
            parts.push(FormPart::text("location[name]", location.name));
            parts.push(FormPart::text("location[latitude]", location.latitude.to_string()));
            parts.push(FormPart::text("location[longitude]", location.longitude.to_string()));
        }
        for (i, image) in self.images.into_iter().enumerate() {
            let file_name = image
                .file_name
                .or_else(|| Some(format!("{image_prefix}_{i}.jpg")));
            let part = FormPart::read_file("images", &image.path, file_name, image.content_type)
                .await
                .map_err(MarketError::Image)?;
            parts.push(part);
        }
        Ok(parts)
    }
}

fn parse_price(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)
}

// ---------------------------------------------------------------------------
// ProductsApi
// ---------------------------------------------------------------------------

/// `/products` endpoints.
pub struct ProductsApi<T, S> {
    client: Arc<ApiClient<T, S>>,
}

impl<T: HttpTransport, S: SessionStore> ProductsApi<T, S> {
    pub fn new(client: Arc<ApiClient<T, S>>) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, MarketError> {
        let request = query.apply(ApiRequest::get(PRODUCTS));
        let products: Option<Vec<Product>> = self.client.send_envelope(request).await?.data;
        Ok(products.unwrap_or_default())
    }

    /// The user's own live listings.
    ///
    /// The backend's `userEmail` filter isn't trusted on its own: results
    /// are re-filtered by owner and deleted listings are dropped.
    pub async fn list_owned_by(&self, email: &str) -> Result<Vec<Product>, MarketError> {
        let products = self.list(&ProductQuery::default().owned_by(email)).await?;
        Ok(products
            .into_iter()
            .filter(|p| p.is_owned_by(email) && !p.is_deleted)
            .collect())
    }

    pub async fn get(&self, id: &str) -> Result<Product, MarketError> {
        Ok(self.client.send_json(ApiRequest::get(product(id))).await?)
    }

    /// Publishes a new listing.
    ///
    /// Returns the created product when the server echoes it back.
    pub async fn create(&self, draft: ProductDraft) -> Result<Option<Product>, MarketError> {
        draft.validate_new()?;
        let parts = draft.into_parts("title", "photo").await?;
        let product = self.submit(ApiRequest::post(PRODUCTS).multipart(parts)).await?;
        tracing::info!("product created");
        Ok(product)
    }

    /// Saves an edited listing. `kept_images` as in
    /// [`ProductDraft::validate_edit`]; only new images are uploaded.
    pub async fn update(
        &self,
        id: &str,
        draft: ProductDraft,
        kept_images: usize,
    ) -> Result<Option<Product>, MarketError> {
        draft.validate_edit(kept_images)?;
        let parts = draft.into_parts("name", "image").await?;
        let product = self.submit(ApiRequest::put(product(id)).multipart(parts)).await?;
        tracing::info!(%id, "product updated");
        Ok(product)
    }

    pub async fn delete(&self, id: &str) -> Result<(), MarketError> {
        self.client.send(ApiRequest::delete(product(id))).await?;
        tracing::info!(%id, "product deleted");
        Ok(())
    }

    /// Sends a write and reads back the product if the body has one.
    async fn submit(&self, request: ApiRequest) -> Result<Option<Product>, MarketError> {
        let response = self.client.send(request).await?;
        Ok(JsonCodec
            .decode::<Envelope<Product>>(&response.body)
            .ok()
            .and_then(|envelope| envelope.data))
    }
}

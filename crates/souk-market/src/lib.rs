//! Marketplace features for Souk.
//!
//! Every call here goes through the session's
//! [`ApiClient`](souk_session::ApiClient), so it carries the user's token
//! and survives an expired one.
//!
//! # Key types
//!
//! - [`ProfileApi`]: read and edit the signed-in user's profile
//! - [`ProductsApi`]: browse, publish, edit, and delete listings
//! - [`PostsApi`] / [`Feed`]: the paginated news feed
//! - [`ImagePicker`]: where listing and profile pictures come from

mod config;
mod error;
mod feed;
mod picker;
mod products;
mod profile;

pub use config::{FeedConfig, ProfileConfig};
pub use error::MarketError;
pub use feed::{Feed, PostsApi};
pub use picker::{FilePicker, ImagePicker, ImageSource, PickOutcome};
pub use products::{
    INVALID_PRICE_MESSAGE, MISSING_FIELDS_MESSAGE, ProductDraft, ProductQuery, ProductsApi,
};
pub use profile::{DEFAULT_PROFILE_IMAGE_NAME, ProfileApi, ProfileUpdate};

//! Wire contract for the Souk marketplace API.
//!
//! This crate defines the "language" the client and backend speak:
//!
//! - **Endpoints** ([`endpoints`]): the bit-exact request paths.
//! - **Messages** ([`LoginRequest`], [`Envelope`], [`TokenPair`], …):
//!   request and response bodies.
//! - **Records** ([`User`], [`Product`], [`Post`]): the domain objects
//!   that travel inside those bodies.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how bodies are turned
//!   to and from bytes.
//! - **Claims** ([`claims`]): best-effort reading of the access token.
//! - **Validation** ([`validate`]): client-side field checks that run
//!   before any request is sent.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about connections or sessions. It only
//! knows shapes and paths.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope<T>) → Session (who is logged in)
//! ```

pub mod claims;
mod codec;
pub mod endpoints;
mod error;
mod messages;
mod types;
pub mod validate;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use messages::{
    AccessTokenData, Envelope, ErrorBody, ForgotPasswordRequest, LoginRequest,
    MessageData, RefreshRequest, ResendOtpRequest, TokenPair, UserData,
    VerifyOtpRequest,
};
pub use types::{ImageRef, Location, Post, Product, User};

//! Storage-notification bridge that turns a newly created object into an authenticated REST
//! call: the call key is read from the object's filename, an access token is obtained once
//! through a password grant and cached, and the key is forwarded as JSON to a single endpoint.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod bridge;
pub mod cache;
pub mod config;
pub mod error;
pub mod event;
pub mod http;
pub mod invoke;
pub mod obs;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use oauth2;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

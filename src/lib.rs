//! Bearer-authenticated HTTP client that renews expired access credentials once per request,
//! replays the original call, and tears the session down when renewal is impossible.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

/// Emits a `tracing` event when the `tracing` feature is enabled; compiles to nothing otherwise.
macro_rules! obs_event {
	($level:ident, $($arg:tt)+) => {{
		#[cfg(feature = "tracing")]
		::tracing::$level!($($arg)+);
	}};
}

pub mod auth;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod obs;
pub mod renewal;
pub mod resource;
pub mod store;
pub mod teardown;
pub mod transport;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers shared by the integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::ApiClient,
		config::ClientConfig,
		store::{CredentialStore, MemoryStore},
		teardown::RecordingNavigator,
		transport::ReqwestTransport,
	};

	/// Client, backing store, and navigator recorder wired together for integration tests.
	pub struct TestClient {
		/// Client under test.
		pub client: ApiClient,
		/// In-memory store shared with the client.
		pub store: Arc<MemoryStore>,
		/// Navigator that records every teardown redirect.
		pub navigator: RecordingNavigator,
	}

	/// Builds a reqwest transport that accepts the self-signed certificates served by `httpmock`.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Builds a reqwest-backed [`ApiClient`] for the provided configuration, backed by an
	/// in-memory store seeded by the caller.
	pub fn build_reqwest_test_client(config: ClientConfig, store: MemoryStore) -> TestClient {
		let store = Arc::new(store);
		let shared: Arc<dyn CredentialStore> = store.clone();
		let navigator = RecordingNavigator::default();
		let client = ApiClient::builder(config)
			.transport(Arc::new(test_reqwest_transport()))
			.store(shared)
			.navigator(Arc::new(navigator.clone()))
			.build()
			.expect("Failed to build reqwest-backed test client.");

		TestClient { client, store, navigator }
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use http;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

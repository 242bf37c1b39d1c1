//! Generic REST collection helper layered on the primary client.
//!
//! A [`Resource`] is bound to a collection path ending in `/` and derives item paths as
//! `{collection}{id}/` and action paths as `{collection}{id}/{action}/`. Every call goes through
//! [`ApiClient::send`], so it carries the bearer credential and renews it like any other call.

// self
use crate::{
	_prelude::*,
	client::ApiClient,
	transport::{ApiRequest, ApiResponse},
};

/// REST collection bound to a client.
#[derive(Clone, Debug)]
pub struct Resource<'a> {
	client: &'a ApiClient,
	collection: String,
}
impl<'a> Resource<'a> {
	/// Binds `collection` to `client`, appending a trailing `/` when missing.
	pub fn new(client: &'a ApiClient, collection: impl Into<String>) -> Self {
		let mut collection = collection.into();

		if !collection.ends_with('/') {
			collection.push('/');
		}

		Self { client, collection }
	}

	/// Collection path.
	pub fn collection(&self) -> &str {
		&self.collection
	}

	/// Path of a single item.
	pub fn item_path(&self, id: impl Display) -> String {
		format!("{}{id}/", self.collection)
	}

	/// Lists the collection, passing `query` as URL parameters.
	pub async fn list<T, I, K, V>(&self, query: I) -> Result<T>
	where
		T: DeserializeOwned,
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Display,
	{
		let request = query
			.into_iter()
			.fold(ApiRequest::get(self.collection.as_str()), |request, (key, value)| {
				request.query(key, value)
			});

		self.client.send(request).await?.json()
	}

	/// Fetches one item.
	pub async fn get<T>(&self, id: impl Display) -> Result<T>
	where
		T: DeserializeOwned,
	{
		self.client.get(self.item_path(id)).await?.json()
	}

	/// Creates an item from `body`.
	pub async fn create<B, T>(&self, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.client.post_json(self.collection.as_str(), body).await?.json()
	}

	/// Replaces an item with `body`.
	pub async fn update<B, T>(&self, id: impl Display, body: &B) -> Result<T>
	where
		B: ?Sized + Serialize,
		T: DeserializeOwned,
	{
		self.client.put_json(self.item_path(id), body).await?.json()
	}

	/// Deletes an item.
	pub async fn remove(&self, id: impl Display) -> Result<()> {
		self.client.delete(self.item_path(id)).await.map(|_| ())
	}

	/// Posts an empty body to `{collection}{id}/{action}/`.
	pub async fn action(&self, id: impl Display, action: &str) -> Result<ApiResponse> {
		self.client.send(ApiRequest::post(self.action_path(id, action))).await
	}

	/// Posts `body` to `{collection}{id}/{action}/`.
	pub async fn action_with<B>(&self, id: impl Display, action: &str, body: &B) -> Result<ApiResponse>
	where
		B: ?Sized + Serialize,
	{
		self.client.post_json(self.action_path(id, action), body).await
	}

	/// Sends `method` to `{collection}{action}/`.
	pub async fn collection_action(&self, method: Method, action: &str) -> Result<ApiResponse> {
		let path = format!("{}{}/", self.collection, action.trim_matches('/'));

		self.client.send(ApiRequest::new(method, path)).await
	}

	fn action_path(&self, id: impl Display, action: &str) -> String {
		format!("{}{id}/{}/", self.collection, action.trim_matches('/'))
	}
}

//! Create, read, update and delete over HTTP.
//!
//! | Method | HTTP | URL | Body |
//! |--------|------|-----|------|
//! | [`all`](Collection::all) | GET | `{base}/{name}?{filter}` | none |
//! | [`get_one`](Collection::get_one) | GET | `{base}/{name}/{id}` | none |
//! | [`create`](Collection::create) | POST | `{base}/{name}` | JSON |
//! | [`update`](Collection::update) | PATCH | `{base}/{name}/{id}` | JSON |
//! | [`delete`](Collection::delete) | DELETE | `{base}/{name}/{id}` | none |
//!
//! Every call resolves with the decoded response body whatever the status
//! code, unless the client was built with `error_for_status(true)`.

use std::fmt::Display;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Result;

use super::{Collection, Filter};

// ============================================================================
// Collection - CRUD
// ============================================================================

impl Collection {
    /// Lists records matching `filter`.
    ///
    /// # Errors
    ///
    /// - [`Error::Http`](crate::Error::Http) on network failure
    /// - [`Error::Json`](crate::Error::Json) if the body does not decode as `T`
    pub async fn all<T>(&self, filter: &Filter) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut url = self.url()?;
        filter.apply_to(&mut url);

        debug!(collection = %self.name(), filters = filter.pairs().len(), "Listing records");
        self.inner.client.http.send(Method::GET, url).await
    }

    /// Fetches one record by id.
    ///
    /// # Errors
    ///
    /// Same as [`all`](Self::all).
    pub async fn get_one<T>(&self, id: impl Display) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let id = id.to_string();
        debug!(collection = %self.name(), %id, "Fetching record");

        let url = self.record_url(&id)?;
        self.inner.client.http.send(Method::GET, url).await
    }

    /// Creates a record from `data`.
    ///
    /// # Errors
    ///
    /// Same as [`all`](Self::all), plus [`Error::Json`](crate::Error::Json)
    /// if `data` cannot be serialized.
    pub async fn create<B, T>(&self, data: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(collection = %self.name(), "Creating record");

        let url = self.url()?;
        self.inner.client.http.send_json(Method::POST, url, data).await
    }

    /// Applies a partial update to record `id`.
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create).
    pub async fn update<B, T>(&self, id: impl Display, data: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let id = id.to_string();
        debug!(collection = %self.name(), %id, "Updating record");

        let url = self.record_url(&id)?;
        self.inner.client.http.send_json(Method::PATCH, url, data).await
    }

    /// Deletes record `id`.
    ///
    /// # Errors
    ///
    /// Same as [`all`](Self::all).
    pub async fn delete<T>(&self, id: impl Display) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let id = id.to_string();
        debug!(collection = %self.name(), %id, "Deleting record");

        let url = self.record_url(&id)?;
        self.inner.client.http.send(Method::DELETE, url).await
    }
}

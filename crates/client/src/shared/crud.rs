//! Path building and generic calls shared by the resource modules.
//!
//! Every CRUD resource of the backend follows the same layout:
//! `/{res}/`, `/{res}/{id}/` and `/{res}/bulk/`. Link tables use
//! `/{link}/{left}/{right}/`.

use contracts::domain::a008_association::AssociationRow;
use contracts::domain::common::BulkDeleteRequest;
use contracts::shared::api_response::Payload;
use contracts::shared::list_shape::ResourceList;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use std::marker::PhantomData;

use crate::shared::api_utils::segment;
use crate::shared::error::ApiError;
use crate::shared::http::{ApiClient, ApiRequest};

/// A CRUD resource whose records decode into `T`
#[derive(Debug)]
pub struct Resource<T> {
    base: &'static str,
    record: PhantomData<fn() -> T>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Resource<T> {}

impl<T> Resource<T> {
    /// `base` is the path segment without slashes, e.g. `"membership-plan"`
    pub const fn new(base: &'static str) -> Self {
        Self {
            base,
            record: PhantomData,
        }
    }

    pub fn collection(&self) -> String {
        format!("/{}/", self.base)
    }

    pub fn item(&self, id: &str) -> String {
        format!("/{}/{}/", self.base, segment(id))
    }

    pub fn bulk(&self) -> String {
        format!("/{}/bulk/", self.base)
    }

    /// Sub-collection of one record, e.g. `/user/{id}/memberships/`
    pub fn nested(&self, id: &str, child: &str) -> String {
        format!("/{}/{}/{}/", self.base, segment(id), child)
    }

    /// Action on one record, e.g. `/reservation/{id}/cancel/`
    pub fn action(&self, id: &str, action: &str) -> String {
        self.nested(id, action)
    }
}

impl<T: DeserializeOwned> Resource<T> {
    pub async fn list(&self, client: &ApiClient) -> Result<Vec<T>, ApiError> {
        fetch_list(client, ApiRequest::get(self.collection())).await
    }

    pub async fn list_filtered<Q>(
        &self,
        client: &ApiClient,
        filters: &Q,
    ) -> Result<Vec<T>, ApiError>
    where
        Q: Serialize,
    {
        fetch_list(client, ApiRequest::get(self.collection()).query(filters)?).await
    }

    pub async fn get(&self, client: &ApiClient, id: &str) -> Result<T, ApiError> {
        let payload: Payload<T> = client.get(self.item(id)).await?;
        Ok(payload.into_inner())
    }

    pub async fn create<B>(&self, client: &ApiClient, dto: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let payload: Payload<T> = client.post(self.collection(), dto).await?;
        Ok(payload.into_inner())
    }

    /// Full update with PUT
    pub async fn update<B>(&self, client: &ApiClient, id: &str, dto: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let payload: Payload<T> = client.put(self.item(id), dto).await?;
        Ok(payload.into_inner())
    }

    pub async fn delete(&self, client: &ApiClient, id: &str) -> Result<(), ApiError> {
        client.delete(self.item(id)).await
    }

    /// `POST /{res}/bulk/` with an array body; answers the created records
    pub async fn bulk_create<B>(&self, client: &ApiClient, dtos: &[B]) -> Result<Vec<T>, ApiError>
    where
        B: Serialize,
    {
        fetch_list(client, ApiRequest::post(self.bulk()).json(dtos)?).await
    }

    /// `DELETE /{res}/bulk/` with `{ "ids": [...] }`
    pub async fn bulk_delete<I, S>(&self, client: &ApiClient, ids: I) -> Result<(), ApiError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = ApiRequest::delete(self.bulk()).json(&BulkDeleteRequest::new(ids))?;
        client.request::<IgnoredAny>(request).await.map(|_| ())
    }
}

/// A link table whose rows decode into `R`
#[derive(Debug)]
pub struct Association<R> {
    base: &'static str,
    row: PhantomData<fn() -> R>,
}

impl<R> Clone for Association<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Association<R> {}

impl<R> Association<R> {
    pub const fn new(base: &'static str) -> Self {
        Self {
            base,
            row: PhantomData,
        }
    }

    pub fn collection(&self) -> String {
        format!("/{}/", self.base)
    }

    /// Rows of one left id, e.g. `/community-plan/{community_id}/`
    pub fn for_left(&self, left_id: &str) -> String {
        format!("/{}/{}/", self.base, segment(left_id))
    }

    pub fn pair(&self, left_id: &str, right_id: &str) -> String {
        format!("/{}/{}/{}/", self.base, segment(left_id), segment(right_id))
    }

    pub fn bulk(&self) -> String {
        format!("/{}/bulk/", self.base)
    }
}

impl<R> Association<R>
where
    R: AssociationRow + Serialize + DeserializeOwned,
{
    pub async fn list(&self, client: &ApiClient) -> Result<Vec<R>, ApiError> {
        fetch_list(client, ApiRequest::get(self.collection())).await
    }

    pub async fn list_for(&self, client: &ApiClient, left_id: &str) -> Result<Vec<R>, ApiError> {
        fetch_list(client, ApiRequest::get(self.for_left(left_id))).await
    }

    pub async fn link(&self, client: &ApiClient, row: &R) -> Result<R, ApiError> {
        let payload: Payload<R> = client.post(self.collection(), row).await?;
        Ok(payload.into_inner())
    }

    pub async fn unlink(&self, client: &ApiClient, row: &R) -> Result<(), ApiError> {
        client.delete(self.pair(row.left_id(), row.right_id())).await
    }

    pub async fn bulk_link(&self, client: &ApiClient, rows: &[R]) -> Result<Vec<R>, ApiError> {
        fetch_list(client, ApiRequest::post(self.bulk()).json(rows)?).await
    }

    pub async fn bulk_unlink(&self, client: &ApiClient, rows: &[R]) -> Result<(), ApiError> {
        let request = ApiRequest::delete(self.bulk()).json(rows)?;
        client.request::<IgnoredAny>(request).await.map(|_| ())
    }
}

/// Any list shape the backend uses, `null` included, as a vector
pub(crate) async fn fetch_list<T: DeserializeOwned>(
    client: &ApiClient,
    request: ApiRequest,
) -> Result<Vec<T>, ApiError> {
    let raw: Option<ResourceList<T>> = client.request(request).await?;
    Ok(ResourceList::normalize(raw))
}

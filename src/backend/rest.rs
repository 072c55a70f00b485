//! REST client for the hosted backend.
//!
//! Tables are served PostgREST style under `/rest/v1/<table>` with equality
//! filters (`column=eq.value`), remote procedures under `/rest/v1/rpc/<name>`
//! and the object store under `/storage/v1/object/<bucket>/<path>`.

use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::errors::BackendError;
use super::traits::{
    DataRoomStore, InvitationStore, ObjectStorage, ObjectUpload, OnboardingProcedure,
    OnboardingTransaction, OrganizationStore, ProfileStore, StoredObject,
};
use crate::config::BackendConfig;
use crate::models::{
    DataRoom, NewOrganization, Organization, OrganizationId, TeamInvitation, UserId, UserProfile,
};

const ORGANIZATIONS: &str = "organizations";
const DATA_ROOMS: &str = "data_rooms";
const TEAM_INVITATIONS: &str = "team_invitations";
const PROFILES: &str = "profiles";

/// Error body shared by the table, rpc and storage endpoints
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    error: Option<String>,
    details: Option<String>,
}

impl ErrorBody {
    fn describe(&self, status: u16) -> String {
        let headline = self
            .message
            .as_ref()
            .or(self.error.as_ref())
            .cloned()
            .unwrap_or_else(|| format!("Request failed: {status}"));

        match &self.details {
            Some(details) => format!("{headline}: {details}"),
            None => headline,
        }
    }
}

pub struct RestBackend {
    base_url: String,
    api_key: String,
    access_token: String,
    procedure: String,
    http: HttpClient,
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| BackendError::Configuration {
                message: "backend api key is not set (DATAROOM_BACKEND_API_KEY)".to_string(),
            })?;

        let mut builder = HttpClient::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| BackendError::Configuration {
            message: e.to_string(),
        })?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone().unwrap_or_else(|| api_key.clone()),
            api_key,
            procedure: config.onboarding_procedure.clone(),
            http,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.access_token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| BackendError::network(e.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body: ErrorBody = response.json().await.unwrap_or_default();
        Err(BackendError::Http {
            status,
            message: body.describe(status),
        })
    }

    /// Rows of `table` where `column` equals `value`
    async fn select_eq<T: DeserializeOwned>(
        &self,
        table: &str,
        column: &str,
        value: &str,
        order: Option<&str>,
    ) -> Result<Vec<T>, BackendError> {
        let mut query = vec![
            ("select", "*".to_string()),
            (column, format!("eq.{value}")),
        ];
        if let Some(order) = order {
            query.push(("order", order.to_string()));
        }

        debug!(table, column, value, "Selecting rows");
        let response = self
            .send(self.http.get(self.table_url(table)).query(&query))
            .await?;
        Ok(response.json().await?)
    }
}

impl std::fmt::Debug for RestBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestBackend")
            .field("base_url", &self.base_url)
            .field("procedure", &self.procedure)
            .finish()
    }
}

#[async_trait]
impl OrganizationStore for RestBackend {
    async fn create_organization(
        &self,
        organization: &NewOrganization,
    ) -> Result<Option<Organization>, BackendError> {
        let response = self
            .send(
                self.http
                    .post(self.table_url(ORGANIZATIONS))
                    .header("Prefer", "return=representation")
                    .json(organization),
            )
            .await?;

        let mut rows: Vec<Organization> = response.json().await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn get_organization(
        &self,
        id: &OrganizationId,
    ) -> Result<Option<Organization>, BackendError> {
        let rows: Vec<Organization> = self
            .select_eq(ORGANIZATIONS, "id", &id.to_string(), None)
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn set_logo_url(&self, id: &OrganizationId, logo_url: &str) -> Result<(), BackendError> {
        self.send(
            self.http
                .patch(self.table_url(ORGANIZATIONS))
                .query(&[("id", format!("eq.{id}"))])
                .json(&json!({ "logo_url": logo_url })),
        )
        .await?;
        Ok(())
    }

    async fn delete_organization(&self, id: &OrganizationId) -> Result<(), BackendError> {
        self.send(
            self.http
                .delete(self.table_url(ORGANIZATIONS))
                .query(&[("id", format!("eq.{id}"))]),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl DataRoomStore for RestBackend {
    async fn list_data_rooms(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<DataRoom>, BackendError> {
        self.select_eq(
            DATA_ROOMS,
            "organization_id",
            &organization_id.to_string(),
            Some("created_at.asc"),
        )
        .await
    }
}

#[async_trait]
impl InvitationStore for RestBackend {
    async fn list_invitations(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Vec<TeamInvitation>, BackendError> {
        self.select_eq(
            TEAM_INVITATIONS,
            "organization_id",
            &organization_id.to_string(),
            Some("created_at.asc"),
        )
        .await
    }
}

#[async_trait]
impl ProfileStore for RestBackend {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, BackendError> {
        let rows: Vec<UserProfile> = self
            .select_eq(PROFILES, "id", &user_id.to_string(), None)
            .await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl ObjectStorage for RestBackend {
    async fn upload(&self, object: ObjectUpload) -> Result<StoredObject, BackendError> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, object.bucket, object.path
        );

        debug!(
            bucket = %object.bucket,
            path = %object.path,
            size = object.bytes.len(),
            "Uploading object"
        );
        let request = self
            .http
            .post(url)
            .header("Content-Type", object.content_type.as_str())
            .header("x-upsert", if object.upsert { "true" } else { "false" })
            .body(object.bytes);

        match self.send(request).await {
            Ok(_) => Ok(StoredObject {
                bucket: object.bucket,
                path: object.path,
            }),
            Err(BackendError::Http { message, .. }) => Err(BackendError::Storage {
                path: object.path,
                message,
            }),
            Err(other) => Err(other),
        }
    }

    fn public_url(&self, object: &StoredObject) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, object.bucket, object.path
        )
    }
}

#[async_trait]
impl OnboardingProcedure for RestBackend {
    async fn complete_onboarding(
        &self,
        transaction: &OnboardingTransaction,
    ) -> Result<(), BackendError> {
        let url = self.table_url(&format!("rpc/{}", self.procedure));
        let response = self
            .authorized(self.http.post(url).json(transaction))
            .send()
            .await
            .map_err(|e| BackendError::network(e.to_string()))?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status().as_u16();
        let body: ErrorBody = response.json().await.unwrap_or_default();
        Err(BackendError::Procedure {
            procedure: self.procedure.clone(),
            message: body.describe(status),
            code: body.code,
        })
    }
}

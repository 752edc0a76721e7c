//! Organisation account operations over the transport client.
//!
//! Each operation builds the JSON-API headers, hands the request to an
//! [`HttpClient`] and decodes the `{"data": ...}` document it gets back.
//! Status errors come back untouched, so `err.to_string()` is the status
//! line and `err.downcast_ref::<HttpError>()` recovers the code.

mod model;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::http::{Headers, HttpClient, QueryParams, ReqwestTransport, RetryPolicy};

pub use model::{ACCOUNT_TYPE, Account, AccountAttributes, Envelope};

/// Path of the accounts collection, relative to the server URL.
pub const ACCOUNTS_ENDPOINT: &str = "/v1/organisation/accounts";

/// Media type of JSON-API documents.
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Page size the server uses when none is requested.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Filters and paging for [`Accounts::list`]. Empty filters are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListRequest {
    pub page_number: u32,
    pub page_size: u32,
    pub bank_id: Vec<String>,
    pub account_number: Vec<String>,
    pub iban: Vec<String>,
    pub customer_id: Vec<String>,
    pub country: Vec<String>,
}

impl ListRequest {
    /// Query parameters for this request, e.g. `page[number]` and `filter[iban]`.
    pub fn query_params(&self) -> QueryParams {
        let mut query = QueryParams::new();

        if self.page_number != 0 {
            query.insert("page[number]".to_string(), self.page_number.to_string());
        }
        if self.page_size != 0 && self.page_size != DEFAULT_PAGE_SIZE {
            query.insert("page[size]".to_string(), self.page_size.to_string());
        }

        let filters = [
            ("bank_id", &self.bank_id),
            ("account_number", &self.account_number),
            ("iban", &self.iban),
            ("customer_id", &self.customer_id),
            ("country", &self.country),
        ];
        for (name, values) in filters {
            if !values.is_empty() {
                query.insert(format!("filter[{}]", name), values.join(","));
            }
        }

        query
    }
}

/// Account operations offered by the API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Accounts: Send + Sync {
    async fn create(&self, account: &Account) -> Result<Account>;
    async fn fetch(&self, id: Uuid) -> Result<Account>;
    async fn list(&self, request: &ListRequest) -> Result<Vec<Account>>;
    async fn delete(&self, id: Uuid, version: i64) -> Result<()>;
}

/// [`Accounts`] implementation talking to a live server.
#[derive(Debug, Clone)]
pub struct AccountsApi {
    server_url: String,
    host: Option<String>,
    client: Client,
    retry: RetryPolicy,
}

impl AccountsApi {
    /// `server_url` is the scheme and authority of the API, e.g. `http://localhost:8080`.
    /// `host`, when given, is sent as the `Host` header.
    pub fn new(server_url: impl Into<String>, host: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("accounts/", env!("CARGO_PKG_VERSION")))
            .timeout(crate::http::REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            server_url: server_url.into().trim_end_matches('/').to_string(),
            host,
            client,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn http_client(&self, path: &str) -> Result<HttpClient> {
        let url = format!("{}{}", self.server_url, path);
        let transport = ReqwestTransport::from_client(self.client.clone());
        let client = HttpClient::with_transport(&url, transport)?.with_retry_policy(self.retry);
        Ok(client)
    }

    fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        if let Some(host) = &self.host {
            headers.insert("Host".to_string(), host.clone());
        }
        headers.insert("Date".to_string(), http_date(Utc::now()));
        headers.insert("Accept".to_string(), JSON_API_MEDIA_TYPE.to_string());
        headers
    }
}

#[async_trait]
impl Accounts for AccountsApi {
    #[tracing::instrument(skip(self, account), fields(id = %account.id))]
    async fn create(&self, account: &Account) -> Result<Account> {
        let body = serde_json::to_vec(&Envelope { data: account })
            .context("Failed to serialize account")?;

        let mut headers = self.headers();
        headers.insert("Content-Type".to_string(), JSON_API_MEDIA_TYPE.to_string());
        headers.insert("Content-Length".to_string(), body.len().to_string());

        debug!("Creating account {}...", account.id);
        let response = self.http_client(ACCOUNTS_ENDPOINT)?.post(&headers, body).await?;
        decode_data(&response)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch(&self, id: Uuid) -> Result<Account> {
        let path = format!("{}/{}", ACCOUNTS_ENDPOINT, id);

        debug!("Fetching account {}...", id);
        let response = self
            .http_client(&path)?
            .get(&self.headers(), &QueryParams::new())
            .await?;
        decode_data(&response)
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, request: &ListRequest) -> Result<Vec<Account>> {
        let query = request.query_params();

        debug!("Listing accounts with {:?}...", query);
        let response = self
            .http_client(ACCOUNTS_ENDPOINT)?
            .get(&self.headers(), &query)
            .await?;

        // An empty page may come back as `{}` or `{"data": null}`.
        let envelope: Envelope<Option<Vec<Account>>> = if response.is_empty() {
            Envelope { data: None }
        } else {
            serde_json::from_slice(&response).context("Failed to parse account list response")?
        };
        Ok(envelope.data.unwrap_or_default())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: Uuid, version: i64) -> Result<()> {
        let path = format!("{}/{}", ACCOUNTS_ENDPOINT, id);
        let query = QueryParams::from([("version".to_string(), version.to_string())]);

        debug!("Deleting account {} at version {}...", id, version);
        self.http_client(&path)?
            .delete(&self.headers(), &query)
            .await?;
        Ok(())
    }
}

fn decode_data<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let envelope: Envelope<T> =
        serde_json::from_slice(body).context("Failed to parse account response")?;
    Ok(envelope.data)
}

/// Formats `time` as an HTTP date, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpError;
    use chrono::TimeZone;
    use mockito::Matcher;
    use reqwest::StatusCode;
    use std::time::Duration;

    const ACCOUNT_ID: &str = "ea6239c1-99e9-42b3-bca1-92f5c068da6b";
    const ORGANISATION_ID: &str = "eb0bd6f5-c3f5-44b2-b677-acd23cdde73c";

    fn account_json(id: &str) -> String {
        format!(
            r#"{{
                "type": "accounts",
                "id": "{}",
                "organisation_id": "{}",
                "version": 0,
                "attributes": {{ "country": "GB", "bank_id": "400300", "bic": "NWBKGB22" }}
            }}"#,
            id, ORGANISATION_ID
        )
    }

    fn api(server: &mockito::Server) -> AccountsApi {
        AccountsApi::new(server.url(), Some("myapi.example.com".to_string()))
            .unwrap()
            .with_retry_policy(RetryPolicy::new(10, Duration::from_millis(1)))
    }

    fn account_id() -> Uuid {
        Uuid::parse_str(ACCOUNT_ID).unwrap()
    }

    #[test]
    fn test_http_date_format() {
        let time = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
        assert_eq!(http_date(time), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_list_query_params_defaults_are_omitted() {
        assert!(ListRequest::default().query_params().is_empty());

        let request = ListRequest {
            page_size: DEFAULT_PAGE_SIZE,
            ..Default::default()
        };
        assert!(request.query_params().is_empty());
    }

    #[test]
    fn test_list_query_params_all_filters() {
        let request = ListRequest {
            page_number: 1,
            page_size: 2,
            bank_id: vec!["3435345".to_string(), "3435346".to_string()],
            account_number: vec!["123".to_string(), "456".to_string()],
            iban: vec!["GB29 NWBK 6016 1331 9268 19".to_string()],
            customer_id: vec!["CS75847".to_string(), "CS34834".to_string()],
            country: vec!["GB".to_string()],
        };

        let query = request.query_params();

        assert_eq!(query.len(), 7);
        assert_eq!(query["page[number]"], "1");
        assert_eq!(query["page[size]"], "2");
        assert_eq!(query["filter[bank_id]"], "3435345,3435346");
        assert_eq!(query["filter[account_number]"], "123,456");
        assert_eq!(query["filter[iban]"], "GB29 NWBK 6016 1331 9268 19");
        assert_eq!(query["filter[customer_id]"], "CS75847,CS34834");
        assert_eq!(query["filter[country]"], "GB");
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let api = AccountsApi::new("http://localhost:8080/", None).unwrap();
        assert_eq!(api.server_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_fetch_account() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", format!("{}/{}", ACCOUNTS_ENDPOINT, ACCOUNT_ID).as_str())
            .match_header("accept", JSON_API_MEDIA_TYPE)
            .match_header("host", "myapi.example.com")
            .match_header("date", Matcher::Regex(r"^\w{3}, \d{2} \w{3} \d{4} .* GMT$".to_string()))
            .with_status(200)
            .with_body(format!(r#"{{"data": {}}}"#, account_json(ACCOUNT_ID)))
            .create_async()
            .await;

        let account = api(&server).fetch(account_id()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(account.id, account_id());
        assert_eq!(account.kind, ACCOUNT_TYPE);
        assert_eq!(account.attributes.bic.as_deref(), Some("NWBKGB22"));
    }

    #[tokio::test]
    async fn test_fetch_account_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", format!("{}/{}", ACCOUNTS_ENDPOINT, ACCOUNT_ID).as_str())
            .with_status(404)
            .with_body(r#"{"error_message": "record does not exist"}"#)
            .create_async()
            .await;

        let err = api(&server).fetch(account_id()).await.unwrap_err();

        assert_eq!(err.to_string(), "404 Not Found");
        let http_err = err.downcast_ref::<HttpError>().unwrap();
        assert_eq!(http_err.status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_fetch_account_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", format!("{}/{}", ACCOUNTS_ENDPOINT, ACCOUNT_ID).as_str())
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = api(&server).fetch(account_id()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse account response"));
    }

    #[tokio::test]
    async fn test_create_account() {
        let mut server = mockito::Server::new_async().await;
        let account = Account::new(
            Uuid::parse_str(ORGANISATION_ID).unwrap(),
            AccountAttributes {
                country: Some("GB".to_string()),
                ..Default::default()
            },
        );
        let expected_body = serde_json::to_string(&Envelope { data: &account }).unwrap();

        let mock = server
            .mock("POST", ACCOUNTS_ENDPOINT)
            .match_header("content-type", JSON_API_MEDIA_TYPE)
            .match_header("content-length", expected_body.len().to_string().as_str())
            .match_body(Matcher::JsonString(expected_body.clone()))
            .with_status(201)
            .with_body(format!(r#"{{"data": {}}}"#, account_json(&account.id.to_string())))
            .create_async()
            .await;

        let created = api(&server).create(&account).await.unwrap();

        mock.assert_async().await;
        assert_eq!(created.id, account.id);
        assert_eq!(created.version, Some(0));
    }

    #[tokio::test]
    async fn test_create_account_conflict() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", ACCOUNTS_ENDPOINT)
            .with_status(409)
            .create_async()
            .await;

        let account = Account::new(Uuid::new_v4(), AccountAttributes::default());
        let err = api(&server).create(&account).await.unwrap_err();

        assert_eq!(err.to_string(), "409 Conflict");
    }

    #[tokio::test]
    async fn test_list_accounts_with_filters() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", ACCOUNTS_ENDPOINT)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page[number]".into(), "1".into()),
                Matcher::UrlEncoded("page[size]".into(), "2".into()),
                Matcher::UrlEncoded("filter[country]".into(), "GB".into()),
                Matcher::UrlEncoded("filter[bank_id]".into(), "400300,400301".into()),
            ]))
            .with_status(200)
            .with_body(format!(
                r#"{{"data": [{}, {}]}}"#,
                account_json(ACCOUNT_ID),
                account_json("346acd74-2c18-422c-b32a-e5b1f657658b")
            ))
            .create_async()
            .await;

        let request = ListRequest {
            page_number: 1,
            page_size: 2,
            country: vec!["GB".to_string()],
            bank_id: vec!["400300".to_string(), "400301".to_string()],
            ..Default::default()
        };
        let accounts = api(&server).list(&request).await.unwrap();

        mock.assert_async().await;
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].id, account_id());
    }

    #[tokio::test]
    async fn test_list_accounts_empty_page() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", ACCOUNTS_ENDPOINT)
            .with_status(200)
            .with_body(r#"{"data": null, "links": {}}"#)
            .create_async()
            .await;

        let accounts = api(&server).list(&ListRequest::default()).await.unwrap();
        assert!(accounts.is_empty());
    }

    #[tokio::test]
    async fn test_delete_account() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "DELETE",
                format!("{}/{}?version=0", ACCOUNTS_ENDPOINT, ACCOUNT_ID).as_str(),
            )
            .with_status(204)
            .create_async()
            .await;

        api(&server).delete(account_id(), 0).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_account_wrong_version() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "DELETE",
                format!("{}/{}?version=1", ACCOUNTS_ENDPOINT, ACCOUNT_ID).as_str(),
            )
            .with_status(409)
            .create_async()
            .await;

        let err = api(&server).delete(account_id(), 1).await.unwrap_err();
        assert_eq!(err.to_string(), "409 Conflict");
    }

    #[tokio::test]
    async fn test_invalid_server_url() {
        let api = AccountsApi::new("http//foo", None).unwrap();
        let err = api.fetch(account_id()).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<HttpError>(),
            Some(HttpError::InvalidUrl { .. })
        ));
    }
}

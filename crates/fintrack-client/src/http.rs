//! `RemoteStore` over HTTP/1.1

use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::client::HttpConnector;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Client, Method, Request, Uri};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use fintrack_config::Config;
use fintrack_core::{
    Budget, Category, NewBudget, NewTransaction, RemoteStore, Resource, StoreError, Transaction,
};

/// Error body returned by the store on any non-2xx response
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Acknowledgement body of update and delete
#[derive(Debug, Deserialize)]
struct AckBody {
    #[serde(default)]
    message: String,
}

#[derive(Serialize)]
struct DeleteBody<'a> {
    id: &'a str,
}

/// Collection URLs resolved once at construction
#[derive(Debug, Clone)]
struct Endpoints {
    transactions: Uri,
    budgets: Uri,
    categories: Uri,
}

impl Endpoints {
    fn resolve(config: &Config) -> Result<Self, StoreError> {
        let uri_for = |resource: Resource| {
            config
                .collection_url(resource.as_str())
                .parse::<Uri>()
                .map_err(|e| StoreError::Request {
                    message: format!("invalid {} URL: {}", resource, e),
                })
        };
        Ok(Self {
            transactions: uri_for(Resource::Transactions)?,
            budgets: uri_for(Resource::Budgets)?,
            categories: uri_for(Resource::Categories)?,
        })
    }

    fn get(&self, resource: Resource) -> Uri {
        match resource {
            Resource::Transactions => self.transactions.clone(),
            Resource::Budgets => self.budgets.clone(),
            Resource::Categories => self.categories.clone(),
        }
    }
}

/// Remote store reached over plain HTTP.
///
/// Every call is a single request: no retries, no timeout beyond the
/// transport's own.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client<HttpConnector>,
    endpoints: Endpoints,
}

impl HttpStore {
    /// Create a store client for `remote.base_url`
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::new(),
            endpoints: Endpoints::resolve(config)?,
        })
    }

    /// Issue one request and return the body of a 2xx response
    async fn send<B: Serialize + ?Sized>(
        &self,
        resource: Resource,
        method: Method,
        body: Option<&B>,
    ) -> Result<Bytes, StoreError> {
        let uri = self.endpoints.get(resource);
        log::debug!("{} {}", method, uri);

        let payload = match body {
            Some(body) => Body::from(serde_json::to_vec(body).map_err(|e| StoreError::Request {
                message: e.to_string(),
            })?),
            None => Body::empty(),
        };
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .map_err(|e| StoreError::Request {
                message: e.to_string(),
            })?;

        let response = self.client.request(request).await.map_err(|e| StoreError::Network {
            message: e.to_string(),
        })?;
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body())
            .await
            .map_err(|e| StoreError::Network {
                message: e.to_string(),
            })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|b| b.error);
            log::warn!("{} request returned {}", resource, status);
            return Err(StoreError::Status {
                resource,
                status: status.as_u16(),
                message,
            });
        }

        Ok(bytes)
    }

    /// Read a collection, insisting on a JSON array
    async fn list<T: DeserializeOwned>(&self, resource: Resource) -> Result<Vec<T>, StoreError> {
        let bytes = self.send::<()>(resource, Method::GET, None).await?;
        let value: serde_json::Value = parse(resource, &bytes)?;
        if !value.is_array() {
            return Err(StoreError::Shape {
                resource,
                message: "expected an array".to_string(),
            });
        }
        serde_json::from_value(value).map_err(|e| StoreError::Shape {
            resource,
            message: e.to_string(),
        })
    }

    async fn acknowledge<B: Serialize + ?Sized>(
        &self,
        method: Method,
        body: &B,
    ) -> Result<String, StoreError> {
        let bytes = self.send(Resource::Transactions, method, Some(body)).await?;
        let ack: AckBody = parse(Resource::Transactions, &bytes)?;
        Ok(ack.message)
    }
}

fn parse<T: DeserializeOwned>(resource: Resource, bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Shape {
        resource,
        message: e.to_string(),
    })
}

#[async_trait]
impl RemoteStore for HttpStore {
    async fn list_transactions(&self) -> Result<Vec<Transaction>, StoreError> {
        self.list(Resource::Transactions).await
    }

    async fn create_transaction(&self, input: &NewTransaction) -> Result<Transaction, StoreError> {
        let bytes = self.send(Resource::Transactions, Method::POST, Some(input)).await?;
        parse(Resource::Transactions, &bytes)
    }

    async fn update_transaction(&self, record: &Transaction) -> Result<String, StoreError> {
        self.acknowledge(Method::PUT, record).await
    }

    async fn delete_transaction(&self, id: &str) -> Result<String, StoreError> {
        self.acknowledge(Method::DELETE, &DeleteBody { id }).await
    }

    async fn list_budgets(&self) -> Result<Vec<Budget>, StoreError> {
        self.list(Resource::Budgets).await
    }

    async fn create_budget(&self, input: &NewBudget) -> Result<Budget, StoreError> {
        let bytes = self.send(Resource::Budgets, Method::POST, Some(input)).await?;
        parse(Resource::Budgets, &bytes)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        self.list(Resource::Categories).await
    }
}

// ==================== Tests ====================

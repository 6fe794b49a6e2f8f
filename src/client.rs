//! HTTP client for the commerce admin GraphQL API.
//!
//! All traffic goes through a single authenticated endpoint; the product crawl
//! is a strictly sequential cursor loop with one request in flight.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{
    GraphQlRequest, GraphQlResponse, MetafieldsSetData, Product, ProductPage, ProductsData,
    metafield,
};

/// Products per page. The API caps connection page size well above this; 50
/// keeps the per-request query cost low enough to stay clear of throttling.
pub const PAGE_SIZE: u32 = 50;

const API_VERSION: &str = "2024-07";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PRODUCTS_QUERY: &str = r#"
query Products($first: Int!, $after: String, $namespace: String!, $key: String!) {
  products(first: $first, after: $after) {
    edges {
      node {
        id
        title
        metafield(namespace: $namespace, key: $key) { id value }
      }
    }
    pageInfo { hasNextPage endCursor }
  }
}"#;

const METAFIELDS_SET_MUTATION: &str = r#"
mutation SetZones($metafields: [MetafieldsSetInput!]!) {
  metafieldsSet(metafields: $metafields) {
    metafields { id }
    userErrors { field message }
  }
}"#;

/// Product listing and metafield writes, abstracted so driver tests can run
/// against an in-memory fixture instead of the network.
#[allow(async_fn_in_trait)]
pub trait ProductApi {
    /// Fetch one page of products, optionally after a cursor.
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<ProductPage>;

    /// Write a zone list to a product's hardiness metafield.
    async fn write_zones(&self, product: &Product, zones: &[String]) -> Result<()>;
}

/// Authenticated client for the admin GraphQL endpoint.
pub struct AdminClient {
    http: Client,
    endpoint: String,
    token: String,
}

impl AdminClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoint: format!(
                "https://{}/admin/api/{}/graphql.json",
                config.store_domain, API_VERSION
            ),
            token: config.admin_token.clone(),
        })
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("X-Shopify-Access-Token", &self.token)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Api {
                message: format!("{status}: {body}"),
            });
        }

        let envelope: GraphQlResponse<T> = serde_json::from_str(&body).map_err(|e| Error::Api {
            message: format!("malformed response: {e}"),
        })?;
        if !envelope.errors.is_empty() {
            let messages: Vec<&str> = envelope.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(Error::Api {
                message: messages.join("; "),
            });
        }
        envelope.data.ok_or_else(|| Error::Api {
            message: "response had no data".to_string(),
        })
    }
}

impl ProductApi for AdminClient {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<ProductPage> {
        let variables = serde_json::json!({
            "first": PAGE_SIZE,
            "after": cursor,
            "namespace": metafield::NAMESPACE,
            "key": metafield::KEY,
        });
        let data: ProductsData = self.graphql(PRODUCTS_QUERY, variables).await?;
        let connection = data.products;
        Ok(ProductPage {
            products: connection
                .edges
                .into_iter()
                .map(|edge| Product::from_node(edge.node))
                .collect(),
            has_next_page: connection.page_info.has_next_page,
            end_cursor: connection.page_info.end_cursor,
        })
    }

    async fn write_zones(&self, product: &Product, zones: &[String]) -> Result<()> {
        let value = serde_json::to_string(zones).map_err(|e| Error::Api {
            message: format!("failed to encode metafield value: {e}"),
        })?;
        let variables = serde_json::json!({
            "metafields": [{
                "ownerId": product.id,
                "namespace": metafield::NAMESPACE,
                "key": metafield::KEY,
                "type": metafield::VALUE_TYPE,
                "value": value,
            }]
        });
        let data: MetafieldsSetData = self.graphql(METAFIELDS_SET_MUTATION, variables).await?;
        let user_errors = data.metafields_set.user_errors;
        if !user_errors.is_empty() {
            let messages: Vec<&str> = user_errors.iter().map(|e| e.message.as_str()).collect();
            return Err(Error::Api {
                message: messages.join("; "),
            });
        }
        Ok(())
    }
}

/// Crawl every product, one page in flight at a time.
///
/// Any page failure propagates and aborts the whole crawl; callers treat
/// pagination errors as fatal.
pub async fn fetch_all_products<A: ProductApi>(api: &A) -> Result<Vec<Product>> {
    let mut products = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = api.fetch_page(cursor.as_deref()).await?;
        products.extend(page.products);
        tracing::debug!(total = products.len(), "fetched product page");
        if !page.has_next_page {
            break;
        }
        match page.end_cursor {
            Some(next) => cursor = Some(next),
            // hasNextPage without a cursor would loop on the first page forever
            None => {
                return Err(Error::Api {
                    message: "pagination reported a next page but no end cursor".to_string(),
                });
            }
        }
    }
    Ok(products)
}

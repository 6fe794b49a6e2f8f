//! Wire types for the commerce admin GraphQL API.

use serde::{Deserialize, Serialize};

/// Identity and type of the hardiness-zone metafield.
pub mod metafield {
    pub const NAMESPACE: &str = "custom";
    pub const KEY: &str = "hardiness_zones";
    /// The value is a JSON-encoded list of zone strings.
    pub const VALUE_TYPE: &str = "list.single_line_text_field";
}

/// GraphQL request envelope.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

/// GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductsData {
    pub products: ProductConnection,
}

#[derive(Debug, Deserialize)]
pub struct ProductConnection {
    pub edges: Vec<ProductEdge>,
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
pub struct ProductEdge {
    pub node: ProductNode,
}

#[derive(Debug, Deserialize)]
pub struct ProductNode {
    pub id: String,
    pub title: String,
    pub metafield: Option<MetafieldNode>,
}

#[derive(Debug, Deserialize)]
pub struct MetafieldNode {
    pub id: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "hasNextPage")]
    pub has_next_page: bool,
    #[serde(rename = "endCursor")]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MetafieldsSetData {
    #[serde(rename = "metafieldsSet")]
    pub metafields_set: MetafieldsSetPayload,
}

#[derive(Debug, Deserialize)]
pub struct MetafieldsSetPayload {
    #[serde(rename = "userErrors", default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// A product as the sync and audit drivers see it.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: String,
    pub title: String,
    /// Decoded zone list from the metafield, if present and well-formed.
    pub existing_zones: Option<Vec<String>>,
    pub metafield_id: Option<String>,
}

impl Product {
    /// Build from a GraphQL node, decoding the metafield's JSON list value.
    /// A value that does not decode as a string list is treated as absent.
    pub fn from_node(node: ProductNode) -> Self {
        let metafield_id = node.metafield.as_ref().map(|m| m.id.clone());
        let existing_zones = node
            .metafield
            .as_ref()
            .and_then(|m| serde_json::from_str::<Vec<String>>(&m.value).ok());
        Self {
            id: node.id,
            title: node.title,
            existing_zones,
            metafield_id,
        }
    }
}

/// One page of the product crawl.
#[derive(Debug)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_node_decodes_zone_list() {
        let node: ProductNode = serde_json::from_str(
            r#"{
                "id": "gid://shopify/Product/1",
                "title": "Red Maple Tree",
                "metafield": { "id": "gid://shopify/Metafield/9", "value": "[\"6\",\"7\"]" }
            }"#,
        )
        .unwrap();
        let product = Product::from_node(node);
        assert_eq!(
            product.existing_zones,
            Some(vec!["6".to_string(), "7".to_string()])
        );
        assert_eq!(product.metafield_id.as_deref(), Some("gid://shopify/Metafield/9"));
    }

    #[test]
    fn test_product_from_node_tolerates_bad_value() {
        let node: ProductNode = serde_json::from_str(
            r#"{
                "id": "gid://shopify/Product/2",
                "title": "Gift Card",
                "metafield": { "id": "gid://shopify/Metafield/10", "value": "not json" }
            }"#,
        )
        .unwrap();
        let product = Product::from_node(node);
        assert!(product.existing_zones.is_none());
        // The metafield id survives so a rewrite can still target it.
        assert!(product.metafield_id.is_some());
    }

    #[test]
    fn test_graphql_envelope_defaults() {
        let resp: GraphQlResponse<ProductsData> =
            serde_json::from_str(r#"{ "data": null }"#).unwrap();
        assert!(resp.data.is_none());
        assert!(resp.errors.is_empty());
    }
}

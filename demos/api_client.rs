/// Example HTTP client demonstrating how to call the widget-backend server API
///
/// Run the server first:
/// ```bash
/// cargo run --bin server
/// ```
///
/// Then run this example:
/// ```bash
/// cargo run --example api_client
/// ```
use serde::Deserialize;

#[derive(Deserialize, Debug)]
struct ZoneResponse {
    zip: String,
    location: String,
    zone: String,
    min: i32,
    max: i32,
}

#[derive(Deserialize, Debug)]
struct SuggestResponse {
    query: String,
    products: Vec<Suggestion>,
    collections: Vec<Suggestion>,
}

#[derive(Deserialize, Debug)]
struct Suggestion {
    title: String,
    url: String,
}

const BASE_URL: &str = "http://localhost:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();

    println!("=== Zone lookup ===");
    let zone: ZoneResponse = client
        .get(format!("{BASE_URL}/api/zone/90210"))
        .send()
        .await?
        .json()
        .await?;
    println!(
        "{} ({}): zone {} ({} to {} °F)",
        zone.zip, zone.location, zone.zone, zone.min, zone.max
    );

    println!("\n=== Search suggestions ===");
    match client
        .get(format!("{BASE_URL}/api/suggest"))
        .query(&[("q", "maple")])
        .send()
        .await?
        .error_for_status()
    {
        Ok(response) => {
            let suggest: SuggestResponse = response.json().await?;
            println!("query: {}", suggest.query);
            for product in &suggest.products {
                println!("  product: {} ({})", product.title, product.url);
            }
            for collection in &suggest.collections {
                println!("  collection: {} ({})", collection.title, collection.url);
            }
        }
        Err(e) => println!("suggest unavailable: {e}"),
    }

    Ok(())
}

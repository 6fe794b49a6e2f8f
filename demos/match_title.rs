use std::env;

use anyhow::Result;
use zonefield_rs::{PlantDatabase, extract_plant_name};

fn main() -> Result<()> {
    let titles: Vec<String> = env::args().skip(1).collect();
    let titles = if titles.is_empty() {
        vec![
            "Japanese Maple Tree - 3 Gallon Pot".to_string(),
            "Endless Summer® Hydrangea".to_string(),
            "Banana Tree".to_string(),
            "Little Red Shrub".to_string(),
        ]
    } else {
        titles
    };

    let plants = PlantDatabase::bundled()?;
    for title in &titles {
        println!("\nTitle: {title}");
        println!("  normalized: \"{}\"", extract_plant_name(title));
        match plants.match_title(title) {
            Some(m) => {
                println!(
                    "  matched: {} ({})",
                    m.matched_key.as_deref().unwrap_or("-"),
                    m.match_type
                );
                if let Some(word) = &m.matched_word {
                    println!("  via word: {word}");
                }
                println!("  zones: {}", m.zones.join(", "));
            }
            None => println!("  no match"),
        }
    }

    Ok(())
}

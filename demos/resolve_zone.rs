use std::env;

use anyhow::Result;
use zonefield_rs::{ZoneTable, describe_zip};

fn main() -> Result<()> {
    let zips: Vec<String> = env::args().skip(1).collect();
    let zips = if zips.is_empty() {
        vec!["01001".to_string(), "90210".to_string(), "00012".to_string()]
    } else {
        zips
    };

    let table = ZoneTable::bundled()?;
    for zip in &zips {
        match table.resolve(zip) {
            Some(info) => println!(
                "{zip} ({}): zone {} ({} to {} °F)",
                describe_zip(zip),
                info.zone,
                info.min,
                info.max
            ),
            None => println!("{zip}: no zone data"),
        }
    }

    Ok(())
}

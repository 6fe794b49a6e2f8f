//! City/state display for US ZIP codes, used by the CLI output.

/// Look up the city and state for a ZIP code.
pub fn lookup_zipcode(zip: &str) -> Option<(String, String)> {
    // filter_by instead of zipcodes::matching to suppress debug_print output
    let results = zipcodes::filter_by(vec![|z: &zipcodes::Zipcode| z.zip_code == zip], None).ok()?;
    let info = results.first()?;
    Some((info.city.clone(), info.state.clone()))
}

/// Human-readable place name for a ZIP, falling back to the raw ZIP.
pub fn describe_zip(zip: &str) -> String {
    match lookup_zipcode(zip) {
        Some((city, state)) => format!("{city}, {state}"),
        None => zip.to_string(),
    }
}

use serde_json::Value;

/// Strip platform link noise from a record before emission: any key ending
/// in `url` whose value is an http(s) string is removed, recursively through
/// nested objects and arrays. Nothing else is touched.
pub fn scrub_url_fields(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|key, val| {
                !(key.ends_with("url")
                    && val.as_str().is_some_and(|s| s.starts_with("http")))
            });
            for val in map.values_mut() {
                scrub_url_fields(val);
            }
        }
        Value::Array(items) => {
            for item in items {
                scrub_url_fields(item);
            }
        }
        _ => {}
    }
}

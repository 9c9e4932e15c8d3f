use std::collections::HashMap;

/// Parse a form-urlencoded body into a map of field name to values.
/// `+` is decoded as a space before percent-decoding.
pub fn parse_urlencoded_body(body: &[u8]) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    let raw = String::from_utf8_lossy(body);
    for pair in raw.split('&') {
        if pair.is_empty() { continue; }
        let mut parts = pair.splitn(2, '=');
        let key_enc = parts.next().unwrap_or("").replace('+', " ");
        let val_enc = parts.next().unwrap_or("").replace('+', " ");
        let key = urlencoding::decode(&key_enc).map(|k| k.into_owned()).unwrap_or(key_enc);
        let val = urlencoding::decode(&val_enc).map(|v| v.into_owned()).unwrap_or(val_enc);
        map.entry(key).or_default().push(val);
    }
    map
}

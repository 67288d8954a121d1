use rand::Rng;

/// Request signature: lowercase hex MD5 of `app_id + text + salt + secret_key` over UTF-8 bytes
pub fn sign(app_id: &str, text: &str, salt: &str, secret_key: &str) -> String {
    let mut data = Vec::with_capacity(app_id.len() + text.len() + salt.len() + secret_key.len());
    data.extend_from_slice(app_id.as_bytes());
    data.extend_from_slice(text.as_bytes());
    data.extend_from_slice(salt.as_bytes());
    data.extend_from_slice(secret_key.as_bytes());
    hex::encode(md5::compute(data).0)
}

/// Fresh numeric salt, drawn once per request
pub fn generate_salt() -> String {
    rand::thread_rng().gen::<u32>().to_string()
}

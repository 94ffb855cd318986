//! Object-storage URL resolution for content assets.

/// Turns object-storage keys into public URLs.
#[derive(Debug, Clone)]
pub struct AssetUrlResolver {
    public_url: String,
    bucket: String,
}

impl AssetUrlResolver {
    /// Creates a resolver for `bucket` served under `public_url`.
    #[must_use]
    pub fn new(public_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            public_url: public_url.into().trim_end_matches('/').to_owned(),
            bucket: bucket.into().trim_matches('/').to_owned(),
        }
    }

    /// Public URL of `key`. Empty keys stay empty and absolute URLs are
    /// returned unchanged.
    #[must_use]
    pub fn resolve(&self, key: &str) -> String {
        if key.is_empty() || key.starts_with("http://") || key.starts_with("https://") {
            return key.to_owned();
        }
        format!(
            "{}/{}/{}",
            self.public_url,
            self.bucket,
            key.trim_start_matches('/')
        )
    }
}

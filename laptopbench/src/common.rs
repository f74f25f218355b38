use async_trait::async_trait;

use crate::schemas::laptop::Laptop;

/// A wrapped [`reqwest::Client`].
/// Some sites require cookies, while some don't need cookies.
/// This struct takes advantage of Rust's static typing to make sure
/// that collectors that require cookies are never given a [`reqwest::Client`]
/// that does not have a cookie jar.
pub struct Client<const COOKIES: bool>(pub reqwest::Client);

impl<const COOKIES: bool> Default for Client<COOKIES> {
    fn default() -> Self {
        Self(
            reqwest::Client::builder()
                .cookie_store(COOKIES)
                .build()
                .unwrap(),
        )
    }
}

/// A producer of raw laptop records - one implementation per retail catalog
/// site. The benchmark resolver only ever sees the output of this trait, so
/// retailer-specific page layouts stay behind this seam.
#[async_trait]
pub trait LaptopSource {
    async fn collect(&self) -> anyhow::Result<Vec<Laptop>>;
}

/// Parse a numeric string that may contain grouping commas.
///
/// ```txt
/// "3,299"   -> 3299.0
/// "312.03"  -> 312.03
/// "312"     -> 312.0
/// ```
pub(crate) fn parse_grouped_number<T: AsRef<str>>(s: T) -> Option<f64> {
    s.as_ref()
        .chars()
        .filter(|c| c.is_numeric() || *c == '.')
        .collect::<String>()
        .parse::<f64>()
        .ok()
}

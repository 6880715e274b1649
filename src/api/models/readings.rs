use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ReadingsQuery {
    pub limit: Option<usize>,
}

/// `?sent=ON` after a form post redirects back to the page.
#[derive(Debug, Default, Deserialize)]
pub struct SentQuery {
    pub sent: Option<String>,
}

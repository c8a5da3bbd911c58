//! Inbound query parsing and upstream URL construction.
//!
//! [`ForwardQuery`] holds the eight recognized listing-search
//! parameters, fully populated: anything the client omits takes its
//! documented default. [`build_upstream_url`] serializes the set onto
//! the configured endpoint in a fixed order, percent-encoding every
//! value. Values are not validated beyond encoding — the upstream
//! performs its own semantic checks (a non-numeric `page` is its
//! problem, not ours), so construction is total over any inputs.

use std::collections::HashMap;

use url::Url;

/// Defaults applied to absent inbound parameters.
pub const DEFAULT_TYPE: &str = "agent";
pub const DEFAULT_ID: &str = "17248";
pub const DEFAULT_LANG: &str = "fr";
pub const DEFAULT_PAGE: &str = "1";
pub const DEFAULT_QTY: &str = "10";
pub const DEFAULT_ORDER: &str = "prix";
pub const DEFAULT_DIRECTION: &str = "desc";
pub const DEFAULT_FILTER: &str = "";

/// The listing-search parameters forwarded upstream, every field
/// present after [`from_params`](Self::from_params).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardQuery {
    pub listing_type: String,
    pub id: String,
    pub lang: String,
    pub page: String,
    pub qty: String,
    pub order: String,
    pub direction: String,
    pub filter: String,
}

impl ForwardQuery {
    /// Build a fully-populated query from the inbound parameter map.
    /// Unrecognized parameters (including `api_key`) are ignored.
    #[must_use]
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let get = |key: &str, default: &str| {
            params
                .get(key)
                .cloned()
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            listing_type: get("type", DEFAULT_TYPE),
            id: get("id", DEFAULT_ID),
            lang: get("lang", DEFAULT_LANG),
            page: get("page", DEFAULT_PAGE),
            qty: get("qty", DEFAULT_QTY),
            order: get("order", DEFAULT_ORDER),
            direction: get("direction", DEFAULT_DIRECTION),
            filter: get("filter", DEFAULT_FILTER),
        }
    }
}

/// Serialize the query onto the upstream endpoint in a fixed, stable
/// order. The `url` serializer percent-encodes reserved characters and
/// non-ASCII in every value.
#[must_use]
pub fn build_upstream_url(base: &Url, query: &ForwardQuery) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("type", &query.listing_type)
        .append_pair("id", &query.id)
        .append_pair("lang", &query.lang)
        .append_pair("page", &query.page)
        .append_pair("qty", &query.qty)
        .append_pair("order", &query.order)
        .append_pair("direction", &query.direction)
        .append_pair("filter", &query.filter);
    url
}

use http::header::{HeaderName, HeaderValue};

use crate::error::Error;

pub(crate) fn parse_header_name(name: &str) -> crate::Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|source| Error::InvalidHeaderName {
        name: name.to_owned(),
        source,
    })
}

pub(crate) fn parse_header_value(name: &str, value: &str) -> crate::Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|source| Error::InvalidHeaderValue {
        name: name.to_owned(),
        source,
    })
}

use http::header::HOST;
use http::Request;
use url::Url;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Absolute URL of the token endpoint on the host the request was sent to.
///
/// The scheme comes from `X-Forwarded-Proto` when present. Otherwise it is
/// `https`, unless TLS forcing is disabled and the request itself is not
/// `https`. Returns `None` when the request names no usable host.
pub fn build_auto_redirect_url<B>(
    request: &Request<B>,
    path: &str,
    force_tls_disabled: bool,
) -> Option<String> {
    let host = request
        .headers()
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
        .filter(|host| !host.is_empty())?;

    let forwarded = request
        .headers()
        .get(FORWARDED_PROTO)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let scheme = match forwarded {
        Some(proto) => proto.to_ascii_lowercase(),
        None if force_tls_disabled && request.uri().scheme_str() != Some("https") => {
            "http".to_string()
        }
        None => "https".to_string(),
    };

    let mut url = Url::parse(&format!("{scheme}://{host}")).ok()?;
    url.set_path(path);
    Some(url.to_string())
}

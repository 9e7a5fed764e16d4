//! Static asset route. Mounted as the router fallback, so every path other
//! than `/ws` lands here.

use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tickfeed_core::{AssetError, AssetPath};

pub async fn serve(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "GET, HEAD")],
            "405 method not allowed\n",
        )
            .into_response();
    }

    let path = match AssetPath::parse(uri.path()) {
        Ok(path) => path,
        Err(_) => return not_found(uri.path()),
    };

    // `/dir/index.html` is always addressed as `/dir/`
    if let Some(location) = path.index_redirect() {
        return redirect(&location, uri.query());
    }

    match state.assets.resolve(&path).await {
        Ok(asset) => {
            let headers = [
                (header::CONTENT_TYPE, asset.content_type()),
                (header::CONTENT_LENGTH, asset.len().to_string()),
            ];
            let body = if method == Method::HEAD {
                Body::empty()
            } else {
                Body::from(asset.data)
            };
            (headers, body).into_response()
        }
        Err(AssetError::NotFound(_)) => not_found(uri.path()),
        Err(AssetError::IsDirectory(_)) => redirect(&path.directory_location(), uri.query()),
        Err(e) => {
            tracing::error!(target: "tickfeed::assets", "Failed to serve {}: {}", uri.path(), e);
            (StatusCode::INTERNAL_SERVER_ERROR, "500 internal server error\n").into_response()
        }
    }
}

fn not_found(path: &str) -> Response {
    tracing::debug!(target: "tickfeed::assets", "No asset for {}", path);
    (StatusCode::NOT_FOUND, "404 page not found\n").into_response()
}

/// `location` comes from a normalised [`AssetPath`], so it never names
/// another host.
fn redirect(location: &str, query: Option<&str>) -> Response {
    let location = match query {
        Some(query) => format!("{location}?{query}"),
        None => location.to_string(),
    };
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}

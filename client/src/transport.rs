use std::fmt;
use std::future::Future;

use futures::future::{Either, select};
use gloo_net::http::{Request, RequestBuilder};
use gloo_storage::Storage;
use gloo_timers::future::TimeoutFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;

use hexworld_shared::api::{
    ErrorBody, GenerateRequest, GenerateResponse, SaveRequest, SaveResponse, TilesResponse,
    UpdateTileRequest, UpdateTileResponse,
};
use hexworld_shared::{Bounds, Hex, Tile, WorldMap};

/// localStorage key holding the bearer token written by the login flow.
pub const TOKEN_KEY: &str = "hexworld_token";
pub const REQUEST_TIMEOUT_MS: u32 = 15_000;

/// The single failure shape every backend call collapses into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapError {
    pub message: String,
}

impl MapError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for MapError {}

/// Backend operations the map store depends on.
pub trait MapTransport {
    fn fetch_map(&self, bounds: Option<Bounds>)
    -> impl Future<Output = Result<WorldMap, MapError>>;

    fn fetch_around(
        &self,
        center: Hex,
        radius: u32,
    ) -> impl Future<Output = Result<Vec<Tile>, MapError>>;

    fn update_tile(
        &self,
        request: UpdateTileRequest,
    ) -> impl Future<Output = Result<Tile, MapError>>;

    /// Returns the new map version.
    fn save(&self, request: SaveRequest) -> impl Future<Output = Result<u64, MapError>>;

    fn generate(&self, map_size: u32) -> impl Future<Output = Result<WorldMap, MapError>>;
}

/// JSON-over-HTTP transport for the `/api/worldmap` endpoints.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    timeout_ms: u32,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new("")
    }
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_ms: REQUEST_TIMEOUT_MS,
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let token = gloo_storage::LocalStorage::raw()
            .get_item(TOKEN_KEY)
            .ok()
            .flatten();
        builder.header("Authorization", &bearer_value(token.as_deref()))
    }

    async fn send_empty<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, MapError> {
        let request = self
            .authorized(builder)
            .build()
            .map_err(|e| MapError::new(format!("request error: {e}")))?;
        self.send(request).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        body: &B,
    ) -> Result<T, MapError> {
        let request = self
            .authorized(builder)
            .json(body)
            .map_err(|e| MapError::new(format!("request error: {e}")))?;
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: Request) -> Result<T, MapError> {
        let exchange = async {
            let resp = request
                .send()
                .await
                .map_err(|e| MapError::new(format!("fetch error: {e}")))?;
            let status = resp.status();
            let ok = resp.ok();
            // An unreadable body is handled like an empty one.
            let body = resp.text().await.unwrap_or_default();
            if !ok {
                return Err(MapError::new(ErrorBody::describe(status, &body)));
            }
            decode_body(&body)
        };

        let timeout = TimeoutFuture::new(self.timeout_ms);
        match select(Box::pin(exchange), Box::pin(timeout)).await {
            Either::Left((result, _)) => result,
            Either::Right(_) => Err(timeout_error(self.timeout_ms)),
        }
    }
}

impl MapTransport for HttpTransport {
    async fn fetch_map(&self, bounds: Option<Bounds>) -> Result<WorldMap, MapError> {
        let url = worldmap_url(&self.base_url, bounds);
        self.send_empty(Request::get(&url)).await
    }

    async fn fetch_around(&self, center: Hex, radius: u32) -> Result<Vec<Tile>, MapError> {
        let url = tiles_around_url(&self.base_url, center, radius);
        let resp: TilesResponse = self.send_empty(Request::get(&url)).await?;
        Ok(resp.tiles)
    }

    async fn update_tile(&self, request: UpdateTileRequest) -> Result<Tile, MapError> {
        let url = format!("{}/api/worldmap/tile", self.base_url);
        let resp: UpdateTileResponse = self.send_json(Request::put(&url), &request).await?;
        Ok(resp.tile)
    }

    async fn save(&self, request: SaveRequest) -> Result<u64, MapError> {
        let url = format!("{}/api/worldmap/save", self.base_url);
        let resp: SaveResponse = self.send_json(Request::post(&url), &request).await?;
        Ok(resp.version)
    }

    async fn generate(&self, map_size: u32) -> Result<WorldMap, MapError> {
        let url = format!("{}/api/worldmap/generate", self.base_url);
        let resp: GenerateResponse = self
            .send_json(Request::post(&url), &GenerateRequest { map_size })
            .await?;
        Ok(resp.world_map)
    }
}

/// `Authorization` header value. A missing token still sends the header.
pub fn bearer_value(token: Option<&str>) -> String {
    format!("Bearer {}", token.unwrap_or_default())
}

pub fn worldmap_url(base: &str, bounds: Option<Bounds>) -> String {
    let query = bounds.map(|b| b.query_string()).unwrap_or_default();
    if query.is_empty() {
        format!("{base}/api/worldmap")
    } else {
        format!("{base}/api/worldmap?{query}")
    }
}

pub fn tiles_around_url(base: &str, center: Hex, radius: u32) -> String {
    format!(
        "{base}/api/worldmap/tiles/{}/{}/{radius}",
        center.q, center.r
    )
}

/// Decode a 2xx body. Anything that is not JSON of the expected shape is an
/// error, never a silently empty map.
pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, MapError> {
    serde_json::from_str(body).map_err(|e| MapError::new(format!("unexpected response: {e}")))
}

pub fn timeout_error(timeout_ms: u32) -> MapError {
    MapError::new(format!("request timed out after {}s", timeout_ms / 1000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_value_keeps_header_without_token() {
        assert_eq!(bearer_value(Some("abc")), "Bearer abc");
        assert_eq!(bearer_value(None), "Bearer ");
    }

    #[test]
    fn worldmap_url_appends_bounds_only_when_present() {
        assert_eq!(worldmap_url("", None), "/api/worldmap");
        assert_eq!(worldmap_url("", Some(Bounds::default())), "/api/worldmap");
        assert_eq!(
            worldmap_url("http://host", Some(Bounds::new(-2, 2, -1, 1))),
            "http://host/api/worldmap?minQ=-2&maxQ=2&minR=-1&maxR=1"
        );
    }

    #[test]
    fn tiles_around_url_encodes_negative_coordinates() {
        assert_eq!(
            tiles_around_url("", Hex::new(-3, 4), 5),
            "/api/worldmap/tiles/-3/4/5"
        );
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base() {
        let transport = HttpTransport::new("http://host/");
        assert_eq!(transport.base_url, "http://host");
    }

    #[test]
    fn non_json_body_is_an_error() {
        let err = decode_body::<WorldMap>("<html>502 Bad Gateway</html>")
            .expect_err("html is not a world map");
        assert!(err.message.starts_with("unexpected response"));

        assert!(decode_body::<TilesResponse>("").is_err());
    }

    #[test]
    fn well_formed_body_decodes() {
        let world: WorldMap =
            decode_body(r#"{"tiles":[{"q":1,"r":0,"terrain":"water"}],"mapSize":12,"version":3}"#)
                .expect("valid world");
        assert_eq!(world.tiles.len(), 1);
        assert_eq!(world.map_size, 12);
        assert_eq!(world.version, 3);
    }

    #[test]
    fn timeout_message_names_the_limit() {
        assert_eq!(
            timeout_error(REQUEST_TIMEOUT_MS).message,
            "request timed out after 15s"
        );
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let err = decode_body::<SaveResponse>("{}").expect_err("version is required");
        assert!(err.message.starts_with("unexpected response"));
    }
}

use scene::ViewportBounds;
use serde::Deserialize;

use crate::client::ApiError;

#[derive(Debug, Deserialize)]
struct RegionInfoResponse {
    #[serde(default)]
    historical_info: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for `GET /api/ask_gemini/`: historical context for the visible
/// region, addressed by the four viewport corner coordinates.
#[derive(Debug, Clone)]
pub struct RegionInfoClient {
    http: reqwest::Client,
    base_url: String,
}

impl RegionInfoClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn region_info(&self, bounds: &ViewportBounds) -> Result<String, ApiError> {
        let url = format!("{}/api/ask_gemini/", self.base_url.trim_end_matches('/'));
        let body: RegionInfoResponse = self
            .http
            .get(&url)
            .query(&corner_params(bounds))
            .send()
            .await?
            .json()
            .await?;
        if let Some(error) = body.error {
            return Err(ApiError::Upstream(error));
        }
        body.historical_info
            .ok_or_else(|| ApiError::Upstream("empty region info response".to_string()))
    }
}

fn corner_params(bounds: &ViewportBounds) -> [(&'static str, f64); 8] {
    [
        ("top_left_lat", bounds.top_left.lat_deg),
        ("top_left_lon", bounds.top_left.lon_deg),
        ("top_right_lat", bounds.top_right.lat_deg),
        ("top_right_lon", bounds.top_right.lon_deg),
        ("bottom_left_lat", bounds.bottom_left.lat_deg),
        ("bottom_left_lon", bounds.bottom_left.lon_deg),
        ("bottom_right_lat", bounds.bottom_right.lat_deg),
        ("bottom_right_lon", bounds.bottom_right.lon_deg),
    ]
}

#[cfg(test)]
mod tests {
    use foundation::math::Geodetic;
    use scene::ViewportBounds;

    use super::{RegionInfoResponse, corner_params};

    #[test]
    fn all_eight_corner_params_are_present() {
        let bounds = ViewportBounds {
            top_left: Geodetic::new(4.0, -1.0, 0.0),
            top_right: Geodetic::new(4.0, 1.0, 0.0),
            bottom_left: Geodetic::new(-4.0, -1.0, 0.0),
            bottom_right: Geodetic::new(-4.0, 1.0, 0.0),
        };
        let params = corner_params(&bounds);
        assert_eq!(params.len(), 8);
        assert!(params.contains(&("top_left_lat", 4.0)));
        assert!(params.contains(&("bottom_right_lon", 1.0)));
    }

    #[test]
    fn response_parses_info_and_error_shapes() {
        let ok: RegionInfoResponse =
            serde_json::from_str(r#"{"historical_info": "Once upon a basin..."}"#).unwrap();
        assert!(ok.historical_info.is_some());

        let err: RegionInfoResponse = serde_json::from_str(r#"{"error": "quota"}"#).unwrap();
        assert_eq!(err.error.as_deref(), Some("quota"));
    }
}

//! OpenWeatherMap lookup: geocode the location, then fetch current weather.
//! Failures degrade to `None`; weather is an enrichment, never a requirement.

use reqwest::Client;
use tracing::{debug, warn};

use super::Weather;

/// Weather collaborator. Without an API key every lookup is a no-op.
pub struct WeatherClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://api.openweathermap.org".to_string(),
        }
    }

    /// Reads `OPENWEATHER_API_KEY`.
    pub fn from_env() -> Self {
        Self::new(std::env::var("OPENWEATHER_API_KEY").ok())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Current weather for a free-text location, metric units.
    pub async fn fetch(&self, location: &str) -> Option<Weather> {
        let Some(ref key) = self.api_key else {
            return None;
        };

        let geo_url = format!(
            "{}/geo/1.0/direct?q={}&limit=1&appid={}",
            self.base_url,
            urlencoding::encode(location),
            key
        );
        let geo: serde_json::Value = match self.get_json(&geo_url).await {
            Some(v) => v,
            None => return None,
        };
        let (lat, lon) = match (geo[0]["lat"].as_f64(), geo[0]["lon"].as_f64()) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                debug!("Geocoding returned no result for {}", location);
                return None;
            }
        };

        let weather_url = format!(
            "{}/data/2.5/weather?lat={}&lon={}&units=metric&appid={}",
            self.base_url, lat, lon, key
        );
        let data: serde_json::Value = self.get_json(&weather_url).await?;

        let condition = data["weather"][0]["main"].as_str()?.to_string();
        let description = data["weather"][0]["description"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        let temp = data["main"]["temp"].as_f64()?.round() as i32;

        Some(Weather {
            condition,
            temp,
            description,
        })
    }

    async fn get_json(&self, url: &str) -> Option<serde_json::Value> {
        match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => match response.json().await {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Weather response decode failed: {}", e);
                    None
                }
            },
            Ok(response) => {
                warn!("Weather request failed: {}", response.status());
                None
            }
            Err(e) => {
                warn!("Weather request error: {}", e);
                None
            }
        }
    }
}

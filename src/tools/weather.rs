//! Current weather via OpenWeatherMap.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Tool, ToolOutput};

pub const WEATHER_KEY_MISSING: &str = "Weather API key not configured";

pub struct GetWeather {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeatherReport {
    pub name: String,
    pub sys: WeatherSys,
    pub main: WeatherMain,
    pub weather: Vec<WeatherCondition>,
    pub wind: WeatherWind,
}

#[derive(Debug, Deserialize)]
pub struct WeatherSys {
    pub country: String,
}

#[derive(Debug, Deserialize)]
pub struct WeatherMain {
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Debug, Deserialize)]
pub struct WeatherCondition {
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct WeatherWind {
    pub speed: f64,
}

impl WeatherReport {
    /// Single-line human readable summary.
    pub fn describe(&self) -> String {
        let description = self
            .weather
            .first()
            .map(|c| c.description.as_str())
            .unwrap_or("unknown conditions");
        format!(
            "Weather in {}, {}: {}°C, {}, Humidity: {}%, Wind: {} m/s",
            self.name,
            self.sys.country,
            self.main.temp,
            description,
            self.main.humidity,
            self.wind.speed
        )
    }
}

impl GetWeather {
    pub fn new(http: reqwest::Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    async fn lookup(&self, location: &str, api_key: &str) -> Result<ToolOutput, reqwest::Error> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("q", location), ("appid", api_key), ("units", "metric")])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!(
                status = %response.status(),
                "Weather lookup for '{}' rejected",
                location
            );
            return Ok(ToolOutput::Failure(format!(
                "Weather data not available for {}",
                location
            )));
        }

        let report = response.json::<WeatherReport>().await?;
        Ok(ToolOutput::Success(report.describe()))
    }
}

#[async_trait]
impl Tool for GetWeather {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get current weather information for a specific location"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City name or location"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, args: Value) -> ToolOutput {
        let Some(api_key) = self.api_key.as_deref() else {
            return ToolOutput::Failure(WEATHER_KEY_MISSING.to_string());
        };
        let Some(location) = args["location"].as_str() else {
            return ToolOutput::Failure("Weather error: missing 'location' argument".to_string());
        };

        match self.lookup(location, api_key).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("Weather lookup for '{}' failed: {}", location, e);
                ToolOutput::Failure(format!("Weather error: {}", e))
            }
        }
    }
}

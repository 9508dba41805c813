use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};

use crate::http_client::http_client;
use crate::model::{
    FeatureImportance, HeatmapSample, PlayerSnapshot, PredictionInput, PredictionResponse,
};

/// The analytics backend as seen by the dashboard.
pub trait Backend: Send + Sync {
    fn player(&self, name: &str) -> Result<PlayerSnapshot>;
    fn heatmap(&self, name: &str) -> Result<HeatmapSample>;
    fn feature_importance(&self) -> Result<FeatureImportance>;
    fn predict(&self, input: &PredictionInput) -> Result<PredictionResponse>;
}

pub struct HttpBackend {
    client: &'static Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(api_base: &str) -> Result<Self> {
        let base = Url::parse(api_base).with_context(|| format!("invalid api base {api_base}"))?;
        if base.cannot_be_a_base() {
            return Err(anyhow!("api base {api_base} cannot carry a path"));
        }
        Ok(Self {
            client: http_client()?,
            base,
        })
    }

    /// Segments are percent-encoded individually.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("api base {} cannot carry a path", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get_text(&self, url: Url) -> Result<String> {
        let resp = self
            .client
            .get(url.clone())
            .header(USER_AGENT, "scout_dash")
            .header(ACCEPT, "application/json")
            .send()
            .with_context(|| format!("request failed: {url}"))?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {}: {}", status, body));
        }
        Ok(body)
    }
}

impl Backend for HttpBackend {
    fn player(&self, name: &str) -> Result<PlayerSnapshot> {
        let url = self.endpoint(&["api", "player", name])?;
        let body = self.get_text(url)?;
        parse_player_json(&body)
    }

    fn heatmap(&self, name: &str) -> Result<HeatmapSample> {
        let url = self.endpoint(&["api", "heatmap", name])?;
        let body = self.get_text(url)?;
        parse_heatmap_json(&body)
    }

    fn feature_importance(&self) -> Result<FeatureImportance> {
        let url = self.endpoint(&["api", "feature_importance"])?;
        let body = self.get_text(url)?;
        parse_feature_importance_json(&body)
    }

    fn predict(&self, input: &PredictionInput) -> Result<PredictionResponse> {
        let url = self.endpoint(&["api", "predict"])?;
        let resp = self
            .client
            .post(url.clone())
            .header(USER_AGENT, "scout_dash")
            .json(input)
            .send()
            .with_context(|| format!("request failed: {url}"))?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        // Error statuses still carry `{error}` bodies worth showing.
        match parse_prediction_json(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(anyhow!("http {}: {}", status, body)),
            Err(err) => Err(err),
        }
    }
}

pub fn parse_player_json(raw: &str) -> Result<PlayerSnapshot> {
    let snapshot: PlayerSnapshot =
        serde_json::from_str(raw.trim()).context("invalid player json")?;
    let trend = &snapshot.performance_trend;
    if trend.matches.len() != trend.ratings.len() {
        return Err(anyhow!(
            "performance trend length mismatch: matches={} ratings={}",
            trend.matches.len(),
            trend.ratings.len()
        ));
    }
    Ok(snapshot)
}

pub fn parse_heatmap_json(raw: &str) -> Result<HeatmapSample> {
    let sample: HeatmapSample = serde_json::from_str(raw.trim()).context("invalid heatmap json")?;
    if sample.x.len() != sample.y.len() {
        return Err(anyhow!(
            "heatmap length mismatch: x={} y={}",
            sample.x.len(),
            sample.y.len()
        ));
    }
    Ok(sample)
}

pub fn parse_feature_importance_json(raw: &str) -> Result<FeatureImportance> {
    let importance: FeatureImportance =
        serde_json::from_str(raw.trim()).context("invalid feature importance json")?;
    if importance.features.len() != importance.importance.len() {
        return Err(anyhow!(
            "feature importance length mismatch: features={} importance={}",
            importance.features.len(),
            importance.importance.len()
        ));
    }
    Ok(importance)
}

pub fn parse_prediction_json(raw: &str) -> Result<PredictionResponse> {
    serde_json::from_str(raw.trim()).context("invalid prediction json")
}

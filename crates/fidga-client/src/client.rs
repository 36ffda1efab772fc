use std::time::Duration;

use fidga_envelope::Payload;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::error::ClientError;
use crate::query::{GaTrafficQuery, MarketFilter};

type ApiResponse = Result<Payload<Value>, ClientError>;

/// Client for the FIDGA backend.
///
/// Every endpoint answers with the raw decoded body: an envelope passes
/// through untouched, anything else comes back as a bare value for
/// `safe_call` to wrap. Transport problems, non-envelope error statuses and
/// undecodable bodies are returned as [`ClientError`].
#[derive(Debug, Clone)]
pub struct ApiClient {
  base_url: Url,
  http: Client,
}

impl ApiClient {
  pub fn new(base_url: &str) -> Result<Self, ClientError> {
    Self::with_timeout(base_url, None)
  }

  /// Build a client whose requests give up after `timeout`.
  pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
    let base_url = parse_base_url(base_url)?;

    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
      builder = builder.timeout(timeout);
    }

    Ok(Self {
      base_url,
      http: builder.build()?,
    })
  }

  pub fn base_url(&self) -> &str {
    self.base_url.as_str().trim_end_matches('/')
  }

  // Market intelligence

  pub async fn shopify_sales(&self) -> ApiResponse {
    self.get(&["api", "shopify-sales"]).await
  }

  pub async fn social_listening(&self) -> ApiResponse {
    self.get(&["api", "social-listening"]).await
  }

  pub async fn competitor_intel(&self) -> ApiResponse {
    self.get(&["api", "competitor-intel"]).await
  }

  pub async fn competitor_intelligence(&self) -> ApiResponse {
    self.get(&["api", "competitor-intelligence"]).await
  }

  pub async fn industry_reports(&self) -> ApiResponse {
    self.get(&["api", "industry-reports"]).await
  }

  pub async fn analyze_advanced_sentiment(&self, text: &str) -> ApiResponse {
    self
      .post(&["api", "analyze-advanced-sentiment"], &json!({ "text": text }))
      .await
  }

  pub async fn trend_forecast(&self) -> ApiResponse {
    self.get(&["api", "trend-forecast"]).await
  }

  pub async fn keyword_insights_advanced(&self, keyword: &str) -> ApiResponse {
    self
      .post(&["api", "keyword-insights-advanced"], &json!({ "keyword": keyword }))
      .await
  }

  pub async fn customer_segments(&self) -> ApiResponse {
    self.get(&["api", "customer-segments"]).await
  }

  pub async fn competitive_strategy(&self) -> ApiResponse {
    self.get(&["api", "competitive-strategy"]).await
  }

  pub async fn actionable_recommendations(&self) -> ApiResponse {
    self.get(&["api", "actionable-recommendations"]).await
  }

  pub async fn market_intelligence(&self, filter: &MarketFilter) -> ApiResponse {
    self.post(&["api", "market-intelligence"], filter).await
  }

  pub async fn opportunities_llm(&self) -> ApiResponse {
    self.get(&["api", "opportunities", "llm"]).await
  }

  // Campaigns

  pub async fn create_campaign(&self, campaign: &Value) -> ApiResponse {
    self.post(&["api", "campaigns"], campaign).await
  }

  pub async fn list_campaigns(&self) -> ApiResponse {
    self.get(&["api", "campaigns"]).await
  }

  pub async fn get_campaign(&self, id: &str) -> ApiResponse {
    self.get(&["api", "campaigns", id]).await
  }

  pub async fn update_campaign(&self, id: &str, changes: &Value) -> ApiResponse {
    let (request, path) = self.request(Method::PATCH, &["api", "campaigns", id]);
    self.send(request.json(changes), &path).await
  }

  pub async fn delete_campaign(&self, id: &str) -> ApiResponse {
    let (request, path) = self.request(Method::DELETE, &["api", "campaigns", id]);
    self.send(request, &path).await
  }

  pub async fn campaign_recommendations(&self, id: &str) -> ApiResponse {
    self.get(&["api", "campaigns", id, "recommendations"]).await
  }

  pub async fn campaign_alerts(&self, id: &str) -> ApiResponse {
    self.get(&["api", "campaigns", id, "alerts"]).await
  }

  pub async fn campaign_brief(&self, brief: &Value) -> ApiResponse {
    self.post(&["api", "campaigns", "brief"], brief).await
  }

  pub async fn campaign_segments(&self, id: &str) -> ApiResponse {
    self.get(&["api", "campaigns", id, "llm-segments"]).await
  }

  pub async fn campaign_ab_tests(&self, id: &str) -> ApiResponse {
    self.get(&["api", "campaigns", id, "llm-abtests"]).await
  }

  pub async fn campaign_budget_optimization(&self, id: &str) -> ApiResponse {
    self.get(&["api", "campaigns", id, "llm-budget"]).await
  }

  pub async fn campaign_summary(&self, id: &str) -> ApiResponse {
    self.get(&["api", "campaigns", id, "llm-summary"]).await
  }

  /// Ask the backend to advance campaign statuses by date. Sends no body.
  pub async fn automate_campaign_status(&self) -> ApiResponse {
    let (request, path) = self.request(Method::POST, &["api", "campaigns", "automate-status"]);
    self.send(request, &path).await
  }

  pub async fn automate_campaign(&self, campaign: &Value) -> ApiResponse {
    self.post(&["api", "automate-campaign"], campaign).await
  }

  // Performance

  pub async fn performance_summary(&self) -> ApiResponse {
    self.get(&["api", "performance", "summary"]).await
  }

  pub async fn performance_anomalies(&self) -> ApiResponse {
    self.get(&["api", "performance", "anomalies"]).await
  }

  pub async fn performance_forecast(&self) -> ApiResponse {
    self.get(&["api", "performance", "forecast"]).await
  }

  // Content and AI services

  pub async fn generate_content(&self, request: &Value) -> ApiResponse {
    self.post(&["api", "content", "generate"], request).await
  }

  pub async fn score_content(&self, request: &Value) -> ApiResponse {
    self.post(&["api", "content", "score"], request).await
  }

  pub async fn bulk_generate_content(&self, request: &Value) -> ApiResponse {
    self.post(&["api", "content", "bulk-generate"], request).await
  }

  pub async fn ask_llm(&self, request: &Value) -> ApiResponse {
    self.post(&["api", "ask-llm"], request).await
  }

  pub async fn generate_report(&self, request: &Value) -> ApiResponse {
    self.post(&["api", "reports", "llm"], request).await
  }

  pub async fn image_caption(&self, request: &Value) -> ApiResponse {
    self.post(&["api", "image-caption"], request).await
  }

  pub async fn gemini_content(&self, request: &Value) -> ApiResponse {
    self.post(&["api", "gemini-content"], request).await
  }

  pub async fn personalized_content(&self, request: &Value) -> ApiResponse {
    self
      .post(&["api", "generate-personalized-content"], request)
      .await
  }

  pub async fn indian_languages(&self) -> ApiResponse {
    self.get(&["api", "ai-agent", "indian-languages"]).await
  }

  pub async fn process_indian_languages(&self, request: &Value) -> ApiResponse {
    self
      .post(&["api", "ai-agent", "indian-languages"], request)
      .await
  }

  pub async fn translate(&self, request: &Value) -> ApiResponse {
    self.post(&["api", "ai-agent", "translate"], request).await
  }

  // Analytics

  pub async fn ga_traffic(&self, query: &GaTrafficQuery) -> ApiResponse {
    let (request, path) = self.request(Method::GET, &["api", "ga-traffic"]);
    let pairs = query.to_pairs();
    let request = if pairs.is_empty() {
      request
    } else {
      request.query(&pairs)
    };
    self.send(request, &path).await
  }

  pub async fn ga_audience_demographics(&self) -> ApiResponse {
    self.get(&["api", "ga-audience-demographics"]).await
  }

  pub async fn ga_campaign_performance(&self) -> ApiResponse {
    self.get(&["api", "ga-campaign-performance"]).await
  }

  pub async fn ga_content_performance(&self) -> ApiResponse {
    self.get(&["api", "ga-content-performance"]).await
  }

  pub async fn analytics_mock(&self) -> ApiResponse {
    self.get(&["api", "analytics", "mock"]).await
  }

  // Business data

  pub async fn sales(&self) -> ApiResponse {
    self.get(&["api", "sales"]).await
  }

  // Feedback

  pub async fn submit_feedback(&self, feedback: &Value) -> ApiResponse {
    self.post(&["api", "feedback"], feedback).await
  }

  pub async fn submit_enhanced_feedback(&self, feedback: &Value) -> ApiResponse {
    self.post(&["api", "feedback-enhanced"], feedback).await
  }

  // System

  pub async fn health(&self) -> ApiResponse {
    self.get(&["health"]).await
  }

  pub async fn status(&self) -> ApiResponse {
    self.get(&["api", "status"]).await
  }

  async fn get(&self, segments: &[&str]) -> ApiResponse {
    let (request, path) = self.request(Method::GET, segments);
    self.send(request, &path).await
  }

  async fn post<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> ApiResponse {
    let (request, path) = self.request(Method::POST, segments);
    self.send(request.json(body), &path).await
  }

  /// Start a request; also returns the URL path for logs and errors.
  fn request(&self, method: Method, segments: &[&str]) -> (RequestBuilder, String) {
    let url = self.endpoint(segments);
    let path = url.path().to_string();
    (self.http.request(method, url), path)
  }

  fn endpoint(&self, segments: &[&str]) -> Url {
    let mut url = self.base_url.clone();
    // Base URLs are checked to be http(s) on construction, so they always
    // have path segments.
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(segments);
    }
    url
  }

  async fn send(&self, request: RequestBuilder, path: &str) -> ApiResponse {
    let response = request
      .header(reqwest::header::CONTENT_TYPE, "application/json")
      .send()
      .await?;

    let status = response.status();
    let body = response.text().await?;

    debug!(path = %path, status = status.as_u16(), bytes = body.len(), "api_response");

    decode_body(path, status, &body)
  }
}

fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
  let url = Url::parse(raw.trim()).map_err(|source| ClientError::InvalidUrl {
    url: raw.to_string(),
    source,
  })?;

  match url.scheme() {
    "http" | "https" => Ok(url),
    _ => Err(ClientError::UnsupportedScheme {
      url: raw.to_string(),
    }),
  }
}

/// Turn a response body into a payload.
///
/// An envelope is returned whatever the status, so the backend's own error
/// text reaches the caller. Otherwise error statuses become
/// [`ClientError::Status`] and undecodable 2xx bodies become
/// [`ClientError::MalformedResponse`]. An empty 2xx body decodes as null.
pub(crate) fn decode_body(path: &str, status: StatusCode, body: &str) -> ApiResponse {
  let status_error = || ClientError::Status {
    status: status.as_u16(),
    reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
  };

  if body.trim().is_empty() {
    return if status.is_success() {
      Ok(Payload::Raw(None))
    } else {
      Err(status_error())
    };
  }

  match serde_json::from_str::<Value>(body) {
    Ok(value) => {
      let payload = Payload::from(value);
      match payload {
        Payload::Enveloped(_) => Ok(payload),
        Payload::Raw(_) if status.is_success() => Ok(payload),
        Payload::Raw(_) => Err(status_error()),
      }
    }
    Err(_) if status.is_success() => Err(ClientError::MalformedResponse {
      path: path.to_string(),
    }),
    Err(_) => Err(status_error()),
  }
}

//! Tactical intel briefings
//!
//! Every few hundred points the game pauses to show a short STEM fact about
//! the enemy that was just destroyed. Briefings come from a generative model
//! when one is reachable and from a small offline table otherwise. The
//! public entry point, [`fetch_intel`], never fails.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Briefing category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Tactical Hardware")]
    TacticalHardware,
    #[serde(rename = "Future Warfare")]
    FutureWarfare,
    Aerodynamics,
    #[serde(rename = "Digital Encryption")]
    DigitalEncryption,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::TacticalHardware,
        Category::FutureWarfare,
        Category::Aerodynamics,
        Category::DigitalEncryption,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::TacticalHardware => "Tactical Hardware",
            Category::FutureWarfare => "Future Warfare",
            Category::Aerodynamics => "Aerodynamics",
            Category::DigitalEncryption => "Digital Encryption",
        }
    }
}

/// Threat rating shown next to the briefing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl ThreatLevel {
    pub const ALL: [ThreatLevel; 4] = [
        ThreatLevel::Low,
        ThreatLevel::Medium,
        ThreatLevel::High,
        ThreatLevel::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatLevel::Low => "Low",
            ThreatLevel::Medium => "Medium",
            ThreatLevel::High => "High",
            ThreatLevel::Extreme => "Extreme",
        }
    }
}

/// One intel briefing (wire shape: `{topic, fact, category, funEmoji, threatLevel}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntelBrief {
    pub topic: String,
    pub fact: String,
    pub category: Category,
    pub fun_emoji: String,
    pub threat_level: ThreatLevel,
}

/// Why a remote briefing could not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntelError {
    /// Browser reports no network
    Offline,
    /// Built without an API key
    MissingApiKey,
    /// Request never completed
    Transport(String),
    /// Upstream answered with a non-success status
    Status(u16),
    /// Upstream answered without any text
    EmptyResponse,
    /// Text did not match the briefing schema
    Malformed(String),
}

impl fmt::Display for IntelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntelError::Offline => write!(f, "network offline"),
            IntelError::MissingApiKey => write!(f, "no API key configured"),
            IntelError::Transport(e) => write!(f, "transport error: {e}"),
            IntelError::Status(code) => write!(f, "upstream returned status {code}"),
            IntelError::EmptyResponse => write!(f, "empty response"),
            IntelError::Malformed(e) => write!(f, "malformed briefing: {e}"),
        }
    }
}

impl std::error::Error for IntelError {}

impl From<reqwest::Error> for IntelError {
    fn from(e: reqwest::Error) -> Self {
        IntelError::Transport(e.to_string())
    }
}

/// Parse and validate a briefing from model output
pub fn parse_brief(text: &str) -> Result<IntelBrief, IntelError> {
    let brief: IntelBrief =
        serde_json::from_str(text).map_err(|e| IntelError::Malformed(e.to_string()))?;
    for (field, value) in [
        ("topic", &brief.topic),
        ("fact", &brief.fact),
        ("funEmoji", &brief.fun_emoji),
    ] {
        if value.trim().is_empty() {
            return Err(IntelError::Malformed(format!("blank {field}")));
        }
    }
    Ok(brief)
}

struct OfflineRecord {
    topic: &'static str,
    fact: &'static str,
    category: Category,
    fun_emoji: &'static str,
    threat_level: ThreatLevel,
}

impl OfflineRecord {
    fn to_brief(&self) -> IntelBrief {
        IntelBrief {
            topic: self.topic.to_string(),
            fact: self.fact.to_string(),
            category: self.category,
            fun_emoji: self.fun_emoji.to_string(),
            threat_level: self.threat_level,
        }
    }
}

const OFFLINE_INTEL: [OfflineRecord; 5] = [
    OfflineRecord {
        topic: "Hypersonic Flight",
        fact: "Hypersonic vehicles travel at Mach 5 or faster, more than 3,800 miles per hour. \
               This requires advanced heat shielding to survive extreme air friction.",
        category: Category::Aerodynamics,
        fun_emoji: "💨",
        threat_level: ThreatLevel::High,
    },
    OfflineRecord {
        topic: "Neural Networks",
        fact: "Modern AI uses 'Deep Learning' which is inspired by how human brains process \
               signals. This allows drones to recognize obstacles in real-time.",
        category: Category::FutureWarfare,
        fun_emoji: "🧠",
        threat_level: ThreatLevel::Medium,
    },
    OfflineRecord {
        topic: "Quantum Cryptography",
        fact: "Quantum encryption uses the laws of physics to protect data. If someone tries \
               to spy on a quantum key, the signal physically changes, alerting the owner.",
        category: Category::DigitalEncryption,
        fun_emoji: "🔐",
        threat_level: ThreatLevel::Extreme,
    },
    OfflineRecord {
        topic: "Composite Armor",
        fact: "Modern vehicle protection uses layers of ceramics and steel. Ceramics break \
               down the force of a projectile, while steel catches the fragments.",
        category: Category::TacticalHardware,
        fun_emoji: "🛡️",
        threat_level: ThreatLevel::Low,
    },
    OfflineRecord {
        topic: "Lidar Navigation",
        fact: "Lidar sends out millions of laser pulses per second to create a 3D map of the \
               environment, allowing vehicles to see through smoke and dust.",
        category: Category::TacticalHardware,
        fun_emoji: "🔦",
        threat_level: ThreatLevel::Medium,
    },
];

/// The full offline table
pub fn offline_briefs() -> Vec<IntelBrief> {
    OFFLINE_INTEL.iter().map(OfflineRecord::to_brief).collect()
}

/// Pick an offline briefing uniformly at random
pub fn fallback_brief(rng: &mut impl Rng) -> IntelBrief {
    OFFLINE_INTEL[rng.random_range(0..OFFLINE_INTEL.len())].to_brief()
}

/// Anything that can produce a briefing for a topic
#[allow(async_fn_in_trait)]
pub trait IntelSource {
    async fn request(&self, topic: &str) -> Result<IntelBrief, IntelError>;
}

/// Fetch a briefing for `topic`, substituting offline intel on any failure.
///
/// Single attempt, no retries.
pub async fn fetch_intel(
    source: &impl IntelSource,
    topic: &str,
    rng: &mut impl Rng,
) -> IntelBrief {
    match source.request(topic).await {
        Ok(brief) => {
            log::info!("Intel received for {}: {}", topic, brief.topic);
            brief
        }
        Err(IntelError::Offline) | Err(IntelError::MissingApiKey) => {
            log::info!("Using offline intel for {}", topic);
            fallback_brief(rng)
        }
        Err(e) => {
            log::warn!("Intel request failed, falling back to local intel: {}", e);
            fallback_brief(rng)
        }
    }
}

/// Remote generation settings
#[derive(Debug, Clone)]
pub struct IntelConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl Default for IntelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-3-flash-preview".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

impl IntelConfig {
    /// Config with the API key baked in at build time (`API_KEY`)
    pub fn from_build_env() -> Self {
        Self {
            api_key: option_env!("API_KEY")
                .filter(|k| !k.is_empty())
                .map(str::to_string),
            ..Default::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .find_map(|p| p.text.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

/// Thin reqwest client for the Gemini `generateContent` endpoint
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: IntelConfig,
}

impl GeminiClient {
    pub fn new(config: IntelConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn prompt(topic: &str) -> String {
        format!(
            "Generate a 'Tactical Intelligence Briefing' for a commander about the real-world \
             science or technology behind: {topic}. Make it sound like a modern combat intel \
             report. Use STEM principles (physics, engineering, tech). Keep it professional \
             but exciting for kids."
        )
    }

    fn request_body(topic: &str) -> serde_json::Value {
        let categories: Vec<&str> = Category::ALL.iter().map(Category::as_str).collect();
        let threats: Vec<&str> = ThreatLevel::ALL.iter().map(ThreatLevel::as_str).collect();
        json!({
            "contents": [{ "parts": [{ "text": Self::prompt(topic) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "topic": { "type": "STRING" },
                        "fact": { "type": "STRING" },
                        "category": { "type": "STRING", "enum": categories },
                        "funEmoji": { "type": "STRING" },
                        "threatLevel": { "type": "STRING", "enum": threats }
                    },
                    "required": ["topic", "fact", "category", "funEmoji", "threatLevel"]
                }
            }
        })
    }
}

impl IntelSource for GeminiClient {
    async fn request(&self, topic: &str) -> Result<IntelBrief, IntelError> {
        if !is_online() {
            return Err(IntelError::Offline);
        }
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(IntelError::MissingApiKey)?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint, self.config.model
        );
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&Self::request_body(topic))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IntelError::Status(response.status().as_u16()));
        }

        let body = response.json::<GenerateResponse>().await?;
        let text = body.text().ok_or(IntelError::EmptyResponse)?;
        parse_brief(text)
    }
}

/// Whether the platform believes it has network access
#[cfg(target_arch = "wasm32")]
pub fn is_online() -> bool {
    web_sys::window()
        .map(|w| w.navigator().on_line())
        .unwrap_or(false)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn is_online() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Scripted(Result<IntelBrief, IntelError>);

    impl IntelSource for Scripted {
        async fn request(&self, _topic: &str) -> Result<IntelBrief, IntelError> {
            self.0.clone()
        }
    }

    fn sample() -> IntelBrief {
        IntelBrief {
            topic: "EMP Hardening".to_string(),
            fact: "Faraday cages redirect electromagnetic pulses around electronics.".to_string(),
            category: Category::TacticalHardware,
            fun_emoji: "⚡".to_string(),
            threat_level: ThreatLevel::High,
        }
    }

    #[test]
    fn test_wire_format_uses_camel_case_and_labels() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["funEmoji"], "⚡");
        assert_eq!(value["threatLevel"], "High");
        assert_eq!(value["category"], "Tactical Hardware");
    }

    #[test]
    fn test_parse_rejects_out_of_range_enums() {
        let text = r#"{"topic":"A","fact":"B","category":"Space Lasers","funEmoji":"x","threatLevel":"Low"}"#;
        assert!(matches!(parse_brief(text), Err(IntelError::Malformed(_))));

        let text = r#"{"topic":"A","fact":"B","category":"Aerodynamics","funEmoji":"x","threatLevel":"Apocalyptic"}"#;
        assert!(matches!(parse_brief(text), Err(IntelError::Malformed(_))));
    }

    #[test]
    fn test_parse_rejects_missing_or_blank_fields() {
        let text = r#"{"topic":"A","category":"Aerodynamics","funEmoji":"x","threatLevel":"Low"}"#;
        assert!(matches!(parse_brief(text), Err(IntelError::Malformed(_))));

        let text = r#"{"topic":" ","fact":"B","category":"Aerodynamics","funEmoji":"x","threatLevel":"Low"}"#;
        assert!(matches!(parse_brief(text), Err(IntelError::Malformed(_))));

        assert!(matches!(parse_brief("not json"), Err(IntelError::Malformed(_))));
    }

    #[test]
    fn test_parse_rejects_blank_emoji() {
        let text = r#"{"topic":"A","fact":"B","category":"Aerodynamics","funEmoji":"","threatLevel":"Low"}"#;
        assert_eq!(
            parse_brief(text),
            Err(IntelError::Malformed("blank funEmoji".to_string()))
        );

        let text = r#"{"topic":"A","fact":"B","category":"Aerodynamics","funEmoji":"  ","threatLevel":"Low"}"#;
        assert!(matches!(parse_brief(text), Err(IntelError::Malformed(_))));
    }

    #[test]
    fn test_parse_accepts_valid_brief() {
        let text = serde_json::to_string(&sample()).unwrap();
        assert_eq!(parse_brief(&text).unwrap(), sample());
    }

    #[test]
    fn test_successful_source_passes_through() {
        let mut rng = Pcg32::seed_from_u64(1);
        let brief = block_on(fetch_intel(&Scripted(Ok(sample())), "EMP Sentry Bot", &mut rng));
        assert_eq!(brief, sample());
    }

    #[test]
    fn test_every_failure_falls_back_to_offline_table() {
        let offline = offline_briefs();
        let failures = [
            IntelError::Offline,
            IntelError::MissingApiKey,
            IntelError::Transport("reset".to_string()),
            IntelError::Status(503),
            IntelError::EmptyResponse,
            IntelError::Malformed("eof".to_string()),
        ];
        let mut rng = Pcg32::seed_from_u64(7);

        for failure in failures {
            let brief = block_on(fetch_intel(&Scripted(Err(failure)), "Tactical Walker", &mut rng));
            assert!(offline.contains(&brief));
            assert!(!brief.topic.is_empty());
            assert!(!brief.fact.is_empty());
            assert!(!brief.fun_emoji.is_empty());
        }
    }

    #[test]
    fn test_fallback_covers_whole_table() {
        let mut rng = Pcg32::seed_from_u64(99);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(fallback_brief(&mut rng).topic);
        }
        assert_eq!(seen.len(), OFFLINE_INTEL.len());
    }

    #[test]
    fn test_client_without_key_uses_fallback() {
        let client = GeminiClient::new(IntelConfig::default());
        let mut rng = Pcg32::seed_from_u64(3);
        let brief = block_on(fetch_intel(&client, "Stealth Predator", &mut rng));
        assert!(offline_briefs().contains(&brief));
    }

    #[test]
    fn test_request_body_declares_schema() {
        let body = GeminiClient::request_body("X-1 Recon Drone");
        let schema = &body["generationConfig"]["responseSchema"];
        assert_eq!(schema["required"].as_array().unwrap().len(), 5);
        assert_eq!(schema["properties"]["category"]["enum"][0], "Tactical Hardware");
        assert!(
            body["contents"][0]["parts"][0]["text"]
                .as_str()
                .unwrap()
                .contains("X-1 Recon Drone")
        );
    }

    #[test]
    fn test_response_text_extraction() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"{}"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.text(), Some("{}"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert_eq!(empty.text(), None);
    }
}

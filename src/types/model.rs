use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies the model the completion service should use.
///
/// This can be a predefined model name or a custom string value for models
/// the client does not know about (fine-tunes, local servers, new releases).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Model {
    /// Known model names
    Known(KnownModel),

    /// Custom model identifier
    Custom(String),
}

/// Known chat completion models.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownModel {
    /// The model currently behind ChatGPT.
    #[serde(rename = "chatgpt-4o-latest")]
    ChatGpt4oLatest,

    /// GPT-4o
    #[serde(rename = "gpt-4o")]
    Gpt4o,

    /// GPT-4o mini
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini,

    /// GPT-4.1
    #[serde(rename = "gpt-4.1")]
    Gpt41,

    /// GPT-4.1 mini
    #[serde(rename = "gpt-4.1-mini")]
    Gpt41Mini,

    /// GPT-4.1 nano
    #[serde(rename = "gpt-4.1-nano")]
    Gpt41Nano,

    /// o3-mini
    #[serde(rename = "o3-mini")]
    O3Mini,
}

impl KnownModel {
    const ALL: [KnownModel; 7] = [
        KnownModel::ChatGpt4oLatest,
        KnownModel::Gpt4o,
        KnownModel::Gpt4oMini,
        KnownModel::Gpt41,
        KnownModel::Gpt41Mini,
        KnownModel::Gpt41Nano,
        KnownModel::O3Mini,
    ];

    /// The identifier sent over the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownModel::ChatGpt4oLatest => "chatgpt-4o-latest",
            KnownModel::Gpt4o => "gpt-4o",
            KnownModel::Gpt4oMini => "gpt-4o-mini",
            KnownModel::Gpt41 => "gpt-4.1",
            KnownModel::Gpt41Mini => "gpt-4.1-mini",
            KnownModel::Gpt41Nano => "gpt-4.1-nano",
            KnownModel::O3Mini => "o3-mini",
        }
    }
}

impl Model {
    /// The identifier sent over the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Model::Known(known) => known.as_str(),
            Model::Custom(custom) => custom,
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Known(KnownModel::ChatGpt4oLatest)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for KnownModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Model {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(KnownModel::ALL
            .iter()
            .find(|known| known.as_str() == s)
            .map(|known| Model::Known(*known))
            .unwrap_or_else(|| Model::Custom(s.to_string())))
    }
}

impl From<KnownModel> for Model {
    fn from(model: KnownModel) -> Self {
        Model::Known(model)
    }
}

impl From<&str> for Model {
    fn from(model: &str) -> Self {
        match model.parse() {
            Ok(model) => model,
            Err(never) => match never {},
        }
    }
}

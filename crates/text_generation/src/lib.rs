//! Icebreakers and end-of-daily summaries from an external text model.
//!
//! Every call is best-effort: failures are logged and replaced by a fixed
//! localized string, so callers always get something to show.

use std::{fmt, str::FromStr, sync::Arc};

use async_trait::async_trait;
use shared::domain::DailyUpdate;
use tracing::{debug, warn};

mod gemini;

pub use gemini::{GeminiGenerator, DEFAULT_GEMINI_MODEL};

const ICEBREAKER_TEMPERATURE: f32 = 0.8;
const SUMMARY_TEMPERATURE: f32 = 0.5;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, temperature: f32) -> anyhow::Result<String>;
}

/// Used when no model is configured; every call falls back.
pub struct NoopGenerator;

#[async_trait]
impl TextGenerator for NoopGenerator {
    async fn generate(&self, _prompt: &str, _temperature: f32) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("text generation is not configured"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    PtBr,
    En,
}

impl FromStr for Locale {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pt" | "pt-br" | "pt_br" => Ok(Self::PtBr),
            "en" | "en-us" | "en_us" => Ok(Self::En),
            other => Err(anyhow::anyhow!("unsupported locale '{other}'")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PtBr => f.write_str("pt-BR"),
            Self::En => f.write_str("en"),
        }
    }
}

impl Locale {
    pub fn icebreaker_fallback(self) -> &'static str {
        match self {
            Self::PtBr => "Qual é a boa de hoje?",
            Self::En => "What's new today?",
        }
    }

    pub fn summary_fallback(self) -> &'static str {
        match self {
            Self::PtBr => "Não foi possível gerar o resumo automático no momento.",
            Self::En => "The automatic summary could not be generated right now.",
        }
    }

    pub fn no_updates(self) -> &'static str {
        match self {
            Self::PtBr => "Nenhuma anotação registrada nesta daily.",
            Self::En => "No notes were recorded in this daily.",
        }
    }

    fn default_role(self) -> &'static str {
        match self {
            Self::PtBr => "membro da equipe",
            Self::En => "team member",
        }
    }

    fn icebreaker_prompt(self, member_name: &str, role: &str) -> String {
        match self {
            Self::PtBr => format!(
                "Gere uma pergunta de \"quebra-gelo\" (icebreaker) curta e divertida em português \
                 para o(a) {member_name}, que atua como {role} na daily de hoje. A pergunta deve \
                 ser leve e ajudar a começar a reunião com energia positiva."
            ),
            Self::En => format!(
                "Write a short, fun icebreaker question in English for {member_name}, who works \
                 as {role}, for today's daily standup. Keep it light and help the meeting start \
                 with positive energy."
            ),
        }
    }

    fn summary_prompt(self, context: &str) -> String {
        match self {
            Self::PtBr => format!(
                "Abaixo estão as notas da nossa reunião diária (daily). Por favor, resuma os \
                 pontos principais, demandas críticas e novidades compartilhadas em português de \
                 forma concisa e profissional: {context}"
            ),
            Self::En => format!(
                "Below are the notes from our daily standup. Summarize the main points, critical \
                 demands, and news shared, in English, concisely and professionally: {context}"
            ),
        }
    }
}

#[derive(Clone)]
pub struct DailyAssistant {
    generator: Arc<dyn TextGenerator>,
    locale: Locale,
}

impl DailyAssistant {
    pub fn new(generator: Arc<dyn TextGenerator>, locale: Locale) -> Self {
        Self { generator, locale }
    }

    pub fn offline(locale: Locale) -> Self {
        Self::new(Arc::new(NoopGenerator), locale)
    }

    pub async fn icebreaker(&self, member_name: &str, role: Option<&str>) -> String {
        let role = role
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| self.locale.default_role());
        let prompt = self.locale.icebreaker_prompt(member_name, role);
        self.generate_or(&prompt, ICEBREAKER_TEMPERATURE, self.locale.icebreaker_fallback())
            .await
    }

    pub async fn summarize(&self, updates: &[DailyUpdate]) -> String {
        if updates.is_empty() {
            return self.locale.no_updates().to_string();
        }
        let context = match serde_json::to_string(updates) {
            Ok(context) => context,
            Err(err) => {
                warn!(error = %err, "failed to encode daily updates");
                return self.locale.summary_fallback().to_string();
            }
        };
        let prompt = self.locale.summary_prompt(&context);
        self.generate_or(&prompt, SUMMARY_TEMPERATURE, self.locale.summary_fallback())
            .await
    }

    async fn generate_or(&self, prompt: &str, temperature: f32, fallback: &str) -> String {
        match self.generator.generate(prompt, temperature).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!(chars = text.len(), "text generated");
                text.trim().to_string()
            }
            Ok(_) => {
                warn!("text generator returned an empty response, using fallback");
                fallback.to_string()
            }
            Err(err) => {
                warn!(error = %err, "text generation failed, using fallback");
                fallback.to_string()
            }
        }
    }
}

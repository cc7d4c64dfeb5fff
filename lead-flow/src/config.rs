//! Assistant configuration.
//!
//! Every script line, reply pool, section boundary, delay and chart table is data. The
//! defaults reproduce the site's own script; a YAML file can override any part of it:
//!
//! ```yaml
//! persona: Machado
//! timing:
//!   reduced_motion: true
//! replies:
//!   contextual:
//!     lots:
//!       - "Posso explicar as vantagens de cada setor!"
//! ```

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    chart::{ChartDatasets, Horizon},
    error::{FlowError, Result},
    section::Section,
    tracker::SectionBounds,
};

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "LEAD_FLOW_CONFIG";

/// Placeholder replaced with the visitor's name in `script.name_reply`
pub const NAME_PLACEHOLDER: &str = "{name}";

/// Placeholder replaced with `persona` in `script.welcome`
pub const PERSONA_PLACEHOLDER: &str = "{persona}";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Display name of the digital broker
    pub persona: String,
    pub script: ScriptConfig,
    pub replies: ReplyPools,
    pub layout: SectionLayout,
    pub timing: TimingConfig,
    /// Fixed seed for reply selection and delay jitter; random when absent
    pub seed: Option<u64>,
    pub charts: ChartDatasets,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            persona: "Machado".to_string(),
            script: ScriptConfig::default(),
            replies: ReplyPools::default(),
            layout: SectionLayout::default(),
            timing: TimingConfig::default(),
            seed: None,
            charts: ChartDatasets::default(),
        }
    }
}

impl AssistantConfig {
    /// Load and validate a YAML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| FlowError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&raw)?;
        info!(path = %path.display(), "loaded assistant config");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path first, then `LEAD_FLOW_CONFIG`, then the built-in defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        match path {
            Some(path) => Self::load(path),
            None => {
                info!("no config file given, using built-in script");
                Ok(Self::default())
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.replies.general.is_empty() {
            return Err(FlowError::InvalidConfig(
                "replies.general must not be empty".to_string(),
            ));
        }
        if let Some((section, _)) = self
            .replies
            .contextual
            .iter()
            .find(|(_, pool)| pool.is_empty())
        {
            return Err(FlowError::InvalidConfig(format!(
                "replies.contextual.{section} must not be empty"
            )));
        }

        for (key, line) in [
            ("script.welcome", &self.script.welcome),
            ("script.name_reply", &self.script.name_reply),
            ("script.phone_reply", &self.script.phone_reply),
            ("script.email_reply", &self.script.email_reply),
        ] {
            if line.trim().is_empty() {
                return Err(FlowError::InvalidConfig(format!("{key} must not be empty")));
            }
        }
        if !self.script.name_reply.contains(NAME_PLACEHOLDER) {
            warn!("script.name_reply has no {NAME_PLACEHOLDER} placeholder");
        }

        if !self.layout.lookahead.is_finite() {
            return Err(FlowError::InvalidConfig(
                "layout.lookahead must be a finite number".to_string(),
            ));
        }
        for bounds in &self.layout.sections {
            if bounds.height.is_some_and(|h| !h.is_finite() || h < 0.0) {
                return Err(FlowError::InvalidConfig(format!(
                    "layout height for {} must be a non-negative number",
                    bounds.section
                )));
            }
        }

        for horizon in Horizon::ALL {
            if self.charts.rows(horizon).is_empty() {
                return Err(FlowError::InvalidConfig(format!(
                    "charts table for {horizon} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

/// Fixed lines of the lead-capture script
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub welcome: String,
    pub name_reply: String,
    pub phone_reply: String,
    pub email_reply: String,
}

impl ScriptConfig {
    pub fn welcome_for(&self, persona: &str) -> String {
        self.welcome.replace(PERSONA_PLACEHOLDER, persona)
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            welcome: "🤖 Olá! Sou o {persona}, seu corretor digital especializado em lotes industriais. Para oferecer o melhor atendimento, preciso conhecer você melhor. Poderia me informar seu nome?".to_string(),
            name_reply: "Prazer em conhecer você, {name}! Agora, para mantermos contato, poderia me passar seu número de WhatsApp?".to_string(),
            phone_reply: "Ótimo! Por último, qual é o seu melhor e-mail para receber nossas comunicações?".to_string(),
            email_reply: "Perfeito! Agora podemos continuar nossa conversa. Como posso ajudar você hoje? 🎉".to_string(),
        }
    }
}

/// Canned replies for free-form chat and per-section nudges
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyPools {
    pub general: Vec<String>,
    pub contextual: BTreeMap<Section, Vec<String>>,
}

impl Default for ReplyPools {
    fn default() -> Self {
        let general = [
            "🎯 Entendo sua necessidade! Com base no que você me contou, recomendo analisar os lotes do Setor A ou C.",
            "💡 Excelente pergunta! Nossa equipe técnica pode fornecer todos os detalhes sobre infraestrutura.",
            "📅 Posso agendar uma visita técnica gratuita para você. Qual seria o melhor dia da semana?",
            "💰 Temos condições especiais de pagamento para empresários. Gostaria de conhecer as opções?",
            "🎉 Baseado no seu perfil, acredito que temos a solução ideal. Vou conectar você com nosso especialista.",
            "📈 Ótima escolha! Este tipo de investimento tem se valorizado muito na região.",
            "📊 Posso preparar um relatório personalizado com projeções financeiras. Seria útil?",
            "⚖️ Nossa equipe jurídica garante toda a documentação regularizada. Isso é importante para você?",
        ];

        let contextual = [
            (
                Section::Home,
                [
                    "👋 Vejo que você está na página inicial! Posso ajudá-lo a encontrar o lote industrial perfeito para seu negócio!",
                    "🏭 Que tipo de indústria você pretende instalar? Isso me ajudará a recomendar o melhor lote.",
                    "💼 Você já tem experiência com investimentos industriais? Posso personalizar minhas sugestões!",
                ],
            ),
            (
                Section::Lots,
                [
                    "🎯 Vejo que você está analisando nossos lotes disponíveis. Posso explicar as vantagens de cada setor!",
                    "📏 Qual é o tamanho ideal de lote para sua operação industrial?",
                    "💰 Gostaria de saber sobre as condições de financiamento disponíveis? Temos ótimas opções!",
                ],
            ),
            (
                Section::Advantages,
                [
                    "⭐ Excelente! Você está conhecendo nossos diferenciais. Qual benefício mais chamou sua atenção?",
                    "🔌 A infraestrutura completa é um dos nossos maiores atrativos. Tem alguma dúvida específica?",
                    "📅 Posso agendar uma visita técnica para você conhecer pessoalmente?",
                ],
            ),
            (
                Section::Location,
                [
                    "🗺️ A localização é estratégica mesmo! Sua empresa precisa de acesso específico a alguma rodovia?",
                    "🚛 Que tipo de logística sua indústria vai precisar? Posso mostrar as melhores rotas.",
                    "⏱️ Gostaria de saber sobre o tempo de deslocamento para fornecedores da região?",
                ],
            ),
            (
                Section::Contact,
                [
                    "🚀 Ótimo! Vejo que está pronto para dar o próximo passo. Como posso ajudá-lo?",
                    "🤝 Prefere agendar uma reunião presencial ou uma apresentação online?",
                    "📊 Posso preparar uma análise personalizada de investimento para você!",
                ],
            ),
        ];

        Self {
            general: general.iter().map(|s| s.to_string()).collect(),
            contextual: contextual
                .into_iter()
                .map(|(section, lines)| (section, lines.iter().map(|s| s.to_string()).collect()))
                .collect(),
        }
    }
}

/// Vertical layout of the page, in pixels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionLayout {
    /// Added to the scroll offset before matching, so a section counts as active a
    /// little before its top reaches the viewport edge
    pub lookahead: f64,
    /// Scanned in order; first match wins
    pub sections: Vec<SectionBounds>,
}

impl Default for SectionLayout {
    fn default() -> Self {
        let sections = [
            (Section::Home, 0.0, 900.0),
            (Section::Lots, 900.0, 1400.0),
            (Section::Advantages, 2300.0, 1000.0),
            (Section::Location, 3300.0, 1100.0),
            (Section::Contact, 4400.0, 1000.0),
        ];
        Self {
            lookahead: 200.0,
            sections: sections
                .into_iter()
                .map(|(section, start, height)| SectionBounds::new(section, start, height))
                .collect(),
        }
    }
}

/// Simulated typing delays, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub welcome_ms: u64,
    pub reply_base_ms: u64,
    /// Upper bound of the random extra added to each reply
    pub reply_jitter_ms: u64,
    /// Pause before the typing indicator of a nudge shows up
    pub nudge_lead_in_ms: u64,
    pub nudge_typing_ms: u64,
    /// Minimum time between two scheduled nudges
    pub nudge_cooldown_ms: u64,
    /// Shorter, fixed delays for visitors who prefer reduced motion
    pub reduced_motion: bool,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            welcome_ms: 1500,
            reply_base_ms: 1500,
            reply_jitter_ms: 1000,
            nudge_lead_in_ms: 1500,
            nudge_typing_ms: 2000,
            nudge_cooldown_ms: 3500,
            reduced_motion: false,
        }
    }
}

const REDUCED_WELCOME: Duration = Duration::from_millis(100);
const REDUCED_REPLY: Duration = Duration::from_millis(300);

impl TimingConfig {
    pub fn welcome_delay(&self) -> Duration {
        if self.reduced_motion {
            REDUCED_WELCOME
        } else {
            Duration::from_millis(self.welcome_ms)
        }
    }

    pub fn reply_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.reduced_motion {
            return REDUCED_REPLY;
        }
        let jitter = if self.reply_jitter_ms == 0 {
            0
        } else {
            rng.random_range(0..=self.reply_jitter_ms)
        };
        Duration::from_millis(self.reply_base_ms.saturating_add(jitter))
    }

    pub fn nudge_delay(&self) -> Duration {
        if self.reduced_motion {
            REDUCED_REPLY
        } else {
            Duration::from_millis(self.nudge_lead_in_ms.saturating_add(self.nudge_typing_ms))
        }
    }

    pub fn nudge_cooldown(&self) -> Duration {
        Duration::from_millis(self.nudge_cooldown_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AssistantConfig::default();
        config.validate().unwrap();
        assert_eq!(config.replies.general.len(), 8);
        assert_eq!(config.replies.contextual.len(), Section::ALL.len());
        assert!(config.replies.contextual.values().all(|pool| pool.len() == 3));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AssistantConfig::from_yaml(
            r#"
persona: Ana
seed: 7
timing:
  reduced_motion: true
replies:
  contextual:
    lotes:
      - "Quer ver os lotes do Setor D?"
"#,
        )
        .unwrap();

        assert_eq!(config.persona, "Ana");
        assert_eq!(config.seed, Some(7));
        assert!(config.timing.reduced_motion);
        assert_eq!(config.timing.welcome_ms, 1500);
        assert_eq!(config.replies.general.len(), 8);
        assert_eq!(
            config.replies.contextual.get(&Section::Lots).unwrap(),
            &vec!["Quer ver os lotes do Setor D?".to_string()]
        );
        assert!(!config.replies.contextual.contains_key(&Section::Home));
        assert!(config.script.welcome_for(&config.persona).contains("Sou o Ana,"));
    }

    #[test]
    fn test_empty_general_pool_is_rejected() {
        let result = AssistantConfig::from_yaml("replies:\n  general: []\n");
        assert!(matches!(result, Err(FlowError::InvalidConfig(_))));
    }

    #[test]
    fn test_empty_contextual_pool_is_rejected() {
        let result = AssistantConfig::from_yaml("replies:\n  contextual:\n    contact: []\n");
        assert!(matches!(result, Err(FlowError::InvalidConfig(_))));
    }

    #[test]
    fn test_yaml_round_trip_of_defaults() {
        let yaml = AssistantConfig::default().to_yaml().unwrap();
        let parsed = AssistantConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.script.welcome, ScriptConfig::default().welcome);
        assert_eq!(parsed.layout.sections.len(), 5);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "persona: Bia").unwrap();

        let config = AssistantConfig::load(file.path()).unwrap();
        assert_eq!(config.persona, "Bia");

        let missing = AssistantConfig::load("/definitely/not/here.yaml");
        assert!(matches!(missing, Err(FlowError::ConfigRead { .. })));
    }

    #[test]
    fn test_reply_delay_bounds() {
        let timing = TimingConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let delay = timing.reply_delay(&mut rng);
            assert!(delay >= Duration::from_millis(1500));
            assert!(delay <= Duration::from_millis(2500));
        }

        let reduced = TimingConfig {
            reduced_motion: true,
            ..TimingConfig::default()
        };
        assert_eq!(reduced.reply_delay(&mut rng), Duration::from_millis(300));
        assert_eq!(reduced.welcome_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_extreme_timing_saturates() {
        let config = AssistantConfig::from_yaml(
            "timing:\n  reply_base_ms: 18446744073709551615\n  nudge_lead_in_ms: 18446744073709551615\n",
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            assert_eq!(
                config.timing.reply_delay(&mut rng),
                Duration::from_millis(u64::MAX)
            );
        }
        assert_eq!(config.timing.nudge_delay(), Duration::from_millis(u64::MAX));
    }
}

//! First-run data.

use castroom_common::AppResult;
use castroom_db::entities::situation::TimeBand;
use castroom_db::repositories::{PersonaRepository, SituationRepository};
use serde::Serialize;

use super::persona::{CreatePersonaInput, PersonaProfile, PersonaService};
use super::settings::SettingsService;
use super::situation::{CreateSituationInput, SituationService};

/// Category the default situations live in.
pub const DEFAULT_CATEGORY: &str = "daily";

const DEFAULT_SITUATIONS: &[(&str, TimeBand)] = &[
    ("静かな雨が降る夜", TimeBand::Evening),
    ("気持ちの良い秋晴れの昼下がり", TimeBand::Midday),
    ("お気に入りの喫茶店で読書中", TimeBand::Anytime),
    ("フィルムカメラ片手に散歩中", TimeBand::Anytime),
    ("少しセンチメンタルな気分", TimeBand::Evening),
    ("新しいことを始めたくなるワクワク感", TimeBand::Morning),
];

/// What a seeding run added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub settings: usize,
    pub categories: usize,
    pub situations: usize,
    pub personas: usize,
}

/// Seeds an empty database. Running it again adds nothing.
#[derive(Clone)]
pub struct SeedService {
    settings: SettingsService,
    situations: SituationService,
    personas: PersonaService,
    situation_repo: SituationRepository,
    persona_repo: PersonaRepository,
}

impl SeedService {
    /// Create a new seed service.
    #[must_use]
    pub const fn new(
        settings: SettingsService,
        situations: SituationService,
        personas: PersonaService,
        situation_repo: SituationRepository,
        persona_repo: PersonaRepository,
    ) -> Self {
        Self {
            settings,
            situations,
            personas,
            situation_repo,
            persona_repo,
        }
    }

    /// Insert default settings, the default category with its situations,
    /// and a sample persona, each only when missing.
    pub async fn seed_defaults(&self) -> AppResult<SeedReport> {
        let mut report = SeedReport {
            settings: self.settings.ensure_defaults().await?,
            ..SeedReport::default()
        };

        let category = match self
            .situation_repo
            .find_category_by_name(DEFAULT_CATEGORY)
            .await?
        {
            Some(category) => category,
            None => {
                report.categories += 1;
                self.situations.create_category(DEFAULT_CATEGORY).await?
            }
        };

        if self.situation_repo.find_all(None).await?.is_empty() {
            for (content, band) in DEFAULT_SITUATIONS {
                self.situations
                    .create(CreateSituationInput {
                        content: (*content).to_string(),
                        time_band: *band,
                        category_id: category.id.clone(),
                    })
                    .await?;
                report.situations += 1;
            }
        }

        if self.persona_repo.count().await? == 0 {
            self.personas.create(default_persona(&category.id)).await?;
            report.personas += 1;
        }

        if report != SeedReport::default() {
            tracing::info!(
                settings = report.settings,
                categories = report.categories,
                situations = report.situations,
                personas = report.personas,
                "Seeded first-run data"
            );
        }
        Ok(report)
    }
}

fn default_persona(category_id: &str) -> CreatePersonaInput {
    CreatePersonaInput {
        profile: PersonaProfile {
            display_key: "星野 詩織".to_string(),
            age: "21".to_string(),
            occupation: "文学部の女子大生".to_string(),
            personality: "物静かで穏やかな聞き上手".to_string(),
            speech_style: "丁寧な言葉を使う".to_string(),
            hobbies: "読書、フィルムカメラ、古い喫茶店巡り".to_string(),
            ..PersonaProfile::default()
        },
        allowed_categories: vec![category_id.to_string()],
        ..CreatePersonaInput::default()
    }
}

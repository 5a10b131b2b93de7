//! Fakes and fixtures shared by service tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use castroom_common::{AppError, AppResult, GenerationConfig};
use castroom_db::entities::situation::TimeBand;
use castroom_db::entities::{persona, situation, situation_category};
use castroom_db::repositories::{
    AdviceRepository, AppSettingRepository, GroupRepository, PersonaFieldRepository,
    PersonaRepository, PostRepository, SendHistoryRepository, SituationRepository,
    TuningHistoryRepository,
};
use castroom_db::test_utils::TestDatabase;

use super::export::ExportService;
use super::generation::GenerationService;
use super::generator::TextGenerator;
use super::lifecycle::PostLifecycleService;
use super::persona::{CreatePersonaInput, PersonaProfile, PersonaService};
use super::schedule::Scheduler;
use super::settings::SettingsService;
use super::sink::RowSink;
use super::situation::{CreateSituationInput, SituationService};
use super::advice::AdviceService;

/// Generator returning numbered texts, failing on chosen 1-based calls.
#[derive(Default)]
pub struct ScriptedGenerator {
    pub prompts: Mutex<Vec<String>>,
    fail_on: HashSet<usize>,
    reply: Option<String>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(calls: &[usize]) -> Self {
        Self {
            fail_on: calls.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let call = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len()
        };
        if self.fail_on.contains(&call) {
            return Err(AppError::ExternalService(format!("quota exceeded on call {call}")));
        }
        Ok(self
            .reply
            .clone()
            .unwrap_or_else(|| format!("generated post {call}")))
    }
}

/// Sink recording appended rows, optionally failing.
#[derive(Default)]
pub struct RecordingSink {
    pub rows: Mutex<Vec<(String, Vec<String>, Vec<String>)>>,
    pub configured: bool,
    pub fail: Mutex<bool>,
}

impl RecordingSink {
    pub fn configured() -> Self {
        Self {
            configured: true,
            ..Self::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait]
impl RowSink for RecordingSink {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn append_row(
        &self,
        destination: &str,
        header: &[String],
        row: &[String],
    ) -> AppResult<()> {
        if *self.fail.lock().unwrap() {
            return Err(AppError::ExternalService("sheet is locked".to_string()));
        }
        self.rows
            .lock()
            .unwrap()
            .push((destination.to_string(), header.to_vec(), row.to_vec()));
        Ok(())
    }
}

/// All services wired to one in-memory database.
pub struct Fixture {
    pub db: TestDatabase,
    pub generator: Arc<ScriptedGenerator>,
    pub sink: Arc<RecordingSink>,
    pub personas: PersonaService,
    pub situations: SituationService,
    pub settings: SettingsService,
    pub advice: AdviceService,
    pub generation: GenerationService,
    pub lifecycle: PostLifecycleService,
    pub export: ExportService,
}

pub fn test_generation_config() -> GenerationConfig {
    GenerationConfig {
        pacing_ms: 1,
        ..GenerationConfig::default()
    }
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with(ScriptedGenerator::new(), RecordingSink::configured(), test_generation_config()).await
    }

    pub async fn with(
        generator: ScriptedGenerator,
        sink: RecordingSink,
        config: GenerationConfig,
    ) -> Self {
        let db = TestDatabase::new().await.unwrap();
        let conn = db.shared();
        let generator = Arc::new(generator);
        let sink = Arc::new(sink);

        let personas = PersonaService::new(
            PersonaRepository::new(conn.clone()),
            PersonaFieldRepository::new(conn.clone()),
            GroupRepository::new(conn.clone()),
            SituationRepository::new(conn.clone()),
        );
        let situations = SituationService::new(SituationRepository::new(conn.clone()));
        let settings = SettingsService::new(AppSettingRepository::new(conn.clone()));
        settings.ensure_defaults().await.unwrap();
        let advice = AdviceService::new(AdviceRepository::new(conn.clone()));

        let generation = GenerationService::new(
            personas.clone(),
            SituationRepository::new(conn.clone()),
            PostRepository::new(conn.clone()),
            settings.clone(),
            generator.clone(),
            &config,
        )
        .unwrap();
        let lifecycle = PostLifecycleService::new(
            PostRepository::new(conn.clone()),
            TuningHistoryRepository::new(conn.clone()),
            personas.clone(),
            settings.clone(),
            generator.clone(),
            Scheduler::new(config.tz().unwrap()),
            config.length_policy,
        );
        let export = ExportService::new(
            PostRepository::new(conn.clone()),
            PersonaRepository::new(conn.clone()),
            SendHistoryRepository::new(conn),
            settings.clone(),
            sink.clone(),
            Scheduler::new(config.tz().unwrap()),
        );

        Self {
            db,
            generator,
            sink,
            personas,
            situations,
            settings,
            advice,
            generation,
            lifecycle,
            export,
        }
    }

    pub async fn category(&self, name: &str) -> situation_category::Model {
        self.situations.create_category(name).await.unwrap()
    }

    pub async fn situation(
        &self,
        category: &situation_category::Model,
        content: &str,
        band: TimeBand,
    ) -> situation::Model {
        self.situations
            .create(CreateSituationInput {
                content: content.to_string(),
                time_band: band,
                category_id: category.id.clone(),
            })
            .await
            .unwrap()
    }

    /// Persona created directly, so allowed category IDs may be dangling.
    pub async fn persona(&self, key: &str, category_ids: &[&str]) -> persona::Model {
        let persona = self
            .personas
            .create(CreatePersonaInput {
                profile: PersonaProfile {
                    display_key: key.to_string(),
                    personality: "calm".to_string(),
                    ..Default::default()
                },
                ..Default::default()
            })
            .await
            .unwrap();

        let repo = PersonaRepository::new(self.db.shared());
        let mut active: persona::ActiveModel = persona.into();
        active.allowed_categories = sea_orm::Set(serde_json::to_string(category_ids).unwrap());
        repo.update(active).await.unwrap()
    }
}

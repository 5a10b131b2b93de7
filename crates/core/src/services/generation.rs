//! Generation orchestrator.
//!
//! Runs a batch of sequential, paced generation calls. Each attempt is
//! isolated: a failed call or insert is recorded and the batch moves on.
//! Nothing is rolled back.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use castroom_common::{AppError, AppResult, GenerationConfig, IdGenerator, LengthPolicy};
use castroom_db::entities::post::{Evaluation, PostStatus, SentStatus};
use castroom_db::entities::situation::TimeBand;
use castroom_db::entities::{persona, post, situation};
use castroom_db::repositories::{PostRepository, SituationRepository};
use chrono::{DateTime, FixedOffset, Utc};
use rand::Rng;
use sea_orm::Set;
use serde::Serialize;

use super::generator::TextGeneratorService;
use super::persona::PersonaService;
use super::persona_sheet::compile_persona;
use super::prompt;
use super::schedule::Scheduler;
use super::settings::SettingsService;

/// Largest batch an operator may request.
pub const MAX_BATCH: u32 = 50;

/// Shared flag an operator sets to stop a running batch.
pub type CancelFlag = Arc<AtomicBool>;

/// A batch of drafts for one persona.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub persona_id: String,
    /// Number of attempts, 1..=50. Falls back to the `default_batch_size`
    /// setting.
    pub count: Option<u32>,
    /// Falls back to the `default_char_limit` setting.
    pub char_limit: Option<u32>,
    pub cancel: Option<CancelFlag>,
}

impl BatchRequest {
    /// Request `count` drafts with default limit and no cancellation.
    #[must_use]
    pub fn new(persona_id: impl Into<String>, count: u32) -> Self {
        Self {
            persona_id: persona_id.into(),
            count: Some(count),
            char_limit: None,
            cancel: None,
        }
    }
}

/// One campaign instruction fanned out over several personas.
#[derive(Debug, Clone)]
pub struct CampaignRequest {
    pub persona_ids: Vec<String>,
    pub instruction: String,
    pub char_limit: Option<u32>,
    pub cancel: Option<CancelFlag>,
}

/// An attempt that produced no post.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptFailure {
    /// 1-based attempt number.
    pub attempt: u32,
    pub error: String,
}

/// Outcome of a batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub requested: u32,
    pub attempted: u32,
    pub persisted: u32,
    pub failures: Vec<AttemptFailure>,
    /// Non-fatal problems, such as allowed categories that no longer exist.
    pub warnings: Vec<String>,
    pub post_ids: Vec<String>,
    pub cancelled: bool,
}

impl BatchReport {
    fn new(requested: u32) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }

    fn fail(&mut self, attempt: u32, error: &AppError) {
        tracing::warn!(attempt, error = %error, "Generation attempt failed");
        self.failures.push(AttemptFailure {
            attempt,
            error: error.to_string(),
        });
    }
}

/// Apply the length policy to model output.
#[must_use]
pub fn enforce_length(policy: LengthPolicy, text: String, char_limit: u32) -> String {
    let len = text.chars().count();
    if len <= char_limit as usize {
        return text;
    }

    tracing::warn!(len, char_limit, ?policy, "Generated text exceeds the character limit");
    match policy {
        LengthPolicy::Trust => text,
        LengthPolicy::Truncate => text.chars().take(char_limit as usize).collect(),
    }
}

/// Shorten a campaign instruction for use as a post theme.
#[must_use]
pub fn echo_theme(instruction: &str, max_chars: usize) -> String {
    if instruction.chars().count() <= max_chars {
        return instruction.to_string();
    }
    let mut theme: String = instruction.chars().take(max_chars).collect();
    theme.push('…');
    theme
}

fn is_cancelled(flag: Option<&CancelFlag>) -> bool {
    flag.is_some_and(|f| f.load(Ordering::Relaxed))
}

/// Service generating drafts.
#[derive(Clone)]
pub struct GenerationService {
    persona_service: PersonaService,
    situation_repo: SituationRepository,
    post_repo: PostRepository,
    settings: SettingsService,
    generator: TextGeneratorService,
    scheduler: Scheduler,
    pacing: Duration,
    length_policy: LengthPolicy,
    id_gen: IdGenerator,
}

impl GenerationService {
    /// Create a new generation service.
    pub fn new(
        persona_service: PersonaService,
        situation_repo: SituationRepository,
        post_repo: PostRepository,
        settings: SettingsService,
        generator: TextGeneratorService,
        config: &GenerationConfig,
    ) -> AppResult<Self> {
        if config.pacing_ms == 0 {
            return Err(AppError::Config(
                "generation.pacing_ms must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            persona_service,
            situation_repo,
            post_repo,
            settings,
            generator,
            scheduler: Scheduler::new(config.tz()?),
            pacing: config.pacing(),
            length_policy: config.length_policy,
            id_gen: IdGenerator::new(),
        })
    }

    async fn resolve_char_limit(&self, requested: Option<u32>) -> AppResult<u32> {
        match requested {
            Some(0) => Err(AppError::Validation(
                "Character limit must be greater than zero".to_string(),
            )),
            Some(limit) => Ok(limit),
            None => self.settings.char_limit().await,
        }
    }

    /// Situations the persona may draw from, plus warnings for allowed
    /// categories that no longer exist.
    pub async fn eligible_pool(
        &self,
        persona: &persona::Model,
    ) -> AppResult<(Vec<situation::Model>, Vec<String>)> {
        let allowed = persona.allowed_category_ids();
        let existing: HashSet<String> = self
            .situation_repo
            .find_categories_by_ids(&allowed)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

        let mut warnings = Vec::new();
        for category_id in allowed.iter().filter(|id| !existing.contains(*id)) {
            tracing::warn!(
                persona = %persona.display_key,
                category_id = %category_id,
                "Allowed category no longer exists"
            );
            warnings.push(format!("Allowed category {category_id} no longer exists"));
        }

        let pool = self.situation_repo.find_by_category_ids(&allowed).await?;
        Ok((pool, warnings))
    }

    /// Generate a batch of drafts for one persona.
    pub async fn generate_drafts(&self, request: BatchRequest) -> AppResult<BatchReport> {
        let count = match request.count {
            Some(count) => count,
            None => self.settings.batch_size().await?,
        };
        if !(1..=MAX_BATCH).contains(&count) {
            return Err(AppError::Validation(format!(
                "Batch size must be between 1 and {MAX_BATCH}, got {count}"
            )));
        }
        let char_limit = self.resolve_char_limit(request.char_limit).await?;

        let snapshot = self.persona_service.snapshot(&request.persona_id).await?;
        let (pool, warnings) = self.eligible_pool(&snapshot.persona).await?;
        if pool.is_empty() {
            return Err(AppError::Precondition(format!(
                "Persona {} has no situations in its allowed categories",
                snapshot.persona.display_key
            )));
        }

        let sheet = compile_persona(&snapshot);
        let mut report = BatchReport::new(count);
        report.warnings = warnings;

        tracing::info!(
            persona = %snapshot.persona.display_key,
            count,
            pool = pool.len(),
            "Starting draft batch"
        );

        for attempt in 1..=count {
            if attempt > 1 {
                tokio::time::sleep(self.pacing).await;
            }
            if is_cancelled(request.cancel.as_ref()) {
                report.cancelled = true;
                break;
            }
            report.attempted += 1;

            let (situation, created_at) = {
                let mut rng = rand::thread_rng();
                let situation = &pool[rng.gen_range(0..pool.len())];
                (situation, self.scheduler.stamp_today(situation.time_band, &mut rng))
            };

            let prompt = prompt::fresh_draft(&sheet, &situation.content, char_limit);
            let result = match self.generator.generate(&prompt).await {
                Ok(text) => {
                    let content = enforce_length(self.length_policy, text, char_limit);
                    self.insert_draft(&snapshot.persona.id, content, &situation.content, created_at)
                        .await
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(post) => {
                    report.persisted += 1;
                    report.post_ids.push(post.id);
                }
                Err(e) => report.fail(attempt, &e),
            }
        }

        tracing::info!(
            persona = %snapshot.persona.display_key,
            persisted = report.persisted,
            failed = report.failures.len(),
            cancelled = report.cancelled,
            "Finished draft batch"
        );
        Ok(report)
    }

    /// Generate one post per persona from a shared campaign instruction.
    pub async fn generate_campaign(&self, request: CampaignRequest) -> AppResult<BatchReport> {
        let instruction = request.instruction.trim();
        if instruction.is_empty() {
            return Err(AppError::Validation(
                "Campaign instruction must not be empty".to_string(),
            ));
        }
        if request.persona_ids.is_empty() {
            return Err(AppError::Validation(
                "Select at least one persona".to_string(),
            ));
        }
        let char_limit = self.resolve_char_limit(request.char_limit).await?;
        let theme = echo_theme(instruction, self.settings.theme_echo_chars().await?);

        let requested = request.persona_ids.len() as u32;
        let mut report = BatchReport::new(requested);

        for (attempt, persona_id) in (1..=requested).zip(&request.persona_ids) {
            if attempt > 1 {
                tokio::time::sleep(self.pacing).await;
            }
            if is_cancelled(request.cancel.as_ref()) {
                report.cancelled = true;
                break;
            }
            report.attempted += 1;

            let result = match self.persona_service.snapshot(persona_id).await {
                Ok(snapshot) => {
                    let prompt =
                        prompt::campaign(&compile_persona(&snapshot), instruction, char_limit);
                    match self.generator.generate(&prompt).await {
                        Ok(text) => {
                            let content = enforce_length(self.length_policy, text, char_limit);
                            let created_at = {
                                let mut rng = rand::thread_rng();
                                self.scheduler.stamp_today(TimeBand::Anytime, &mut rng)
                            };
                            self.insert_draft(persona_id, content, &theme, created_at).await
                        }
                        Err(e) => Err(e),
                    }
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(post) => {
                    report.persisted += 1;
                    report.post_ids.push(post.id);
                }
                Err(e) => report.fail(attempt, &e),
            }
        }

        tracing::info!(
            personas = requested,
            persisted = report.persisted,
            failed = report.failures.len(),
            "Finished campaign"
        );
        Ok(report)
    }

    async fn insert_draft(
        &self,
        persona_id: &str,
        content: String,
        theme: &str,
        created_at: DateTime<FixedOffset>,
    ) -> AppResult<post::Model> {
        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            persona_id: Set(persona_id.to_string()),
            created_at: Set(created_at),
            content: Set(content),
            theme: Set(theme.to_string()),
            evaluation: Set(Evaluation::Unrated),
            advice: Set("[]".to_string()),
            free_advice: Set(String::new()),
            status: Set(PostStatus::Draft),
            posted_at: Set(None),
            sent_status: Set(SentStatus::NotSent),
            sent_at: Set(None),
            updated_at: Set(Some(Utc::now().into())),
        };

        self.post_repo.create(model).await
    }
}

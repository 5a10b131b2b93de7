//! Post lifecycle manager.
//!
//! Drafts move to approved or rejected; approved posts that were never sent
//! can go back to draft. Regeneration rewrites a draft in place and logs the
//! step in the tuning history.

use castroom_common::{AppError, AppResult, IdGenerator, LengthPolicy};
use castroom_db::entities::post::{Evaluation, PostStatus, SentStatus};
use castroom_db::entities::{post, tuning_history};
use castroom_db::repositories::{PostFilter, PostRepository, TuningHistoryRepository};
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::generation::enforce_length;
use super::generator::TextGeneratorService;
use super::persona::PersonaService;
use super::prompt::{self, AdviceSet};
use super::schedule::Scheduler;
use super::settings::SettingsService;

/// The post an operator is acting on, and the message left for them.
#[derive(Debug, Clone, Default)]
pub struct ReviewContext {
    pub post_id: String,
    pub message: Option<String>,
}

impl ReviewContext {
    /// Context for one post.
    #[must_use]
    pub fn new(post_id: impl Into<String>) -> Self {
        Self {
            post_id: post_id.into(),
            message: None,
        }
    }

    fn done(&mut self, message: &str) {
        self.message = Some(message.to_string());
    }
}

/// Operator edits on a draft. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewEdits {
    #[validate(length(min = 1, max = 2000))]
    pub content: Option<String>,

    pub evaluation: Option<Evaluation>,

    /// Canned advice picked from the advice catalog.
    pub advice: Option<Vec<String>>,

    #[validate(length(max = 1000))]
    pub free_advice: Option<String>,
}

impl ReviewEdits {
    fn apply(&self, active: &mut post::ActiveModel) -> AppResult<()> {
        if let Some(content) = &self.content {
            if content.trim().is_empty() {
                return Err(AppError::Validation("Content must not be blank".to_string()));
            }
            active.content = Set(content.clone());
        }
        if let Some(evaluation) = self.evaluation {
            active.evaluation = Set(evaluation);
        }
        if let Some(advice) = &self.advice {
            active.advice = Set(serde_json::to_string(advice)?);
        }
        if let Some(free_advice) = &self.free_advice {
            active.free_advice = Set(free_advice.clone());
        }
        Ok(())
    }
}

/// Service for reviewing and tuning posts.
#[derive(Clone)]
pub struct PostLifecycleService {
    post_repo: PostRepository,
    tuning_repo: TuningHistoryRepository,
    persona_service: PersonaService,
    settings: SettingsService,
    generator: TextGeneratorService,
    scheduler: Scheduler,
    length_policy: LengthPolicy,
    id_gen: IdGenerator,
}

fn require(post: &post::Model, status: PostStatus, action: &str) -> AppResult<()> {
    if post.status == status {
        Ok(())
    } else {
        Err(AppError::invalid_transition(post.status.as_str(), action))
    }
}

impl PostLifecycleService {
    /// Create a new lifecycle service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        tuning_repo: TuningHistoryRepository,
        persona_service: PersonaService,
        settings: SettingsService,
        generator: TextGeneratorService,
        scheduler: Scheduler,
        length_policy: LengthPolicy,
    ) -> Self {
        Self {
            post_repo,
            tuning_repo,
            persona_service,
            settings,
            generator,
            scheduler,
            length_policy,
            id_gen: IdGenerator::new(),
        }
    }

    /// Approve a draft as is, rated excellent.
    pub async fn quick_approve(&self, ctx: &mut ReviewContext) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(&ctx.post_id).await?;
        require(&post, PostStatus::Draft, "approve")?;

        let posted_at = self.scheduler.posted_at_for(&post.created_at);
        let mut active: post::ActiveModel = post.into();
        active.status = Set(PostStatus::Approved);
        active.evaluation = Set(Evaluation::Excellent);
        active.posted_at = Set(Some(posted_at));
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.post_repo.update(active).await?;
        tracing::info!(post_id = %updated.id, "Post approved");
        ctx.done("Approved");
        Ok(updated)
    }

    /// Apply edits to a draft and approve it.
    pub async fn approve_with_edits(
        &self,
        ctx: &mut ReviewContext,
        edits: &ReviewEdits,
    ) -> AppResult<post::Model> {
        edits.validate()?;
        let post = self.post_repo.get_by_id(&ctx.post_id).await?;
        require(&post, PostStatus::Draft, "approve")?;

        let posted_at = self.scheduler.posted_at_for(&post.created_at);
        let mut active: post::ActiveModel = post.into();
        edits.apply(&mut active)?;
        active.status = Set(PostStatus::Approved);
        active.posted_at = Set(Some(posted_at));
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.post_repo.update(active).await?;
        tracing::info!(post_id = %updated.id, "Post approved with edits");
        ctx.done("Approved with edits");
        Ok(updated)
    }

    /// Reject a draft. The content is kept.
    pub async fn reject(&self, ctx: &mut ReviewContext) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(&ctx.post_id).await?;
        require(&post, PostStatus::Draft, "reject")?;

        let mut active: post::ActiveModel = post.into();
        active.status = Set(PostStatus::Rejected);
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.post_repo.update(active).await?;
        tracing::info!(post_id = %updated.id, "Post rejected");
        ctx.done("Rejected");
        Ok(updated)
    }

    /// Send an approved post back to the draft queue.
    pub async fn revert(&self, ctx: &mut ReviewContext) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(&ctx.post_id).await?;
        require(&post, PostStatus::Approved, "revert")?;
        if post.sent_status == SentStatus::Sent {
            return Err(AppError::invalid_transition("sent", "revert"));
        }

        let mut active: post::ActiveModel = post.into();
        active.status = Set(PostStatus::Draft);
        active.posted_at = Set(None);
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.post_repo.update(active).await?;
        tracing::info!(post_id = %updated.id, "Post reverted to draft");
        ctx.done("Returned to drafts");
        Ok(updated)
    }

    /// Store edits on a draft without changing its status.
    pub async fn save(&self, ctx: &mut ReviewContext, edits: &ReviewEdits) -> AppResult<post::Model> {
        edits.validate()?;
        let post = self.post_repo.get_by_id(&ctx.post_id).await?;
        require(&post, PostStatus::Draft, "save")?;

        let mut active: post::ActiveModel = post.into();
        edits.apply(&mut active)?;
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.post_repo.update(active).await?;
        ctx.done("Saved");
        Ok(updated)
    }

    /// Rewrite a draft following advice.
    ///
    /// Advice in `edits` wins; otherwise the advice stored on the post is
    /// used. A generator failure leaves the post untouched.
    pub async fn regenerate(
        &self,
        ctx: &mut ReviewContext,
        edits: &ReviewEdits,
        char_limit: Option<u32>,
    ) -> AppResult<post::Model> {
        edits.validate()?;
        let post = self.post_repo.get_by_id(&ctx.post_id).await?;
        require(&post, PostStatus::Draft, "regenerate")?;

        let char_limit = match char_limit {
            Some(0) => {
                return Err(AppError::Validation(
                    "Character limit must be greater than zero".to_string(),
                ));
            }
            Some(limit) => limit,
            None => self.settings.char_limit().await?,
        };

        let advice = AdviceSet::new(
            edits.advice.clone().unwrap_or_else(|| post.advice_list()),
            Some(
                edits
                    .free_advice
                    .clone()
                    .unwrap_or_else(|| post.free_advice.clone()),
            ),
        );
        let previous = edits.content.clone().unwrap_or_else(|| post.content.clone());

        let sheet = self.persona_service.compile(&post.persona_id).await?;
        let prompt = prompt::regeneration(&sheet, &post.theme, &previous, &advice, char_limit);
        let text = self.generator.generate(&prompt).await?;
        let new_content = enforce_length(self.length_policy, text, char_limit);

        let now = Utc::now();
        let history = tuning_history::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id.clone()),
            created_at: Set(now.into()),
            previous_content: Set(previous),
            advice_used: Set(advice.combined()),
            new_content: Set(new_content.clone()),
        };

        let mut active: post::ActiveModel = post.into();
        active.content = Set(new_content);
        active.evaluation = Set(Evaluation::Unrated);
        active.advice = Set("[]".to_string());
        active.free_advice = Set(String::new());
        active.updated_at = Set(Some(now.into()));

        let updated = self.post_repo.apply_regeneration(history, active).await?;
        tracing::info!(post_id = %updated.id, "Post regenerated");
        ctx.done("Regenerated");
        Ok(updated)
    }

    /// Drafts of one persona, newest first.
    pub async fn drafts(&self, persona_id: &str) -> AppResult<Vec<post::Model>> {
        self.post_repo
            .find_filtered(&PostFilter {
                persona_id: Some(persona_id.to_string()),
                status: Some(PostStatus::Draft),
                sent_status: None,
            })
            .await
    }

    /// Approved posts of one persona. Sent posts are skipped unless asked for.
    pub async fn approved(
        &self,
        persona_id: &str,
        include_sent: bool,
    ) -> AppResult<Vec<post::Model>> {
        self.post_repo
            .find_filtered(&PostFilter {
                persona_id: Some(persona_id.to_string()),
                status: Some(PostStatus::Approved),
                sent_status: (!include_sent).then_some(SentStatus::NotSent),
            })
            .await
    }

    /// Rejected posts of one persona.
    pub async fn rejected(&self, persona_id: &str) -> AppResult<Vec<post::Model>> {
        self.post_repo
            .find_filtered(&PostFilter {
                persona_id: Some(persona_id.to_string()),
                status: Some(PostStatus::Rejected),
                sent_status: None,
            })
            .await
    }

    /// Tuning history of a post, newest first.
    pub async fn history(&self, post_id: &str) -> AppResult<Vec<tuning_history::Model>> {
        self.post_repo.get_by_id(post_id).await?;
        self.tuning_repo.find_by_post(post_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::generation::BatchRequest;
    use crate::services::testing::{Fixture, RecordingSink, ScriptedGenerator, test_generation_config};
    use castroom_db::entities::situation::TimeBand;
    use chrono::Timelike;

    async fn draft(fx: &Fixture) -> post::Model {
        let daily = fx.category("daily").await;
        fx.situation(&daily, "rainy night", TimeBand::Evening).await;
        let mira = fx.persona("Mira", &[daily.id.as_str()]).await;
        let report = fx
            .generation
            .generate_drafts(BatchRequest::new(&mira.id, 1))
            .await
            .unwrap();
        PostRepository::new(fx.db.shared())
            .get_by_id(&report.post_ids[0])
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_quick_approve_sets_posted_at() {
        let fx = Fixture::new().await;
        let post = draft(&fx).await;

        let mut ctx = ReviewContext::new(&post.id);
        let approved = fx.lifecycle.quick_approve(&mut ctx).await.unwrap();

        assert_eq!(approved.status, PostStatus::Approved);
        assert_eq!(approved.evaluation, Evaluation::Excellent);
        let posted_at = approved.posted_at.unwrap();
        assert_eq!(posted_at, Scheduler::default().local(&post.created_at).time());
        assert!((18..=23).contains(&posted_at.hour()), "{posted_at}");
        assert_eq!(ctx.message.as_deref(), Some("Approved"));
    }

    #[tokio::test]
    async fn test_revert_then_reapprove_rederives_posted_at() {
        let fx = Fixture::new().await;
        let post = draft(&fx).await;
        let mut ctx = ReviewContext::new(&post.id);

        fx.lifecycle.quick_approve(&mut ctx).await.unwrap();
        let reverted = fx.lifecycle.revert(&mut ctx).await.unwrap();
        assert_eq!(reverted.status, PostStatus::Draft);
        assert!(reverted.posted_at.is_none());

        let edits = ReviewEdits {
            content: Some("edited".to_string()),
            evaluation: Some(Evaluation::Good),
            ..Default::default()
        };
        let approved = fx.lifecycle.approve_with_edits(&mut ctx, &edits).await.unwrap();
        assert_eq!(approved.content, "edited");
        assert_eq!(approved.evaluation, Evaluation::Good);
        assert_eq!(
            approved.posted_at,
            Some(Scheduler::default().posted_at_for(&post.created_at))
        );
    }

    #[tokio::test]
    async fn test_invalid_transitions() {
        let fx = Fixture::new().await;
        let post = draft(&fx).await;
        let mut ctx = ReviewContext::new(&post.id);

        assert!(matches!(
            fx.lifecycle.revert(&mut ctx).await,
            Err(AppError::InvalidTransition { .. })
        ));

        let rejected = fx.lifecycle.reject(&mut ctx).await.unwrap();
        assert_eq!(rejected.status, PostStatus::Rejected);
        assert_eq!(rejected.content, post.content);

        for result in [
            fx.lifecycle.quick_approve(&mut ctx).await,
            fx.lifecycle.reject(&mut ctx).await,
            fx.lifecycle.save(&mut ctx, &ReviewEdits::default()).await,
            fx.lifecycle
                .regenerate(&mut ctx, &ReviewEdits::default(), None)
                .await,
        ] {
            assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
        }
        assert_eq!(fx.lifecycle.rejected(&post.persona_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sent_post_cannot_be_reverted() {
        let fx = Fixture::new().await;
        let post = draft(&fx).await;
        let mut ctx = ReviewContext::new(&post.id);
        fx.lifecycle.quick_approve(&mut ctx).await.unwrap();

        fx.export
            .dispatch(&post.id, None, crate::services::export::ScheduleChoice::Original)
            .await
            .unwrap();

        let err = fx.lifecycle.revert(&mut ctx).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
        assert!(fx.lifecycle.approved(&post.persona_id, false).await.unwrap().is_empty());
        assert_eq!(fx.lifecycle.approved(&post.persona_id, true).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_regenerate_logs_history_and_resets_review() {
        let fx = Fixture::new().await;
        let post = draft(&fx).await;
        let mut ctx = ReviewContext::new(&post.id);

        fx.lifecycle
            .save(
                &mut ctx,
                &ReviewEdits {
                    evaluation: Some(Evaluation::Poor),
                    advice: Some(vec!["shorter".to_string()]),
                    free_advice: Some("mention the rain".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = fx
            .lifecycle
            .regenerate(&mut ctx, &ReviewEdits::default(), Some(60))
            .await
            .unwrap();

        assert_eq!(updated.status, PostStatus::Draft);
        assert_eq!(updated.content, "generated post 2");
        assert_eq!(updated.evaluation, Evaluation::Unrated);
        assert_eq!(updated.advice, "[]");
        assert!(updated.free_advice.is_empty());

        let history = fx.lifecycle.history(&post.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].previous_content, post.content);
        assert_eq!(history[0].advice_used, "shorter, mention the rain");
        assert_eq!(history[0].new_content, "generated post 2");

        let prompt = fx.generator.last_prompt();
        assert!(prompt.contains("shorter, mention the rain"));
        assert!(prompt.contains("at most 60 characters"));
        assert_eq!(ctx.message.as_deref(), Some("Regenerated"));
    }

    #[tokio::test]
    async fn test_failed_regeneration_leaves_post_unchanged() {
        let fx = Fixture::with(
            ScriptedGenerator::failing_on(&[2]),
            RecordingSink::configured(),
            test_generation_config(),
        )
        .await;
        let post = draft(&fx).await;
        let mut ctx = ReviewContext::new(&post.id);

        let err = fx
            .lifecycle
            .regenerate(
                &mut ctx,
                &ReviewEdits {
                    advice: Some(vec!["warmer".to_string()]),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)));
        assert!(ctx.message.is_none());

        let reloaded = PostRepository::new(fx.db.shared())
            .get_by_id(&post.id)
            .await
            .unwrap();
        assert_eq!(reloaded, post);
        assert!(fx.lifecycle.history(&post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_content_rejected() {
        let fx = Fixture::new().await;
        let post = draft(&fx).await;
        let mut ctx = ReviewContext::new(&post.id);

        let edits = ReviewEdits {
            content: Some("   ".to_string()),
            ..Default::default()
        };
        let err = fx.lifecycle.save(&mut ctx, &edits).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(fx.lifecycle.drafts(&post.persona_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_post() {
        let fx = Fixture::new().await;
        let mut ctx = ReviewContext::new("nope");
        assert!(matches!(
            fx.lifecycle.quick_approve(&mut ctx).await,
            Err(AppError::NotFound(_))
        ));
    }
}

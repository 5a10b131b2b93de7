//! Export dispatcher.
//!
//! Sends an approved post to the row sink and records every attempt in the
//! send history. A failed attempt leaves the post unsent; the operator
//! retries by dispatching again.

use castroom_common::{AppError, AppResult, IdGenerator};
use castroom_db::entities::post::{self, PostStatus, SentStatus};
use castroom_db::entities::send_history::{self, SendStatus};
use castroom_db::repositories::{PersonaRepository, PostRepository, SendHistoryRepository};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sea_orm::Set;
use serde::Serialize;

use super::schedule::Scheduler;
use super::settings::SettingsService;
use super::sink::RowSinkService;

/// Column header sent with every row.
pub const EXPORT_HEADER: [&str; 4] = ["scheduled_at", "persona", "content", "theme"];

const SCHEDULE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Date the exported row announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleChoice {
    /// The post's own creation timestamp.
    Original,
    /// Another date at the same time of day.
    OnDate(NaiveDate),
}

/// Outcome of one dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub post_id: String,
    pub destination: String,
    pub scheduled_for: DateTime<FixedOffset>,
    pub status: SendStatus,
    pub error: Option<String>,
    pub history_id: String,
}

/// Service for exporting approved posts.
#[derive(Clone)]
pub struct ExportService {
    post_repo: PostRepository,
    persona_repo: PersonaRepository,
    send_history_repo: SendHistoryRepository,
    settings: SettingsService,
    sink: RowSinkService,
    scheduler: Scheduler,
    id_gen: IdGenerator,
}

impl ExportService {
    /// Create a new export service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        persona_repo: PersonaRepository,
        send_history_repo: SendHistoryRepository,
        settings: SettingsService,
        sink: RowSinkService,
        scheduler: Scheduler,
    ) -> Self {
        Self {
            post_repo,
            persona_repo,
            send_history_repo,
            settings,
            sink,
            scheduler,
            id_gen: IdGenerator::new(),
        }
    }

    /// Send one approved post to the sink.
    ///
    /// Sink failures are not errors: they are recorded and reported with
    /// `status = failed`. Errors are returned for a post that is missing or
    /// not approved, and for store failures.
    pub async fn dispatch(
        &self,
        post_id: &str,
        destination: Option<&str>,
        schedule: ScheduleChoice,
    ) -> AppResult<DispatchReport> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.status != PostStatus::Approved {
            return Err(AppError::invalid_transition(post.status.as_str(), "export"));
        }
        let persona = self.persona_repo.get_by_id(&post.persona_id).await?;

        let destination = match destination.map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) => d.to_string(),
            None => self.settings.export_destination().await?,
        };
        let scheduled_for = match schedule {
            ScheduleChoice::Original => self.scheduler.local(&post.created_at),
            ScheduleChoice::OnDate(date) => self.scheduler.reschedule(&post.created_at, date),
        };

        let header: Vec<String> = EXPORT_HEADER.iter().map(ToString::to_string).collect();
        let row = vec![
            scheduled_for.format(SCHEDULE_FORMAT).to_string(),
            persona.display_key,
            post.content.clone(),
            post.theme.clone(),
        ];

        let outcome = if self.sink.is_configured() {
            self.sink.append_row(&destination, &header, &row).await
        } else {
            Err(AppError::Precondition(
                "Export credential is not configured".to_string(),
            ))
        };

        let now = Utc::now();
        let mut entry = send_history::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id.clone()),
            destination: Set(destination.clone()),
            attempted_at: Set(now.into()),
            scheduled_for: Set(scheduled_for),
            status: Set(SendStatus::Completed),
            error_message: Set(None),
        };

        match outcome {
            Ok(()) => {
                let mut active: post::ActiveModel = post.into();
                active.sent_status = Set(SentStatus::Sent);
                active.sent_at = Set(Some(now.into()));
                active.updated_at = Set(Some(now.into()));

                let (history, _) = self.post_repo.record_delivery(entry, active).await?;
                tracing::info!(post_id, destination = %destination, "Post exported");

                Ok(DispatchReport {
                    post_id: post_id.to_string(),
                    destination,
                    scheduled_for,
                    status: SendStatus::Completed,
                    error: None,
                    history_id: history.id,
                })
            }
            Err(e) => {
                tracing::warn!(post_id, destination = %destination, error = %e, "Export failed");
                let message = e.to_string();
                entry.status = Set(SendStatus::Failed);
                entry.error_message = Set(Some(message.clone()));
                let history = self.send_history_repo.create(entry).await?;

                Ok(DispatchReport {
                    post_id: post_id.to_string(),
                    destination,
                    scheduled_for,
                    status: SendStatus::Failed,
                    error: Some(message),
                    history_id: history.id,
                })
            }
        }
    }

    /// Export attempts for a post, newest first.
    pub async fn history(&self, post_id: &str) -> AppResult<Vec<send_history::Model>> {
        self.post_repo.get_by_id(post_id).await?;
        self.send_history_repo.find_by_post(post_id).await
    }
}

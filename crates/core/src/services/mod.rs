//! Business logic services.

#![allow(missing_docs)]

pub mod advice;
pub mod export;
pub mod generation;
pub mod generator;
pub mod group;
pub mod lifecycle;
pub mod persona;
pub mod persona_field;
pub mod persona_sheet;
pub mod prompt;
pub mod schedule;
pub mod seed;
pub mod settings;
pub mod sink;
pub mod situation;

#[cfg(test)]
pub(crate) mod testing;

pub use advice::AdviceService;
pub use export::{DispatchReport, EXPORT_HEADER, ExportService, ScheduleChoice};
pub use generation::{
    AttemptFailure, BatchReport, BatchRequest, CampaignRequest, CancelFlag, GenerationService,
};
pub use generator::{GeminiGenerator, TextGenerator, TextGeneratorService, UnconfiguredGenerator};
pub use group::{CreateGroupInput, GroupService, UpdateGroupInput};
pub use lifecycle::{PostLifecycleService, ReviewContext, ReviewEdits};
pub use persona::{CreatePersonaInput, PersonaProfile, PersonaService};
pub use persona_field::{PersonaFieldService, RegisterFieldInput, UpdateFieldInput};
pub use persona_sheet::{CustomFieldValue, PersonaSnapshot, compile_persona};
pub use prompt::AdviceSet;
pub use schedule::Scheduler;
pub use seed::{SeedReport, SeedService};
pub use settings::SettingsService;
pub use sink::{RowSink, RowSinkService, WebhookRowSink};
pub use situation::{CreateSituationInput, SituationService, UpdateSituationInput};

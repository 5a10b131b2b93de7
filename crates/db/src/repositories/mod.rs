//! Database repositories.

mod advice;
mod app_setting;
mod group;
mod persona;
mod persona_field;
mod post;
mod send_history;
mod situation;
mod tuning_history;

pub use advice::AdviceRepository;
pub use app_setting::AppSettingRepository;
pub use group::GroupRepository;
pub use persona::PersonaRepository;
pub use persona_field::PersonaFieldRepository;
pub use post::{PostFilter, PostRepository};
pub use send_history::SendHistoryRepository;
pub use situation::SituationRepository;
pub use tuning_history::TuningHistoryRepository;

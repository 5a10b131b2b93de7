//! Database entities.

#![allow(missing_docs)]

pub mod advice_master;
pub mod app_setting;
pub mod persona;
pub mod persona_field;
pub mod persona_field_value;
pub mod persona_group;
pub mod persona_group_member;
pub mod post;
pub mod send_history;
pub mod situation;
pub mod situation_category;
pub mod tuning_history;

pub use advice_master::Entity as AdviceMaster;
pub use app_setting::Entity as AppSetting;
pub use persona::Entity as Persona;
pub use persona_field::Entity as PersonaField;
pub use persona_field_value::Entity as PersonaFieldValue;
pub use persona_group::Entity as PersonaGroup;
pub use persona_group_member::Entity as PersonaGroupMember;
pub use post::Entity as Post;
pub use send_history::Entity as SendHistory;
pub use situation::Entity as Situation;
pub use situation_category::Entity as SituationCategory;
pub use tuning_history::Entity as TuningHistory;

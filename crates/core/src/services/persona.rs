//! Persona service.

use std::collections::{BTreeMap, HashSet};

use castroom_common::{AppError, AppResult, IdGenerator};
use castroom_db::entities::{persona, persona_field, persona_group_member};
use castroom_db::repositories::{
    GroupRepository, PersonaFieldRepository, PersonaRepository, SituationRepository,
};
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::persona_sheet::{CustomFieldValue, PersonaSnapshot, compile_persona};

/// Core persona attributes, as edited in one form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonaProfile {
    #[validate(length(min = 1, max = 128))]
    pub display_key: String,
    #[validate(length(max = 128))]
    pub nickname: String,
    #[validate(length(max = 32))]
    pub age: String,
    #[validate(length(max = 64))]
    pub birthday: String,
    #[validate(length(max = 128))]
    pub birthplace: String,
    pub appearance: String,
    pub personality: String,
    pub strengths: String,
    pub weaknesses: String,
    pub speech_style: String,
    #[validate(length(max = 256))]
    pub catchphrase: String,
    #[validate(length(max = 128))]
    pub occupation: String,
    pub hobbies: String,
    pub likes: String,
    pub dislikes: String,
    pub backstory: String,
    pub family: String,
    pub turning_point: String,
    pub secret: String,
}

/// Input for creating a persona.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonaInput {
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: PersonaProfile,
    /// Situation category IDs.
    #[serde(default)]
    pub allowed_categories: Vec<String>,
    /// Custom field values keyed by field name.
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub group_ids: Vec<String>,
}

fn dedup(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty() && seen.insert(n.clone()))
        .collect()
}

/// Service for personas, their custom fields and group memberships.
#[derive(Clone)]
pub struct PersonaService {
    persona_repo: PersonaRepository,
    field_repo: PersonaFieldRepository,
    group_repo: GroupRepository,
    situation_repo: SituationRepository,
    id_gen: IdGenerator,
}

impl PersonaService {
    /// Create a new persona service.
    #[must_use]
    pub const fn new(
        persona_repo: PersonaRepository,
        field_repo: PersonaFieldRepository,
        group_repo: GroupRepository,
        situation_repo: SituationRepository,
    ) -> Self {
        Self {
            persona_repo,
            field_repo,
            group_repo,
            situation_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a persona with its categories, custom values and groups.
    pub async fn create(&self, input: CreatePersonaInput) -> AppResult<persona::Model> {
        input.validate()?;
        let profile = input.profile;
        let display_key = profile.display_key.trim().to_string();
        if display_key.is_empty() {
            return Err(AppError::Validation("Display key must not be blank".to_string()));
        }
        if self.persona_repo.find_by_display_key(&display_key).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Persona {display_key} already exists"
            )));
        }

        let categories = self.check_categories(input.allowed_categories).await?;
        let fields = self.field_repo.find_all().await?;
        let values = resolve_custom_values(&fields, input.custom_fields, true)?;
        let group_ids = self.check_groups(input.group_ids).await?;

        let model = persona::ActiveModel {
            id: Set(self.id_gen.generate()),
            display_key: Set(display_key),
            nickname: Set(profile.nickname),
            age: Set(profile.age),
            birthday: Set(profile.birthday),
            birthplace: Set(profile.birthplace),
            appearance: Set(profile.appearance),
            personality: Set(profile.personality),
            strengths: Set(profile.strengths),
            weaknesses: Set(profile.weaknesses),
            speech_style: Set(profile.speech_style),
            catchphrase: Set(profile.catchphrase),
            occupation: Set(profile.occupation),
            hobbies: Set(profile.hobbies),
            likes: Set(profile.likes),
            dislikes: Set(profile.dislikes),
            backstory: Set(profile.backstory),
            family: Set(profile.family),
            turning_point: Set(profile.turning_point),
            secret: Set(profile.secret),
            allowed_categories: Set(serde_json::to_string(&categories)?),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let persona = self.persona_repo.create(model).await?;
        self.store_custom_values(&persona.id, values).await?;
        self.store_groups(&persona.id, group_ids).await?;

        tracing::info!(persona = %persona.display_key, "Created persona");
        Ok(persona)
    }

    /// Replace all core attributes.
    pub async fn update_profile(&self, id: &str, profile: PersonaProfile) -> AppResult<persona::Model> {
        profile.validate()?;
        let display_key = profile.display_key.trim().to_string();
        if display_key.is_empty() {
            return Err(AppError::Validation("Display key must not be blank".to_string()));
        }
        let persona = self.persona_repo.get_by_id(id).await?;

        let mut active: persona::ActiveModel = persona.into();
        active.display_key = Set(display_key);
        active.nickname = Set(profile.nickname);
        active.age = Set(profile.age);
        active.birthday = Set(profile.birthday);
        active.birthplace = Set(profile.birthplace);
        active.appearance = Set(profile.appearance);
        active.personality = Set(profile.personality);
        active.strengths = Set(profile.strengths);
        active.weaknesses = Set(profile.weaknesses);
        active.speech_style = Set(profile.speech_style);
        active.catchphrase = Set(profile.catchphrase);
        active.occupation = Set(profile.occupation);
        active.hobbies = Set(profile.hobbies);
        active.likes = Set(profile.likes);
        active.dislikes = Set(profile.dislikes);
        active.backstory = Set(profile.backstory);
        active.family = Set(profile.family);
        active.turning_point = Set(profile.turning_point);
        active.secret = Set(profile.secret);
        active.updated_at = Set(Some(Utc::now().into()));

        self.persona_repo.update(active).await
    }

    /// Replace the categories a persona may draw situations from.
    pub async fn set_allowed_categories(
        &self,
        id: &str,
        category_ids: Vec<String>,
    ) -> AppResult<persona::Model> {
        let persona = self.persona_repo.get_by_id(id).await?;
        let category_ids = self.check_categories(category_ids).await?;

        let mut active: persona::ActiveModel = persona.into();
        active.allowed_categories = Set(serde_json::to_string(&category_ids)?);
        active.updated_at = Set(Some(Utc::now().into()));

        self.persona_repo.update(active).await
    }

    /// Set custom field values. Fields not named keep their value.
    pub async fn set_custom_fields(
        &self,
        id: &str,
        values: BTreeMap<String, String>,
    ) -> AppResult<()> {
        self.persona_repo.get_by_id(id).await?;
        let fields = self.field_repo.find_all().await?;
        let values = resolve_custom_values(&fields, values, false)?;
        self.store_custom_values(id, values).await
    }

    /// Replace group memberships.
    pub async fn set_groups(&self, id: &str, group_ids: Vec<String>) -> AppResult<()> {
        self.persona_repo.get_by_id(id).await?;
        let group_ids = self.check_groups(group_ids).await?;
        self.store_groups(id, group_ids).await
    }

    /// Get a persona.
    pub async fn get(&self, id: &str) -> AppResult<persona::Model> {
        self.persona_repo.get_by_id(id).await
    }

    /// All personas by display key.
    pub async fn list(&self) -> AppResult<Vec<persona::Model>> {
        self.persona_repo.find_all().await
    }

    /// Load everything the persona compiler needs.
    pub async fn snapshot(&self, id: &str) -> AppResult<PersonaSnapshot> {
        let persona = self.persona_repo.get_by_id(id).await?;
        self.snapshot_of(persona).await
    }

    /// Build a snapshot for an already loaded persona.
    pub async fn snapshot_of(&self, persona: persona::Model) -> AppResult<PersonaSnapshot> {
        let fields = self.field_repo.find_all().await?;
        let mut values: BTreeMap<String, String> = self
            .persona_repo
            .find_field_values(&persona.id)
            .await?
            .into_iter()
            .map(|v| (v.field_id, v.value))
            .collect();
        let groups = self.group_repo.find_by_persona(&persona.id).await?;

        let fields = fields
            .into_iter()
            .map(|field| {
                let value = values.remove(&field.id);
                CustomFieldValue { field, value }
            })
            .collect();

        Ok(PersonaSnapshot {
            persona,
            fields,
            groups,
        })
    }

    /// Compile a persona's character sheet.
    pub async fn compile(&self, id: &str) -> AppResult<String> {
        Ok(compile_persona(&self.snapshot(id).await?))
    }

    /// Delete a persona and everything it owns.
    ///
    /// The operator must type the persona's display key exactly.
    pub async fn delete(&self, id: &str, typed_confirmation: &str) -> AppResult<()> {
        let persona = self.persona_repo.get_by_id(id).await?;
        if typed_confirmation != persona.display_key {
            return Err(AppError::ConfirmationMismatch {
                expected: persona.display_key,
            });
        }

        self.persona_repo.delete(id).await?;
        tracing::warn!(persona = %persona.display_key, "Deleted persona with all posts");
        Ok(())
    }

    async fn check_categories(&self, category_ids: Vec<String>) -> AppResult<Vec<String>> {
        let category_ids = dedup(category_ids);
        let existing: HashSet<String> = self
            .situation_repo
            .find_categories_by_ids(&category_ids)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

        let unknown: Vec<&str> = category_ids
            .iter()
            .filter(|n| !existing.contains(*n))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(AppError::Validation(format!(
                "Unknown situation categories: {}",
                unknown.join(", ")
            )));
        }
        Ok(category_ids)
    }

    async fn check_groups(&self, group_ids: Vec<String>) -> AppResult<Vec<String>> {
        let group_ids = dedup(group_ids);
        for group_id in &group_ids {
            self.group_repo.get_by_id(group_id).await?;
        }
        Ok(group_ids)
    }

    async fn store_custom_values(&self, persona_id: &str, values: Vec<(String, String)>) -> AppResult<()> {
        for (field_id, value) in values {
            self.persona_repo
                .upsert_field_value(self.id_gen.generate(), persona_id, &field_id, value)
                .await?;
        }
        Ok(())
    }

    async fn store_groups(&self, persona_id: &str, group_ids: Vec<String>) -> AppResult<()> {
        let now = Utc::now();
        let members = group_ids
            .into_iter()
            .map(|group_id| persona_group_member::ActiveModel {
                id: Set(self.id_gen.generate()),
                persona_id: Set(persona_id.to_string()),
                group_id: Set(group_id),
                created_at: Set(now.into()),
            })
            .collect();
        self.group_repo.replace_memberships(persona_id, members).await
    }
}

/// Map field names to field IDs, rejecting unregistered names.
///
/// With `all_required`, every required field must be present and non-blank.
/// Otherwise only the fields being set are checked.
fn resolve_custom_values(
    fields: &[persona_field::Model],
    values: BTreeMap<String, String>,
    all_required: bool,
) -> AppResult<Vec<(String, String)>> {
    for name in values.keys() {
        if !fields.iter().any(|f| &f.name == name) {
            return Err(AppError::Validation(format!(
                "Unknown custom field: {name}"
            )));
        }
    }

    for field in fields.iter().filter(|f| f.required) {
        let value = values.get(&field.name).map(|v| v.trim());
        let missing = match value {
            Some(v) => v.is_empty(),
            None => all_required,
        };
        if missing {
            return Err(AppError::Validation(format!(
                "Custom field {} is required",
                field.label
            )));
        }
    }

    Ok(fields
        .iter()
        .filter_map(|f| values.get(&f.name).map(|v| (f.id.clone(), v.clone())))
        .collect())
}

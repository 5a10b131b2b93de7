//! Custom persona field registry service.

use std::sync::LazyLock;

use castroom_common::{AppError, AppResult, IdGenerator};
use castroom_db::entities::persona::CORE_FIELD_NAMES;
use castroom_db::entities::persona_field::{self, FieldInputKind};
use castroom_db::repositories::PersonaFieldRepository;
use chrono::Utc;
use regex::Regex;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

#[allow(clippy::unwrap_used)]
static FIELD_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]{0,31}$").unwrap());

/// Column names every table already uses.
const RESERVED_NAMES: &[&str] = &["id", "created_at", "updated_at"];

/// Input for registering a custom field.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFieldInput {
    pub name: String,
    #[validate(length(min = 1, max = 128))]
    pub label: String,
    #[serde(default = "default_input_kind")]
    pub input_kind: FieldInputKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub sort_order: i32,
}

const fn default_input_kind() -> FieldInputKind {
    FieldInputKind::Text
}

/// Input for changing a custom field. The machine name is fixed.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFieldInput {
    #[validate(length(min = 1, max = 128))]
    pub label: Option<String>,
    pub input_kind: Option<FieldInputKind>,
    pub required: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Check a custom field name against the allow-pattern and the core fields.
pub fn validate_field_name(name: &str) -> AppResult<()> {
    if !FIELD_NAME_RE.is_match(name) {
        return Err(AppError::Validation(format!(
            "Field name {name:?} must start with a lowercase letter and contain only lowercase letters, digits and underscores (max 32)"
        )));
    }
    if CORE_FIELD_NAMES.contains(&name) || RESERVED_NAMES.contains(&name) {
        return Err(AppError::Validation(format!(
            "Field name {name:?} is reserved"
        )));
    }
    Ok(())
}

/// Service for the custom field registry.
#[derive(Clone)]
pub struct PersonaFieldService {
    field_repo: PersonaFieldRepository,
    id_gen: IdGenerator,
}

impl PersonaFieldService {
    /// Create a new persona field service.
    #[must_use]
    pub const fn new(field_repo: PersonaFieldRepository) -> Self {
        Self {
            field_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new field.
    pub async fn register(&self, input: RegisterFieldInput) -> AppResult<persona_field::Model> {
        input.validate()?;
        validate_field_name(&input.name)?;

        if self.field_repo.find_by_name(&input.name).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Field {} is already registered",
                input.name
            )));
        }

        let model = persona_field::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            label: Set(input.label.trim().to_string()),
            input_kind: Set(input.input_kind),
            required: Set(input.required),
            sort_order: Set(input.sort_order),
            created_at: Set(Utc::now().into()),
        };

        let field = self.field_repo.create(model).await?;
        tracing::info!(field = %field.name, "Registered custom persona field");
        Ok(field)
    }

    /// Change label, kind, required flag or order.
    pub async fn update(&self, id: &str, input: UpdateFieldInput) -> AppResult<persona_field::Model> {
        input.validate()?;
        let field = self.field_repo.get_by_id(id).await?;

        let mut active: persona_field::ActiveModel = field.into();
        if let Some(label) = input.label {
            active.label = Set(label.trim().to_string());
        }
        if let Some(input_kind) = input.input_kind {
            active.input_kind = Set(input_kind);
        }
        if let Some(required) = input.required {
            active.required = Set(required);
        }
        if let Some(sort_order) = input.sort_order {
            active.sort_order = Set(sort_order);
        }

        self.field_repo.update(active).await
    }

    /// All fields in display order.
    pub async fn list(&self) -> AppResult<Vec<persona_field::Model>> {
        self.field_repo.find_all().await
    }

    /// Remove a field and every stored value for it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.field_repo.delete(id).await
    }
}

//! Persona compiler.
//!
//! Renders a persona, its custom fields and its group overlays into the
//! character sheet every prompt starts with. Regeneration recompiles the
//! same persona, so the output must be identical for identical input.

use castroom_db::entities::{persona, persona_field, persona_group};
use serde::Serialize;

/// A custom field definition with this persona's value, if any.
#[derive(Debug, Clone, Serialize)]
pub struct CustomFieldValue {
    pub field: persona_field::Model,
    pub value: Option<String>,
}

/// Everything the compiler reads for one persona.
#[derive(Debug, Clone, Serialize)]
pub struct PersonaSnapshot {
    pub persona: persona::Model,
    /// Every registered custom field, with or without a value.
    pub fields: Vec<CustomFieldValue>,
    pub groups: Vec<persona_group::Model>,
}

/// Compile a snapshot into a character sheet.
#[must_use]
pub fn compile_persona(snapshot: &PersonaSnapshot) -> String {
    let p = &snapshot.persona;
    let mut sheet = String::new();

    sheet.push_str("# Basic information\n");
    push_line(&mut sheet, "Name", &p.display_key);
    push_line(&mut sheet, "Nickname", &p.nickname);
    push_line(&mut sheet, "Age", &p.age);
    push_line(&mut sheet, "Birthday", &p.birthday);
    push_line(&mut sheet, "Birthplace", &p.birthplace);
    push_line(&mut sheet, "Occupation", &p.occupation);
    push_line(&mut sheet, "Appearance", &p.appearance);

    sheet.push_str("\n# Personality and speech\n");
    push_line(&mut sheet, "Personality", &p.personality);
    push_line(&mut sheet, "Strengths", &p.strengths);
    push_line(&mut sheet, "Weaknesses", &p.weaknesses);
    push_line(&mut sheet, "Speech style", &p.speech_style);
    push_line(&mut sheet, "Catchphrase", &p.catchphrase);
    push_line(&mut sheet, "Hobbies", &p.hobbies);
    push_line(&mut sheet, "Likes", &p.likes);
    push_line(&mut sheet, "Dislikes", &p.dislikes);

    sheet.push_str("\n# Background story\n");
    push_line(&mut sheet, "Backstory", &p.backstory);
    push_line(&mut sheet, "Family", &p.family);
    push_line(&mut sheet, "Turning point", &p.turning_point);
    push_line(&mut sheet, "Secret", &p.secret);

    if !snapshot.fields.is_empty() {
        let mut fields: Vec<&CustomFieldValue> = snapshot.fields.iter().collect();
        fields.sort_by(|a, b| {
            a.field
                .sort_order
                .cmp(&b.field.sort_order)
                .then_with(|| a.field.name.cmp(&b.field.name))
        });

        sheet.push_str("\n# Additional settings\n");
        for entry in fields {
            push_line(
                &mut sheet,
                &entry.field.label,
                entry.value.as_deref().unwrap_or_default(),
            );
        }
    }

    if !snapshot.groups.is_empty() {
        let mut groups: Vec<&persona_group::Model> = snapshot.groups.iter().collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

        sheet.push_str("\n# Shared group settings\n");
        for group in groups {
            sheet.push_str(&format!("## {}\n{}\n", group.name, group.content.trim_end()));
        }
    }

    sheet
}

fn push_line(sheet: &mut String, label: &str, value: &str) {
    sheet.push_str(&format!("- {label}: {value}\n"));
}

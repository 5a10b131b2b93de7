//! Database integration tests.
//!
//! Run against an in-memory `SQLite` database with all migrations applied.

#![allow(clippy::unwrap_used)]

use castroom_common::AppError;
use castroom_db::entities::post::{Evaluation, PostStatus, SentStatus};
use castroom_db::entities::situation::TimeBand;
use castroom_db::entities::{
    persona, persona_field, persona_field::FieldInputKind, persona_group, persona_group_member,
    post, situation, situation_category, tuning_history,
};
use castroom_db::repositories::{
    GroupRepository, PersonaFieldRepository, PersonaRepository, PostFilter, PostRepository,
    SituationRepository, TuningHistoryRepository,
};
use castroom_db::test_utils::TestDatabase;
use chrono::Utc;
use sea_orm::Set;

fn persona(id: &str, key: &str, categories: &[&str]) -> persona::ActiveModel {
    persona::ActiveModel {
        id: Set(id.to_string()),
        display_key: Set(key.to_string()),
        nickname: Set(key.to_string()),
        age: Set(String::new()),
        birthday: Set(String::new()),
        birthplace: Set(String::new()),
        appearance: Set(String::new()),
        personality: Set(String::new()),
        strengths: Set(String::new()),
        weaknesses: Set(String::new()),
        speech_style: Set(String::new()),
        catchphrase: Set(String::new()),
        occupation: Set(String::new()),
        hobbies: Set(String::new()),
        likes: Set(String::new()),
        dislikes: Set(String::new()),
        backstory: Set(String::new()),
        family: Set(String::new()),
        turning_point: Set(String::new()),
        secret: Set(String::new()),
        allowed_categories: Set(serde_json::to_string(categories).unwrap()),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}

fn category(id: &str, name: &str) -> situation_category::ActiveModel {
    situation_category::ActiveModel {
        id: Set(id.to_string()),
        name: Set(name.to_string()),
        created_at: Set(Utc::now().into()),
    }
}

fn situation(id: &str, content: &str, category_id: &str) -> situation::ActiveModel {
    situation::ActiveModel {
        id: Set(id.to_string()),
        content: Set(content.to_string()),
        time_band: Set(TimeBand::Morning),
        category_id: Set(category_id.to_string()),
        created_at: Set(Utc::now().into()),
    }
}

fn draft(id: &str, persona_id: &str) -> post::ActiveModel {
    post::ActiveModel {
        id: Set(id.to_string()),
        persona_id: Set(persona_id.to_string()),
        created_at: Set(Utc::now().into()),
        content: Set("hello".to_string()),
        theme: Set("morning coffee".to_string()),
        evaluation: Set(Evaluation::Unrated),
        advice: Set("[]".to_string()),
        free_advice: Set(String::new()),
        status: Set(PostStatus::Draft),
        posted_at: Set(None),
        sent_status: Set(SentStatus::NotSent),
        sent_at: Set(None),
        updated_at: Set(None),
    }
}

#[tokio::test]
async fn test_situations_found_by_category_id() {
    let db = TestDatabase::new().await.unwrap();
    let repo = SituationRepository::new(db.shared());

    repo.create_category(category("c1", "daily")).await.unwrap();
    repo.create_category(category("c2", "work")).await.unwrap();
    repo.create(situation("s1", "morning coffee", "c1")).await.unwrap();
    repo.create(situation("s2", "deadline", "c2")).await.unwrap();

    let found = repo
        .find_by_category_ids(&["c1".to_string(), "ghost".to_string()])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].content, "morning coffee");
}

#[tokio::test]
async fn test_duplicate_situation_content_is_conflict() {
    let db = TestDatabase::new().await.unwrap();
    let repo = SituationRepository::new(db.shared());

    repo.create_category(category("c1", "daily")).await.unwrap();
    repo.create(situation("s1", "morning coffee", "c1")).await.unwrap();
    let err = repo
        .create(situation("s2", "morning coffee", "c1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_situation_with_unknown_category_is_constraint_violation() {
    let db = TestDatabase::new().await.unwrap();
    let repo = SituationRepository::new(db.shared());

    let err = repo
        .create(situation("s1", "orphan", "missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConstraintViolation(_)));
}

#[tokio::test]
async fn test_category_delete_cascades_to_situations() {
    let db = TestDatabase::new().await.unwrap();
    let repo = SituationRepository::new(db.shared());

    repo.create_category(category("c1", "daily")).await.unwrap();
    repo.create(situation("s1", "morning coffee", "c1")).await.unwrap();
    repo.delete_category("c1").await.unwrap();

    assert!(repo.find_by_id("s1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_persona_delete_cascades_to_posts_and_history() {
    let db = TestDatabase::new().await.unwrap();
    let personas = PersonaRepository::new(db.shared());
    let posts = PostRepository::new(db.shared());
    let history = TuningHistoryRepository::new(db.shared());

    personas.create(persona("p1", "mira", &["c1"])).await.unwrap();
    let created = posts.create(draft("post1", "p1")).await.unwrap();

    let mut active: post::ActiveModel = created.into();
    active.content = Set("hello again".to_string());
    posts
        .apply_regeneration(
            tuning_history::ActiveModel {
                id: Set("h1".to_string()),
                post_id: Set("post1".to_string()),
                created_at: Set(Utc::now().into()),
                previous_content: Set("hello".to_string()),
                advice_used: Set("shorter".to_string()),
                new_content: Set("hello again".to_string()),
            },
            active,
        )
        .await
        .unwrap();
    assert_eq!(history.find_by_post("post1").await.unwrap().len(), 1);

    personas.delete("p1").await.unwrap();

    assert!(posts.find_by_id("post1").await.unwrap().is_none());
    assert!(history.find_by_post("post1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_regeneration_rolls_back_when_post_update_fails() {
    let db = TestDatabase::new().await.unwrap();
    let personas = PersonaRepository::new(db.shared());
    let posts = PostRepository::new(db.shared());
    let history = TuningHistoryRepository::new(db.shared());

    personas.create(persona("p1", "mira", &[])).await.unwrap();
    posts.create(draft("post1", "p1")).await.unwrap();

    // Update of a post that does not exist fails after the history insert
    let mut ghost = draft("ghost", "p1");
    ghost.content = Set("x".to_string());
    let result = posts
        .apply_regeneration(
            tuning_history::ActiveModel {
                id: Set("h1".to_string()),
                post_id: Set("post1".to_string()),
                created_at: Set(Utc::now().into()),
                previous_content: Set("hello".to_string()),
                advice_used: Set(String::new()),
                new_content: Set("x".to_string()),
            },
            ghost,
        )
        .await;

    assert!(result.is_err());
    assert!(history.find_by_post("post1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_post_filter_by_status_and_persona() {
    let db = TestDatabase::new().await.unwrap();
    let personas = PersonaRepository::new(db.shared());
    let posts = PostRepository::new(db.shared());

    personas.create(persona("p1", "mira", &[])).await.unwrap();
    personas.create(persona("p2", "ren", &[])).await.unwrap();
    posts.create(draft("a", "p1")).await.unwrap();
    posts.create(draft("b", "p2")).await.unwrap();
    let mut approved = draft("c", "p1");
    approved.status = Set(PostStatus::Approved);
    posts.create(approved).await.unwrap();

    let filter = PostFilter {
        persona_id: Some("p1".to_string()),
        status: Some(PostStatus::Draft),
        ..Default::default()
    };
    let found = posts.find_filtered(&filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "a");
}

#[tokio::test]
async fn test_field_value_upsert_overwrites() {
    let db = TestDatabase::new().await.unwrap();
    let personas = PersonaRepository::new(db.shared());
    let fields = PersonaFieldRepository::new(db.shared());

    personas.create(persona("p1", "mira", &[])).await.unwrap();
    fields
        .create(persona_field::ActiveModel {
            id: Set("f1".to_string()),
            name: Set("blood_type".to_string()),
            label: Set("Blood type".to_string()),
            input_kind: Set(FieldInputKind::Text),
            required: Set(false),
            sort_order: Set(0),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();

    personas
        .upsert_field_value("v1".to_string(), "p1", "f1", "A".to_string())
        .await
        .unwrap();
    personas
        .upsert_field_value("v2".to_string(), "p1", "f1", "O".to_string())
        .await
        .unwrap();

    let values = personas.find_field_values("p1").await.unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values[0].value, "O");

    fields.delete("f1").await.unwrap();
    assert!(personas.find_field_values("p1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_replace_memberships() {
    let db = TestDatabase::new().await.unwrap();
    let personas = PersonaRepository::new(db.shared());
    let groups = GroupRepository::new(db.shared());

    personas.create(persona("p1", "mira", &[])).await.unwrap();
    for (id, name) in [("g1", "school"), ("g2", "band")] {
        groups
            .create(persona_group::ActiveModel {
                id: Set(id.to_string()),
                name: Set(name.to_string()),
                content: Set(format!("{name} setting")),
                created_at: Set(Utc::now().into()),
                updated_at: Set(None),
            })
            .await
            .unwrap();
    }

    let member = |id: &str, group_id: &str| persona_group_member::ActiveModel {
        id: Set(id.to_string()),
        persona_id: Set("p1".to_string()),
        group_id: Set(group_id.to_string()),
        created_at: Set(Utc::now().into()),
    };

    groups
        .replace_memberships("p1", vec![member("m1", "g1"), member("m2", "g2")])
        .await
        .unwrap();
    let names: Vec<_> = groups
        .find_by_persona("p1")
        .await
        .unwrap()
        .into_iter()
        .map(|g| g.name)
        .collect();
    assert_eq!(names, vec!["band", "school"]);

    groups
        .replace_memberships("p1", vec![member("m3", "g1")])
        .await
        .unwrap();
    assert_eq!(groups.find_by_persona("p1").await.unwrap().len(), 1);
    assert_eq!(groups.find_member_ids("g1").await.unwrap(), vec!["p1"]);
}

#[tokio::test]
async fn test_persona_delete_cascades_to_memberships() {
    let db = TestDatabase::new().await.unwrap();
    let personas = PersonaRepository::new(db.shared());
    let groups = GroupRepository::new(db.shared());

    personas.create(persona("p1", "mira", &[])).await.unwrap();
    personas.create(persona("p2", "ren", &[])).await.unwrap();
    groups
        .create(persona_group::ActiveModel {
            id: Set("g1".to_string()),
            name: Set("school".to_string()),
            content: Set("same school".to_string()),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        })
        .await
        .unwrap();
    for (id, persona_id) in [("m1", "p1"), ("m2", "p2")] {
        groups
            .replace_memberships(
                persona_id,
                vec![persona_group_member::ActiveModel {
                    id: Set(id.to_string()),
                    persona_id: Set(persona_id.to_string()),
                    group_id: Set("g1".to_string()),
                    created_at: Set(Utc::now().into()),
                }],
            )
            .await
            .unwrap();
    }

    personas.delete("p1").await.unwrap();

    assert_eq!(groups.find_member_ids("g1").await.unwrap(), vec!["p2"]);
    assert!(groups.find_by_persona("p1").await.unwrap().is_empty());
    assert!(groups.find_by_id("g1").await.unwrap().is_some());
}

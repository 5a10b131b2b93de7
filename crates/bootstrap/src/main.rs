//! castroom entry point.
//!
//! Prepares the store and wires the services an operator front end calls
//! into: loads configuration, runs migrations and seeds first-run data.

use std::sync::Arc;

use anyhow::Context;
use castroom_common::Config;
use castroom_core::{
    AdviceService, ExportService, GenerationService, GroupService, PersonaFieldService,
    PersonaService, PostLifecycleService, Scheduler, SeedService, SettingsService,
    SituationService, WebhookRowSink, generator,
};
use castroom_db::repositories::{
    AdviceRepository, AppSettingRepository, GroupRepository, PersonaFieldRepository,
    PersonaRepository, PostRepository, SendHistoryRepository, SituationRepository,
    TuningHistoryRepository,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Every service, sharing one connection pool.
#[allow(dead_code)]
struct Services {
    personas: PersonaService,
    persona_fields: PersonaFieldService,
    groups: GroupService,
    situations: SituationService,
    advice: AdviceService,
    settings: SettingsService,
    generation: GenerationService,
    lifecycle: PostLifecycleService,
    export: ExportService,
    seed: SeedService,
}

fn build_services(
    config: &Config,
    db: &Arc<sea_orm::DatabaseConnection>,
) -> anyhow::Result<Services> {
    let personas = PersonaService::new(
        PersonaRepository::new(db.clone()),
        PersonaFieldRepository::new(db.clone()),
        GroupRepository::new(db.clone()),
        SituationRepository::new(db.clone()),
    );
    let situations = SituationService::new(SituationRepository::new(db.clone()));
    let settings = SettingsService::new(AppSettingRepository::new(db.clone()));

    let text_generator = generator::from_config(&config.generation)?;
    let scheduler = Scheduler::new(config.generation.tz()?);
    let sink = Arc::new(WebhookRowSink::new(&config.export)?);

    let generation = GenerationService::new(
        personas.clone(),
        SituationRepository::new(db.clone()),
        PostRepository::new(db.clone()),
        settings.clone(),
        text_generator.clone(),
        &config.generation,
    )?;
    let lifecycle = PostLifecycleService::new(
        PostRepository::new(db.clone()),
        TuningHistoryRepository::new(db.clone()),
        personas.clone(),
        settings.clone(),
        text_generator,
        scheduler,
        config.generation.length_policy,
    );
    let export = ExportService::new(
        PostRepository::new(db.clone()),
        PersonaRepository::new(db.clone()),
        SendHistoryRepository::new(db.clone()),
        settings.clone(),
        sink,
        scheduler,
    );
    let seed = SeedService::new(
        settings.clone(),
        situations.clone(),
        personas.clone(),
        SituationRepository::new(db.clone()),
        PersonaRepository::new(db.clone()),
    );

    Ok(Services {
        persona_fields: PersonaFieldService::new(PersonaFieldRepository::new(db.clone())),
        groups: GroupService::new(GroupRepository::new(db.clone())),
        advice: AdviceService::new(AdviceRepository::new(db.clone())),
        personas,
        situations,
        settings,
        generation,
        lifecycle,
        export,
        seed,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "castroom=debug".into()),
        )
        .init();

    info!("Starting castroom...");

    let config = Config::load().context("Failed to load configuration")?;
    config.validate()?;

    let db = castroom_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    castroom_db::migrate(&db).await?;
    info!("Migrations completed");

    let db = Arc::new(db);
    let services = build_services(&config, &db)?;

    let report = services.seed.seed_defaults().await?;
    info!(
        settings = report.settings,
        categories = report.categories,
        situations = report.situations,
        personas = report.personas,
        "Store ready"
    );

    if config.generation.api_key.is_none() {
        warn!("generation.api_key is not set; draft generation is unavailable");
    }
    if config.export.token.is_none() {
        warn!("export.token is not set; exports will be recorded as failed");
    }

    let personas = services.personas.list().await?;
    info!(personas = personas.len(), "castroom is ready");

    Ok(())
}

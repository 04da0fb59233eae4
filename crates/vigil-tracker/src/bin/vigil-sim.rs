//! Vigil simulation binary
//!
//! Runs a scripted encounter across one host session and two participant
//! sessions sharing an in-memory store and bus, printing each session's
//! view as the lifecycle advances.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vigil_store::{JsonFileStore, MemoryStore};
use vigil_tracker::{
    Action, Confirmation, Disposition, Participant, ParticipantId, PositionCache, RandRoller,
    Roster, Scene, Session, SessionId, SyncBus, Token, TrackerConfig, TrackerContext, TrackerView,
    WindowPosition,
};

fn print_view(label: &str, view: &TrackerView) {
    println!("-- {label} (combat_active={}, visible={})", view.combat_active, view.visible);
    for row in &view.rows {
        let pips: String = row
            .pips
            .iter()
            .map(|p| if p.active { '●' } else { '○' })
            .collect();
        println!("   {:<10} {:<10} {}", row.name, row.readiness, pips);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil=info,vigil_tracker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Vigil simulation");

    let roster = Roster::new();
    roster.add(Participant {
        id: ParticipantId::new("theo"),
        name: "Theo".to_string(),
        player_controlled: true,
        modifier: 3,
        class_name: Some("Songweaver".to_string()),
    });
    roster.add(Participant {
        id: ParticipantId::new("mira"),
        name: "Mira".to_string(),
        player_controlled: true,
        modifier: -1,
        class_name: Some("Hexbinder".to_string()),
    });

    let mut scene = Scene::new("scene-1");
    scene.add_token(Token::for_participant("tok-theo", ParticipantId::new("theo"), true).at(4.0, 2.0));
    scene.add_token(Token::for_participant("tok-mira", ParticipantId::new("mira"), true).at(6.0, 2.0));
    scene.add_token(Token::new("tok-ogre", Disposition::Hostile).at(9.0, 7.0));

    let ctx = TrackerContext::new(
        Arc::new(MemoryStore::new()),
        Arc::new(SyncBus::new(64)),
        roster,
        scene,
        TrackerConfig::from_env(),
        Arc::new(RandRoller),
    );

    let mut host = Session::host(ctx.clone(), SessionId::new("host"));
    let mut theo = Session::participant(
        ctx.clone(),
        SessionId::new("s-theo"),
        Some(ParticipantId::new("theo")),
    );
    let mut mira = Session::participant(
        ctx.clone(),
        SessionId::new("s-mira"),
        Some(ParticipantId::new("mira")),
    );

    // Client-local cache lives in a file store so it survives restarts.
    let client_store = Arc::new(JsonFileStore::open(
        std::env::temp_dir().join("vigil-sim-client.json"),
    )?);
    let cache = PositionCache::new(client_store, SessionId::new("host"));
    if let Some(position) = cache.restore_position().await {
        tracing::info!(left = position.left, top = position.top, "restored window position");
    }
    cache.save_position(WindowPosition { left: 120.0, top: 64.0 }).await;
    if cache.restore_visible().await {
        tracing::info!("tracker was left open last run");
    }
    cache.save_visible(true).await;

    // Log everything the bus pushes.
    let mut notices = ctx.bus.subscribe();
    tokio::spawn(async move {
        while let Ok(notice) = notices.recv().await {
            tracing::info!(?notice, "bus");
        }
    });

    println!("== host requests initiative");
    host.dispatch(Action::RequestInitiative).await?;
    print_view("host", &host.view().await);
    print_view("theo", &theo.view().await);

    println!("== participants roll");
    theo.dispatch(Action::RollInitiative { participant: None }).await?;
    mira.dispatch(Action::RollInitiative { participant: None }).await?;
    print_view("host", &host.view().await);
    print_view("theo", &theo.view().await);
    print_view("mira", &mira.view().await);

    println!("== host ends combat");
    host.dispatch(Action::EndCombat {
        confirmation: Confirmation::Confirmed,
    })
    .await?;
    print_view("host", &host.view().await);
    print_view("theo", &theo.view().await);

    tracing::info!("Simulation complete");
    Ok(())
}

//! Two-player chess match server.
//!
//! Pairs connecting participants, relays their moves and runs the clocks.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin taikyoku-server
//! cargo run --bin taikyoku-server -- --host 0.0.0.0 --port 3000 --clock-minutes 3 --active-timeout
//! ```

use std::sync::Arc;

use clap::Parser;
use taikyoku_server::{
    domain::TimeControl,
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemorySessionRepository,
        rules::ShakmatyRules,
    },
    ui::Server,
    usecase::{
        ConnectParticipantUseCase, DisconnectParticipantUseCase, EventRouter,
        GetSessionDetailUseCase, GetSessionsUseCase, MakeMoveUseCase, TurnTimer,
    },
};
use taikyoku_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "taikyoku-server")]
#[command(about = "Two-player chess match server with clocks", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Initial time per side in minutes
    #[arg(short = 'c', long, default_value = "5")]
    clock_minutes: u32,

    /// Flag a side as soon as its time runs out instead of on the next event
    #[arg(long)]
    active_timeout: bool,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    // Initialize dependencies in order:
    // 1. Repository / MessagePusher / RulesEngine / WallClock
    // 2. TurnTimer
    // 3. UseCases
    // 4. Server

    // 1. Infrastructure
    let repository = Arc::new(InMemorySessionRepository::new());
    let message_pusher = Arc::new(WebSocketMessagePusher::new());
    let rules = Arc::new(ShakmatyRules);
    let clock = Arc::new(SystemClock);
    let time_control = TimeControl::from_minutes(args.clock_minutes);
    tracing::info!(
        "Time control: {} ms per side, active timeout: {}",
        time_control.initial_millis,
        args.active_timeout
    );

    // 2. TurnTimer
    let turn_timer = Arc::new(TurnTimer::new(
        args.active_timeout,
        repository.clone(),
        message_pusher.clone(),
        clock.clone(),
    ));

    // 3. UseCases
    let connect_participant_usecase = Arc::new(ConnectParticipantUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        rules,
        clock.clone(),
        turn_timer.clone(),
        time_control,
    ));
    let make_move_usecase = Arc::new(MakeMoveUseCase::new(
        repository.clone(),
        message_pusher.clone(),
        clock.clone(),
        turn_timer.clone(),
    ));
    let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
        repository.clone(),
        message_pusher,
        clock,
        turn_timer,
    ));
    let event_router = Arc::new(EventRouter::new(
        connect_participant_usecase,
        make_move_usecase,
        disconnect_participant_usecase,
    ));
    let get_sessions_usecase = Arc::new(GetSessionsUseCase::new(repository.clone()));
    let get_session_detail_usecase = Arc::new(GetSessionDetailUseCase::new(repository));

    // 4. Create and run the server
    let server = Server::new(
        event_router,
        get_sessions_usecase,
        get_session_detail_usecase,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

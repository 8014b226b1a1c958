//! Main Entrypoint for the Prepcall Interview Agent
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Obtaining the shared gateway client and building a call session.
//! 4. Starting the call and rendering transcript updates until the
//!    session concludes or the user hangs up with Ctrl+C.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use prepcall_agent::{
    client::{self, VoiceClient},
    config::Config,
    feedback::HttpFeedbackService,
    session::{CallSession, SessionParams, Transition},
};
use prepcall_core::interview::{AssistantDefinition, CallKind};
use std::sync::Arc;
use tracing::{error, info};

/// Session purpose, mirroring the two interview flows.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Open-ended practice session that generates a new interview.
    Generate,
    /// Question-driven review of an existing interview.
    Review,
}

impl From<Mode> for CallKind {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Generate => CallKind::Generate,
            Mode::Review => CallKind::Review,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "prepcall", about = "Run an AI-led interview call from the terminal")]
struct Cli {
    #[arg(long, value_enum, default_value = "review")]
    mode: Mode,
    #[arg(long)]
    user_name: Option<String>,
    #[arg(long)]
    user_id: Option<String>,
    #[arg(long)]
    interview_id: Option<String>,
    #[arg(long)]
    feedback_id: Option<String>,
    /// An interview question; repeat the flag for multiple questions.
    #[arg(long = "question")]
    questions: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();

    let client = client::shared();
    let feedback = Arc::new(HttpFeedbackService::new(config.feedback_url.clone()));

    let params = SessionParams {
        kind: cli.mode.into(),
        user_name: cli.user_name,
        user_id: cli.user_id,
        interview_id: cli.interview_id,
        feedback_id: cli.feedback_id,
        questions: cli.questions,
        interviewer: Some(AssistantDefinition::interviewer()),
    };

    let mut session = CallSession::new(client.clone(), feedback, Arc::new(config), params);
    session.attach();
    session.start_call().await;

    if let Some(fatal) = session.fatal() {
        error!("{fatal}");
        return Ok(());
    }
    info!("call requested; waiting for the gateway");

    // Ctrl+C stops the gateway call; the connection teardown surfaces
    // as a call-end event, which concludes the session below.
    let hangup_client = client.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("hang-up requested; stopping the call");
            if let Err(e) = hangup_client.stop().await {
                error!("failed to stop the call: {e}");
            }
        }
    });

    let mut last_line: Option<String> = None;
    let route = loop {
        let Some(event) = session.next_event().await else {
            break None;
        };
        let transition = session.apply(event);

        let view = session.view();
        if view.last_message != last_line {
            if let Some(line) = &view.last_message {
                info!("{line}");
            }
            last_line = view.last_message;
        }

        if let Some(fatal) = session.fatal() {
            error!("{fatal}");
            break None;
        }
        if transition == Transition::Finished {
            break Some(session.conclude().await);
        }
    };

    session.detach();

    match route {
        Some(route) => info!(route = %route, "session concluded; navigating"),
        None => info!("session ended without a destination; reload to try again"),
    }
    Ok(())
}

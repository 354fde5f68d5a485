use mimalloc::MiMalloc;
use modules::{
    common::{rustls::TicketMailTls, signal::SignalManager},
    context::{status, Initialize},
    error::TicketMailResult,
    logger,
    poller::runner::PollRunner,
    rest::start_http_server,
    scheduler::PeriodicTasks,
    settings::{cli::SETTINGS, dir::DataDirManager},
};
use tracing::{error, info};

mod modules;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

static LOGO: &str = r#"
  _   _      _        _                   _ _
 | |_(_) ___| | _____| |_ _ __ ___   __ _(_) |
 | __| |/ __| |/ / _ \ __| '_ ` _ \ / _` | | |
 | |_| | (__|   <  __/ |_| | | | | | (_| | | |
  \__|_|\___|_|\_\___|\__|_| |_| |_|\__,_|_|_|

"#;

#[tokio::main]
async fn main() -> TicketMailResult<()> {
    logger::initialize_logging();
    info!("{}", LOGO);
    info!("Starting ticketmail");
    info!("Version:  {}", ticketmail_version!());
    info!("Git:      [{}]", env!("GIT_HASH"));
    info!(
        "Mailbox:  {}@{}:{}/{}",
        SETTINGS.ticketmail_imap_username,
        SETTINGS.ticketmail_imap_host,
        SETTINGS.ticketmail_imap_port,
        SETTINGS.ticketmail_imap_mailbox
    );

    if let Err(error) = initialize().await {
        eprintln!("{:?}", error);
        return Err(error);
    }

    if let Err(e) = start_http_server().await {
        error!("Failed to start REST server: {}", e);
        return Err(e);
    }
    info!("ticketmail stopped");
    Ok(())
}

async fn initialize() -> TicketMailResult<()> {
    status::mark_started();
    SignalManager::initialize().await?;
    DataDirManager::initialize().await?;
    TicketMailTls::initialize().await?;
    PollRunner::initialize().await?;
    PeriodicTasks::start_background_tasks();
    Ok(())
}

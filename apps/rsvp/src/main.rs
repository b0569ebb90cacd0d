use anyhow::{bail, Result};
use clap::Parser;
use client_core::{FormController, HttpRsvpTransport, RsvpTransport, SubmitStatus};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod guest_spec;

use guest_spec::GuestSpec;

#[derive(Parser, Debug)]
#[command(about = "Send a wedding RSVP for one or more guests")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server_url: String,
    /// First|Last|accept|ceremony+reception|dietary (repeatable)
    #[arg(long = "guest", required = true)]
    guests: Vec<GuestSpec>,
    /// Print the request body instead of sending it.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
    let args = Args::parse();

    let controller = FormController::new(HttpRsvpTransport::new(&args.server_url));
    fill_form(&controller, &args.guests).await?;

    let form = controller.snapshot().await;
    if let Some(blocker) = form.submit_blocker() {
        bail!("cannot submit: {blocker}");
    }

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&form.submission())?);
        return Ok(());
    }

    info!(guests = form.submission().guests.len(), server = %args.server_url, "sending rsvp");
    match controller.submit().await {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(err) => match controller.snapshot().await.status() {
            SubmitStatus::Failed(text) => bail!("{text}"),
            _ => Err(err.into()),
        },
    }
}

async fn fill_form<T: RsvpTransport>(controller: &FormController<T>, guests: &[GuestSpec]) -> Result<()> {
    for (position, guest) in guests.iter().enumerate() {
        let index = if position == 0 {
            0
        } else {
            controller.add_guest().await
        };
        for update in guest.updates() {
            controller.update_guest(index, update).await?;
        }
    }
    Ok(())
}

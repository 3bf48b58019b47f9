/* 📖 # Why does `folio` without arguments start the server?

The backend is usually started by a process manager or `cargo run` with nothing but
a `.env` file next to it. Making `serve` the default keeps that invocation short;
the other subcommands are conveniences for poking at a running backend.

Exit codes:
- 0: success (for `serve`, the server stopped)
- 1: error (configuration, store, server startup, or a rejected submission)
*/

use std::env;
use std::process;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tracing::debug;

use folio_base::tracing::init_tracing;
use folio_base::{FolioResult, PalHandle, RealPal};
use folio_engine::client::{
    ContactForm, DEFAULT_API_URL, FormField, FormStatus, HttpContactApi, SUCCESS_MESSAGE,
};
use folio_engine::{MailMode, load_config, start_server};

#[derive(Parser)]
#[command(name = "folio", version, about = "Portfolio contact form backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP backend (default)
    Serve {
        /// Listen port, overrides PORT
        #[arg(long)]
        port: Option<u16>,
        /// Log outgoing email instead of sending it through SMTP
        #[arg(long)]
        dry_mail: bool,
    },
    /// Submit a contact message to a running backend
    Send {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        subject: String,
        #[arg(long, default_value = "")]
        message: String,
        /// Backend base URL
        #[arg(long, default_value = DEFAULT_API_URL, value_name = "URL")]
        api: String,
    },
    /// Print the messages stored by a running backend
    Messages {
        /// Backend base URL
        #[arg(long, default_value = DEFAULT_API_URL, value_name = "URL")]
        api: String,
    },
}

fn main() {
    dotenv().ok();
    if let Err(e) = init_tracing() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Serve {
        port: None,
        dry_mail: false,
    });

    if let Err(e) = run(command) {
        eprintln!("Error: {:?}", e);
        process::exit(1);
    }
}

fn run(command: Command) -> FolioResult<()> {
    let current_dir = env::current_dir()
        .map_err(|e| folio_base::err!("Failed to get current directory: {}", e))?;
    debug!(dir = %current_dir.display(), "using working directory");
    let pal = PalHandle::new(RealPal::new(current_dir));

    match command {
        Command::Serve { port, dry_mail } => serve(&pal, port, dry_mail),
        Command::Send {
            name,
            email,
            subject,
            message,
            api,
        } => {
            let mut form = ContactForm::new();
            form.set(FormField::Name, name);
            form.set(FormField::Email, email);
            form.set(FormField::Subject, subject);
            form.set(FormField::Message, message);
            send(&pal, form, &api)
        }
        Command::Messages { api } => print_messages(&api),
    }
}

fn serve(pal: &PalHandle, port: Option<u16>, dry_mail: bool) -> FolioResult<()> {
    let mut config = load_config(pal)?;
    if let Some(port) = port {
        config.port = port;
    }
    let mail_mode = if dry_mail {
        MailMode::DryRun
    } else {
        MailMode::Smtp
    };

    let handle = start_server(pal, &config, mail_mode)?;
    println!("Server running on port {}", handle.port());
    handle.wait();
    Ok(())
}

fn send(pal: &PalHandle, mut form: ContactForm, api_url: &str) -> FolioResult<()> {
    let api = HttpContactApi::new(api_url)?;
    match form.submit(&api, pal) {
        FormStatus::Success { .. } => {
            println!("{}", SUCCESS_MESSAGE);
            Ok(())
        }
        FormStatus::Error { message } => folio_base::bail!("{}", message),
        status => folio_base::bail!("Submission ended in unexpected state {:?}", status),
    }
}

fn print_messages(api_url: &str) -> FolioResult<()> {
    let api = HttpContactApi::new(api_url)?;
    let listing = api
        .get_messages()
        .map_err(|e| folio_base::err!("Failed to fetch messages: {}", e))?;

    println!("{} messages", listing.count);
    for message in &listing.messages {
        println!(
            "\n{}  {} <{}>\n  Subject: {}\n  {}",
            message.created_at().to_rfc3339(),
            message.name(),
            message.email(),
            message.subject(),
            message.message()
        );
    }
    Ok(())
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use docsmith_auth::callback::SIGNED_IN_MESSAGE;
use docsmith_auth::{
    complete_sign_in, current_identity, request_magic_link, AuthBridge, AuthStorage, FileStorage, MemoryStorage,
    SupabaseAuthClient, LINK_SENT_MESSAGE,
};
use docsmith_models::{language_label, Availability, SUPPORTED_LANGUAGES};
use docsmith_utils::{human_size, init_logging, AppConfig, DocSmithResult};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

mod environment;
mod workflow;

use environment::build_environment;
use workflow::{DocumentWorkflow, TranslateSource, WorkflowEvent};

#[derive(Parser)]
#[command(name = "docsmith")]
#[command(about = "Summarize and translate PDF and DOCX documents with on-device models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether the on-device models are ready
    Availability {
        /// Also check the translator for this target language
        #[arg(long)]
        to: Option<String>,
    },
    /// Extract a document and summarize it
    Summarize {
        file: PathBuf,
        /// Translate the result into this language afterwards
        #[arg(long)]
        translate: Option<String>,
        /// Text to translate when --translate is given
        #[arg(long, value_enum, default_value_t = TranslateSource::Summary)]
        from: TranslateSource,
    },
    /// Extract a document and translate its text
    Translate {
        file: PathBuf,
        /// Target language code; defaults to the configured target
        #[arg(long)]
        to: Option<String>,
    },
    /// List supported translation languages
    Languages,
    /// Passwordless sign-in
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Email a magic link
    SignIn { email: String },
    /// Complete sign-in from the URL the magic link redirected to
    Callback { url: String },
    /// Show the signed-in user
    Whoami {
        /// Redirect URL whose fragment tokens should be adopted first
        #[arg(long)]
        url: Option<String>,
    },
    /// Sign out and clear the stored session
    SignOut,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load().unwrap_or_else(|error| {
        eprintln!("Failed to load configuration ({}), using defaults", error);
        AppConfig::default()
    });

    init_logging(&config.logging)?;
    if !config.auth.is_configured() {
        warn!("Supabase URL or anon key is missing; sign-in commands will fail");
    }

    if let Err(error) = run(cli.command, &config).await {
        eprintln!("{}", error.user_message());
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Commands, config: &AppConfig) -> DocSmithResult<()> {
    match command {
        Commands::Availability { to } => availability(config, to).await,
        Commands::Summarize { file, translate, from } => {
            let mut workflow = build_workflow(config);
            load(&mut workflow, &file).await?;

            let result = workflow.summarize().await?;
            println!("{}", result.summary);

            if let Some(target) = translate {
                let translation = workflow.translate(&target, from).await?;
                println!();
                println!("--- {} ---", language_label(&target).unwrap_or(target.as_str()));
                println!("{}", translation.text);
            }
            Ok(())
        }
        Commands::Translate { file, to } => {
            let target = to.unwrap_or_else(|| config.translator.default_target_language.clone());
            let mut workflow = build_workflow(config);
            load(&mut workflow, &file).await?;

            let translation = workflow.translate(&target, TranslateSource::Extracted).await?;
            println!("{}", translation.text);
            Ok(())
        }
        Commands::Languages => {
            for (code, label) in SUPPORTED_LANGUAGES {
                println!("{:<4}{}", code, label);
            }
            Ok(())
        }
        Commands::Auth { command } => auth(command, config).await,
    }
}

fn build_workflow(config: &AppConfig) -> DocumentWorkflow {
    DocumentWorkflow::from_config(config, build_environment(&config.ollama))
        .with_observer(Arc::new(|event: &WorkflowEvent| report(event)))
}

async fn load(workflow: &mut DocumentWorkflow, file: &std::path::Path) -> DocSmithResult<()> {
    let document = workflow.load_file(file).await?;
    eprintln!(
        "Loaded {} ({} {}, {} characters)",
        document.file_name,
        document.format,
        human_size(document.size_bytes),
        document.text.chars().count()
    );
    Ok(())
}

/// Banner and download progress go to stderr; stdout carries results only.
fn report(event: &WorkflowEvent) {
    if let Err(error) = write_report(&mut std::io::stderr().lock(), event) {
        debug!(%error, "could not write progress to stderr");
    }
}

fn write_report(out: &mut impl Write, event: &WorkflowEvent) -> std::io::Result<()> {
    match event {
        WorkflowEvent::FirstTimeDownload(banner) => writeln!(out, "{}", banner),
        WorkflowEvent::DownloadProgress { capability, event } => {
            let label = event
                .percent()
                .map(|percent| format!("{}%", percent))
                .unwrap_or_else(|| "…".to_string());
            write!(out, "\rDownloading {} model… {}", capability, label)?;
            if event.is_complete() {
                writeln!(out)?;
            }
            out.flush()
        }
    }
}

async fn availability(config: &AppConfig, to: Option<String>) -> DocSmithResult<()> {
    let mut workflow = build_workflow(config);

    let summarizer = workflow.check_summarizer().await;
    println!("summarizer: {}{}", summarizer, hint(summarizer));

    if let Some(target) = to {
        docsmith_utils::validate_language_code(&target)?;
        let translator = workflow.check_translator(&target).await;
        println!(
            "translator ({} -> {}): {}{}",
            config.translator.default_source_language,
            target,
            translator,
            hint(translator)
        );
    }
    Ok(())
}

fn hint(availability: Availability) -> &'static str {
    match availability {
        Availability::Available => "",
        Availability::Downloadable => " (model will download on first use)",
        Availability::Unavailable => " (enable on-device AI or install the model runtime)",
    }
}

async fn auth(command: AuthCommands, config: &AppConfig) -> DocSmithResult<()> {
    let storage: Arc<dyn AuthStorage> = match config.auth.resolved_storage_path() {
        Some(path) => Arc::new(FileStorage::new(path)),
        None => {
            warn!("no data directory available; auth state will not persist");
            Arc::new(MemoryStorage::new())
        }
    };
    let bridge = SupabaseAuthClient::from_config(&config.auth, Arc::clone(&storage))?;

    match command {
        AuthCommands::SignIn { email } => {
            request_magic_link(&bridge, storage.as_ref(), &email, &config.auth.redirect_to).await?;
            println!("{}", LINK_SENT_MESSAGE);
        }
        AuthCommands::Callback { url } => {
            let outcome = complete_sign_in(&bridge, storage.as_ref(), &url).await?;
            info!(method = ?outcome.method, "sign-in completed");
            println!("{}", SIGNED_IN_MESSAGE);
            if let Some(email) = outcome.email {
                println!("Signed in as {}", email);
            }
        }
        AuthCommands::Whoami { url } => match current_identity(&bridge, url.as_deref()).await? {
            Some(email) => println!("{}", email),
            None => println!("Not signed in."),
        },
        AuthCommands::SignOut => {
            bridge.sign_out().await?;
            println!("Signed out.");
        }
    }
    Ok(())
}

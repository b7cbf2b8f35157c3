use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use sendgrid_notify::{
    Config,
    email::{EmailAttachment, EmailRequest, EmailResponse, ProviderRegistry, create_registry},
    startup_checks,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the configuration and list the registered providers
    Check,

    /// Send a single email through the configured provider
    Send {
        #[arg(long)]
        to: String,

        /// Defaults to the configured from address
        #[arg(long)]
        from: Option<String>,

        #[arg(short, long)]
        subject: String,

        #[arg(long)]
        text: Option<String>,

        #[arg(long)]
        html: Option<String>,

        #[arg(long)]
        cc: Vec<String>,

        #[arg(long)]
        bcc: Vec<String>,

        /// File to attach; may be repeated
        #[arg(short, long)]
        attach: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::load(&cli.config)?;
    info!("Starting {}", config.app.name);
    info!("Configuration loaded from: {:?}", cli.config);

    match cli.command {
        Commands::Check => run_check(&config),
        Commands::Send {
            to,
            from,
            subject,
            text,
            html,
            cc,
            bcc,
            attach,
        } => {
            let from = match from.or_else(|| config.notifications.email.format_from()) {
                Some(from) => from,
                None => {
                    eprintln!("Error: no --from given and no from_address configured");
                    std::process::exit(1);
                }
            };

            let mut request = EmailRequest::new(from, to, subject);
            request.text = text;
            request.html = html;
            request.cc = cc;
            request.bcc = bcc;
            for path in &attach {
                request = request.with_attachment(read_attachment(path).await?);
            }

            run_send(&config, request).await
        }
    }
}

fn run_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let (registry, registry_failed) = match create_registry(&config.notifications) {
        Ok(registry) => (registry, false),
        Err(e) => {
            tracing::error!("Failed to initialize email providers: {}", e);
            (ProviderRegistry::new(), true)
        }
    };

    let checks = startup_checks::perform_startup_checks(config, &registry);
    if let Err(errors) = &checks {
        for error in errors {
            tracing::error!("Startup check failed: {}", error);
        }
    }

    if registry.is_empty() {
        println!("No email providers registered");
    } else {
        println!("Registered email providers:");
        for name in registry.names() {
            let marker = if registry.primary_name() == Some(name) {
                " (primary)"
            } else {
                ""
            };
            println!("  {}{}", name, marker);
        }
    }

    match checks {
        Err(errors) if errors.iter().any(|e| e.is_critical()) => {
            tracing::error!("Critical startup check failed, exiting");
            Err("Critical startup check failed".into())
        }
        _ if registry_failed => Err("Email provider initialization failed".into()),
        _ => Ok(()),
    }
}

async fn run_send(config: &Config, request: EmailRequest) -> Result<(), Box<dyn std::error::Error>> {
    let registry = create_registry(&config.notifications)?;
    let Some(provider) = registry.email_provider() else {
        eprintln!("Error: no email provider is configured");
        std::process::exit(1);
    };

    info!("Sending email to {} via {}", request.to, provider.name());
    match provider.send_email(request).await {
        EmailResponse::Success { message_id } => {
            println!(
                "Email sent. Message ID: {}",
                message_id.as_deref().unwrap_or("(none)")
            );
            Ok(())
        }
        EmailResponse::Error { message } => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
    }
}

async fn read_attachment(path: &Path) -> Result<EmailAttachment, std::io::Error> {
    let content = tokio::fs::read(path).await?;
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string();
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());

    Ok(EmailAttachment::new(content, content_type, filename))
}

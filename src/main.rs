use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wsl_notify::dispatch::Dispatcher;
use wsl_notify::notify::protocol::{
    HintCrop, ImagePlacement, NotifyRequest, NotifyResponse, ToastAudio, ToastButton,
    ToastDuration, ToastImage,
};
use wsl_notify::notify::{self, NotifyServer};
use wsl_notify::sink::PowerShellSink;
use wsl_notify::toast::ToastXmlOptions;

/// Bridge daemon forwarding notifications from WSL to Windows toasts
#[derive(Parser)]
#[command(name = "wsl-notifyd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Unix socket path of the bridge
    #[arg(
        long,
        env = "WSL_NOTIFY_SOCK",
        default_value = notify::DEFAULT_SOCKET_PATH
    )]
    socket: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bridge daemon (default)
    Serve {
        /// Path to powershell.exe
        #[arg(long)]
        powershell: Option<String>,
        /// Omit the XML declaration from generated toast documents
        #[arg(long)]
        no_xml_declaration: bool,
    },
    /// Send a notification through a running daemon
    Send {
        /// Notification title
        title: String,
        /// Notification body
        message: String,
        /// Target opened when the notification is clicked
        #[arg(short, long)]
        url: Option<String>,
        /// Attribution line shown under the body
        #[arg(short, long)]
        attribution: Option<String>,
        /// Button as LABEL=TARGET (repeatable, shown in order)
        #[arg(short, long = "button", value_parser = parse_button)]
        button: Vec<ToastButton>,
        /// Image path (WSL or Windows)
        #[arg(long)]
        image: Option<String>,
        /// Show the image as a hero banner instead of the app logo
        #[arg(long, requires = "image")]
        hero: bool,
        /// Crop the image to a circle
        #[arg(long, requires = "image")]
        circle: bool,
        /// How long the toast stays on screen (short, long)
        #[arg(long, value_parser = parse_duration)]
        duration: Option<ToastDuration>,
        /// Show the toast without a sound
        #[arg(long)]
        silent: bool,
    },
}

fn parse_button(s: &str) -> Result<ToastButton, String> {
    match s.split_once('=') {
        Some((label, src)) if !label.is_empty() => Ok(ToastButton {
            label: label.to_string(),
            src: src.to_string(),
        }),
        _ => Err(format!("expected LABEL=TARGET, got '{}'", s)),
    }
}

fn parse_duration(s: &str) -> Result<ToastDuration, String> {
    match s {
        "long" => Ok(ToastDuration::Long),
        "short" => Ok(ToastDuration::Short),
        _ => Err(format!("expected 'long' or 'short', got '{}'", s)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ログ初期化
    init_logging(&cli.log_level);

    match cli.command {
        Some(Commands::Send {
            title,
            message,
            url,
            attribution,
            button,
            image,
            hero,
            circle,
            duration,
            silent,
        }) => {
            let req = NotifyRequest {
                title,
                message,
                url,
                attribution,
                button: if button.is_empty() {
                    None
                } else {
                    Some(button)
                },
                image: image.map(|src| ToastImage {
                    placement: if hero {
                        ImagePlacement::Hero
                    } else {
                        ImagePlacement::AppLogoOverride
                    },
                    hint_crop: circle.then_some(HintCrop::Circle),
                    src,
                }),
                audio: silent.then_some(ToastAudio {
                    src: None,
                    r#loop: None,
                    silent: Some(true),
                }),
                duration,
            };
            send(&cli.socket, &req)
        }
        Some(Commands::Serve {
            powershell,
            no_xml_declaration,
        }) => serve(cli.socket, powershell, no_xml_declaration).await,
        None => serve(cli.socket, None, false).await,
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn serve(
    socket: PathBuf,
    powershell: Option<String>,
    no_xml_declaration: bool,
) -> Result<()> {
    let sink = match powershell {
        Some(program) => PowerShellSink::with_program(program),
        None => PowerShellSink::new(),
    };
    let options = ToastXmlOptions {
        xml_declaration: !no_xml_declaration,
    };
    let dispatcher = Dispatcher::with_options(Box::new(sink), options);

    NotifyServer::new(socket, dispatcher).run().await
}

fn send(socket: &std::path::Path, req: &NotifyRequest) -> Result<()> {
    match notify::send_request(socket, req)? {
        NotifyResponse::Ok => {
            info!("Notification sent");
            Ok(())
        }
        NotifyResponse::Error { error } => {
            anyhow::bail!("Daemon reported an error: {}", error)
        }
    }
}

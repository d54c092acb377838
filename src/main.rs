use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::{debug, info};
use serde_json::Value;
use tgbot_client::{Bot, Inbox, InputFile, Settings};

#[derive(Parser)]
#[command(name = "tgbot", about = "Send and receive Telegram bot messages")]
struct Cli {
    /// TOML file with API_KEY; falls back to TG_BOT_TOKEN when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct MediaArgs {
    chat_id: String,
    /// file_id or URL, or a local path with --file
    media: String,
    /// Upload `media` from the local filesystem
    #[arg(long)]
    file: bool,
}

impl MediaArgs {
    fn input(&self) -> InputFile {
        if self.file {
            InputFile::path(&self.media)
        } else {
            InputFile::reference(self.media.as_str())
        }
    }
}

#[derive(Subcommand)]
enum Command {
    SendMessage { chat_id: String, text: String },
    SendPhoto(MediaArgs),
    SendAudio(MediaArgs),
    SendVideo(MediaArgs),
    SendDocument(MediaArgs),
    GetUpdates {
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<i64>,
    },
    GetFile {
        file_id: String,
        /// Save the file into DOWNLOAD_PATH
        #[arg(long)]
        download: bool,
    },
    DeleteMessage { chat_id: String, message_id: i64 },
    /// Report the newest message if it arrived within the last `max_age_secs`
    Check {
        #[arg(long, default_value_t = 86400)]
        max_age_secs: i64,
    },
}

/// `now - max_age_secs`, or an error when that falls outside chrono's range.
fn reference_time(now: DateTime<Utc>, max_age_secs: i64) -> Result<DateTime<Utc>, String> {
    Duration::try_seconds(max_age_secs)
        .and_then(|age| now.checked_sub_signed(age))
        .ok_or_else(|| format!("--max-age-secs {} is out of range", max_age_secs))
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::from_env()?,
    };
    debug!("Using API server {}", settings.api_url);
    let bot = settings.build_bot()?;

    match cli.command {
        Command::SendMessage { chat_id, text } => print_json(&bot.send_message(&chat_id, &text)?)?,
        Command::SendPhoto(args) => print_json(&bot.send_photo(&args.chat_id, args.input())?)?,
        Command::SendAudio(args) => print_json(&bot.send_audio(&args.chat_id, args.input())?)?,
        Command::SendVideo(args) => print_json(&bot.send_video(&args.chat_id, args.input())?)?,
        Command::SendDocument(args) => {
            print_json(&bot.send_document(&args.chat_id, args.input())?)?
        }
        Command::GetUpdates { offset } => print_json(&Value::Array(bot.get_updates(offset)?))?,
        Command::GetFile { file_id, download } => {
            if download {
                let path = bot.download_file(&file_id, &settings.download_path)?;
                println!("{}", path.display());
            } else {
                print_json(&bot.get_file(&file_id)?)?;
            }
        }
        Command::DeleteMessage {
            chat_id,
            message_id,
        } => println!("{}", bot.delete_message(&chat_id, message_id)?),
        Command::Check { max_age_secs } => {
            let since = reference_time(Utc::now(), max_age_secs)?;
            let mut inbox = Inbox::new(&bot);
            match inbox.check_new_message(since)? {
                Some(message) => println!("{:#?}", message),
                None => info!("No new message since {}", since),
            }
        }
    }
    Ok(())
}

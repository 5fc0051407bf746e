//! threadsmith - Split long text into a numbered Mastodon thread and post it

mod auth;
mod config;
mod draft;
mod post;
mod preview;
mod watch;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::ThreadsmithConfig;
use draft::{Draft, DraftStore};
use mastodon_client::Visibility;
use preview::OutputFormat;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thread_splitter::{SplitOptions, plan_thread};

#[derive(Parser, Debug)]
#[command(name = "threadsmith")]
#[command(about = "Split long text into a numbered Mastodon thread and post it", long_about = None)]
#[command(version)]
struct Args {
    /// Enable debug output
    #[arg(short, long, global = true, default_value_t = false)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides for the configured splitting options
#[derive(clap::Args, Debug, Clone, Default)]
struct SplitArgs {
    /// Characters per post (default from config)
    #[arg(short, long)]
    limit: Option<String>,

    /// Don't append 🧵i/n tags
    #[arg(long)]
    no_pagination: bool,

    /// Break at spaces only, never prefer sentence ends
    #[arg(long)]
    no_sentence_endings: bool,

    /// Repeat the first post's @user@domain mentions on every reply
    #[arg(long)]
    mentions: bool,

    /// Content warning (default from the saved draft)
    #[arg(long)]
    cw: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split text into posts and print them
    Split {
        /// Text file, `-` for stdin (default: saved draft)
        file: Option<PathBuf>,

        #[command(flatten)]
        split: SplitArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Re-split a file every time it changes
    Watch {
        /// Text file to watch
        file: PathBuf,

        #[command(flatten)]
        split: SplitArgs,

        /// Quiet period before re-splitting, in milliseconds
        #[arg(long, default_value = "500")]
        delay_ms: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Post the thread to Mastodon
    Post {
        /// Text file, `-` for stdin (default: saved draft)
        file: Option<PathBuf>,

        #[command(flatten)]
        split: SplitArgs,

        /// public, unlisted, private (followers) or direct
        #[arg(long)]
        visibility: Option<String>,

        /// URL of the post the thread replies to
        #[arg(long)]
        reply_to: Option<String>,

        /// Show what would be posted without posting
        #[arg(long)]
        dry_run: bool,
    },
    /// Log in to a Mastodon instance
    Login {
        /// Instance host, e.g. mastodon.social
        instance: String,

        /// Authorization code from a login started earlier
        #[arg(long)]
        code: Option<String>,
    },
    /// Forget stored credentials
    Logout,
    /// Manage the saved draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum DraftAction {
    /// Show the saved draft
    Show,
    /// Save a file (or `-` for stdin) as the draft
    Save {
        file: PathBuf,

        /// Content warning to keep with the draft
        #[arg(long)]
        cw: Option<String>,

        /// Reply-to URL to keep with the draft
        #[arg(long)]
        reply_to: Option<String>,
    },
    /// Delete the saved draft
    Clear,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set characters per post
    SetLimit {
        /// Positive number; anything else resets to 500
        value: String,
    },
    /// Turn 🧵i/n tags on or off
    SetPagination {
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
    /// Turn sentence-end preference on or off
    SetSentenceEndings {
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
    /// Turn mention repetition on or off
    SetMentions {
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
    /// Set default visibility
    SetVisibility {
        /// public, unlisted, private (followers) or direct
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match args.command {
        Commands::Split { file, split, format } => {
            let config = ThreadsmithConfig::load().context("Failed to load configuration")?;
            let draft = read_input(file.as_deref())?;
            let options = split.apply(&config, &draft);

            if args.debug {
                eprintln!("Options: {:?}", options);
            }

            let plan = plan_thread(&draft.text, &options);
            print!("{}", preview::render(&plan, &options, format)?);
        }
        Commands::Watch {
            file,
            split,
            delay_ms,
            format,
        } => {
            let config = ThreadsmithConfig::load().context("Failed to load configuration")?;
            let options = split.apply(&config, &Draft::default());
            watch::run(&file, options, format, Duration::from_millis(delay_ms)).await?;
        }
        Commands::Post {
            file,
            split,
            visibility,
            reply_to,
            dry_run,
        } => {
            let mut config = ThreadsmithConfig::load().context("Failed to load configuration")?;
            if let Some(visibility) = visibility {
                config.visibility = Visibility::from_str(&visibility)?;
            }

            let draft = read_input(file.as_deref())?;
            let options = split.apply(&config, &draft);

            let settings = post::PostSettings {
                visibility: config.visibility,
                reply_to_url: reply_to.unwrap_or(draft.reply_to_url),
                dry_run,
            };
            post::run(&draft.text, options, &settings).await?;
        }
        Commands::Login { instance, code } => {
            auth::login(&instance, code.as_deref()).await?;
        }
        Commands::Logout => auth::logout()?,
        Commands::Draft { action } => handle_draft_command(&action)?,
        Commands::Config { action } => handle_config_command(&action)?,
    }

    Ok(())
}

impl SplitArgs {
    /// Config values, then the draft's content warning, then flags.
    fn apply(&self, config: &ThreadsmithConfig, draft: &Draft) -> SplitOptions {
        let cw = self.cw.as_deref().unwrap_or(&draft.content_warning);
        let mut options = config.split_options(cw);

        if let Some(limit) = &self.limit {
            options.char_limit = thread_splitter::parse_char_limit(limit);
        }
        if self.no_pagination {
            options.pagination = false;
        }
        if self.no_sentence_endings {
            options.sentence_endings = false;
        }
        if self.mentions {
            options.include_mentions = true;
        }
        options
    }
}

/// Text from a file, stdin (`-`), or the saved draft when no file is given.
fn read_input(file: Option<&Path>) -> Result<Draft> {
    match file {
        Some(path) => Ok(Draft {
            text: read_text(path)?,
            ..Draft::default()
        }),
        None => {
            let draft = DraftStore::open_default()?.load()?;
            if draft.is_empty() {
                anyhow::bail!("No input. Pass a file, `-` for stdin, or save a draft first.");
            }
            Ok(draft)
        }
    }
}

fn read_text(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        return std::io::read_to_string(std::io::stdin()).context("Failed to read stdin");
    }
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn handle_draft_command(action: &DraftAction) -> Result<()> {
    let store = DraftStore::open_default()?;
    match action {
        DraftAction::Show => {
            let draft = store.load()?;
            println!("Draft file: {:?}", store.path());
            println!();
            if draft.is_empty() {
                println!("(empty)");
                return Ok(());
            }
            if let Some(updated) = draft.updated_at {
                println!("updated_at = {}", updated.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S"));
            }
            if !draft.content_warning.is_empty() {
                println!("content_warning = \"{}\"", draft.content_warning);
            }
            if !draft.reply_to_url.is_empty() {
                println!("reply_to_url = \"{}\"", draft.reply_to_url);
            }
            println!();
            println!("{}", draft.text);
        }
        DraftAction::Save { file, cw, reply_to } => {
            let mut draft = store.load()?;
            draft.text = read_text(file)?;
            if let Some(cw) = cw {
                draft.content_warning = cw.trim().to_string();
            }
            if let Some(reply_to) = reply_to {
                mastodon_client::validate_reply_url(reply_to)?;
                draft.reply_to_url = reply_to.trim().to_string();
            }
            let saved = store.save(&draft)?;
            println!(
                "Draft saved ({} characters) to {}",
                thread_splitter::text_length(&saved.text),
                store.path().display()
            );
        }
        DraftAction::Clear => {
            store.clear()?;
            println!("Draft cleared");
        }
    }
    Ok(())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    let mut config = ThreadsmithConfig::load()?;
    match action {
        ConfigAction::Show => {
            println!("Configuration file: {:?}", ThreadsmithConfig::config_path()?);
            println!();
            println!("char_limit = {}", config.char_limit);
            println!("pagination = {}", config.pagination);
            println!("sentence_endings = {}", config.sentence_endings);
            println!("include_mentions = {}", config.include_mentions);
            println!("visibility = \"{}\"", config.visibility);
            return Ok(());
        }
        ConfigAction::SetLimit { value } => {
            config.char_limit = thread_splitter::parse_char_limit(value);
            println!("Character limit set to: {}", config.char_limit);
        }
        ConfigAction::SetPagination { value } => {
            config.pagination = *value;
            println!("Pagination set to: {}", value);
        }
        ConfigAction::SetSentenceEndings { value } => {
            config.sentence_endings = *value;
            println!("Sentence-end preference set to: {}", value);
        }
        ConfigAction::SetMentions { value } => {
            config.include_mentions = *value;
            println!("Mentions in replies set to: {}", value);
        }
        ConfigAction::SetVisibility { value } => {
            config.visibility = Visibility::from_str(value)?;
            if config.visibility == Visibility::Direct && !config.include_mentions {
                config.include_mentions = true;
                println!("Mentions in replies enabled (required for direct posts)");
            }
            println!("Default visibility set to: {}", config.visibility);
        }
    }
    config.save()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_split_args_override_config() {
        let config = ThreadsmithConfig::default();
        let draft = Draft {
            content_warning: "spoilers".to_string(),
            ..Draft::default()
        };
        let args = SplitArgs {
            limit: Some("280".to_string()),
            no_pagination: true,
            mentions: true,
            ..SplitArgs::default()
        };

        let options = args.apply(&config, &draft);
        assert_eq!(options.char_limit, 280);
        assert!(!options.pagination);
        assert!(options.sentence_endings);
        assert!(options.include_mentions);
        assert_eq!(options.content_warning, "spoilers");
    }

    #[test]
    fn test_cw_flag_beats_draft() {
        let draft = Draft {
            content_warning: "from draft".to_string(),
            ..Draft::default()
        };
        let args = SplitArgs {
            cw: Some(" flag ".to_string()),
            limit: Some("zero".to_string()),
            ..SplitArgs::default()
        };
        let options = args.apply(&ThreadsmithConfig::default(), &draft);
        assert_eq!(options.content_warning, "flag");
        assert_eq!(options.char_limit, 500);
    }

    #[test]
    fn test_parse_post_command() {
        let args = Args::parse_from([
            "threadsmith",
            "post",
            "notes.txt",
            "--visibility",
            "unlisted",
            "--dry-run",
            "--limit",
            "300",
        ]);
        match args.command {
            Commands::Post {
                file,
                split,
                visibility,
                dry_run,
                ..
            } => {
                assert_eq!(file, Some(PathBuf::from("notes.txt")));
                assert_eq!(split.limit.as_deref(), Some("300"));
                assert_eq!(visibility.as_deref(), Some("unlisted"));
                assert!(dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_read_text_missing_file() {
        let err = read_text(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}

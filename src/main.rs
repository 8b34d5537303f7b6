use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use kexplist::{cli, config, error, fatal, sync::SyncRequest, warning, window};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

/// Populate a Spotify playlist with songs from an hour or hours of KEXP radio.
#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
  args_conflicts_with_subcommands = true,
)]
struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,

    /// Spotify account to authenticate as (required)
    #[clap(long)]
    username: Option<String>,

    /// Window start in local time, e.g. --mdyh "01/31/2017T18"; defaults to now
    #[clap(long, value_name = "mm/dd/yyyyThh")]
    mdyh: Option<String>,

    /// Number of hours of KEXP playlist to grab
    #[clap(long, value_name = "num_of_hours", default_value = window::DEFAULT_HOURS, allow_hyphen_values = true)]
    hours: String,

    /// Spotify playlist name (required)
    #[clap(long)]
    playlist: Option<String>,

    /// Skip the lookup by name and always create a new playlist
    #[clap(long = "always_create_new_playlist")]
    always_create_new_playlist: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify and cache the token
    Auth(AuthOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AuthOptions {
    /// Spotify account to authorize (required)
    #[clap(long)]
    username: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment. Err: {}", e);
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Auth(opt)) => {
            let Some(username) = opt.username else {
                error!("--username is required");
            };
            cli::auth(username).await
        }
        Some(Command::Completions(opt)) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
        None => {
            let request = match SyncRequest::new(
                cli.username,
                cli.mdyh,
                cli.hours,
                cli.playlist,
                cli.always_create_new_playlist,
            ) {
                Ok(request) => request,
                Err(e) => fatal!(e.exit_code(), "{}", e),
            };

            cli::sync(request).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_flags_are_left_to_the_sync_request() {
        let cli = Cli::try_parse_from(["kexplist", "--playlist", "x"]).unwrap();
        assert!(cli.username.is_none());
        assert_eq!(cli.hours, window::DEFAULT_HOURS);

        let cli = Cli::try_parse_from(["kexplist", "--username", "me"]).unwrap();
        assert!(cli.playlist.is_none());

        let cli = Cli::try_parse_from(["kexplist", "auth"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Auth(AuthOptions { username: None }))));
    }

    #[test]
    fn negative_hours_reach_window_validation() {
        let cli = Cli::try_parse_from([
            "kexplist",
            "--username",
            "me",
            "--playlist",
            "x",
            "--hours",
            "-2",
        ])
        .unwrap();
        assert_eq!(cli.hours, "-2");
    }
}

use clap::builder::BoolishValueParser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

/// Everything one invocation needs to know, resolved once from the command
/// line and the MPD_* environment and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub entries: Vec<String>,
    pub playlist: Option<String>,
    pub limit: Option<usize>,
    pub start: bool,
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub verbose: u8,
}

/// Parse process arguments, printing usage and exiting on --help or errors.
pub fn parse() -> Config {
    from_matches(command().get_matches())
}

fn command() -> Command {
    Command::new("mpdcast")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Cast files, URLs and playlists onto an mpd play queue")
        .arg_required_else_help(true)
        .arg(
            Arg::new("entries")
                .help("Files, URLs or playlists to enqueue")
                .value_name("urls")
                .num_args(1..),
        )
        .next_help_heading("mpdcast")
        .args([
            Arg::new("playlist")
                .help("Add to this playlist (defaults to the current queue)")
                .long("playlist")
                .short('p')
                .env("MPD_PLAYLIST")
                .action(ArgAction::Set),
            Arg::new("num")
                .help("Limit maximum number of entries to enqueue")
                .long("num")
                .short('n')
                .alias("max")
                .short_alias('m')
                .env("MPD_NUM")
                .value_parser(value_parser!(usize))
                .action(ArgAction::Set),
            Arg::new("start")
                .help("Start playing the last queued track now")
                .long("start")
                .short('s')
                .env("MPD_START")
                .value_name("bool")
                .num_args(0..=1)
                .require_equals(true)
                .default_value("true")
                .default_missing_value("true")
                .value_parser(BoolishValueParser::new()),
        ])
        .next_help_heading("mpd")
        .args([
            Arg::new("host")
                .help("mpd host to connect to")
                .long("host")
                .env("MPD_HOST")
                .default_value("localhost")
                .action(ArgAction::Set),
            Arg::new("port")
                .help("mpd port to connect to")
                .long("port")
                .short('P')
                .env("MPD_PORT")
                .default_value("6600")
                .value_parser(value_parser!(u16))
                .action(ArgAction::Set),
            Arg::new("password")
                .help("mpd password to use")
                .long("password")
                .env("MPD_PASSWORD")
                .action(ArgAction::Set),
        ])
        .next_help_heading("help")
        .arg(
            Arg::new("verbose")
                .help("Show extra info")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count),
        )
}

fn from_matches(matches: ArgMatches) -> Config {
    Config {
        entries: matches
            .get_many::<String>("entries")
            .map(|entries| entries.cloned().collect())
            .unwrap_or_default(),
        playlist: matches.get_one::<String>("playlist").cloned(),
        limit: matches.get_one::<usize>("num").copied(),
        start: matches.get_one::<bool>("start").copied().unwrap_or(true),
        host: matches
            .get_one::<String>("host")
            .cloned()
            .unwrap_or_else(|| "localhost".to_string()),
        port: matches.get_one::<u16>("port").copied().unwrap_or(6600),
        password: matches.get_one::<String>("password").cloned(),
        verbose: matches.get_count("verbose"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_env() {
        for name in [
            "MPD_PLAYLIST",
            "MPD_NUM",
            "MPD_START",
            "MPD_HOST",
            "MPD_PORT",
            "MPD_PASSWORD",
        ] {
            std::env::remove_var(name);
        }
    }

    fn parse_from<const N: usize>(argv: [&str; N]) -> Config {
        from_matches(command().try_get_matches_from(argv).unwrap())
    }

    #[test]
    fn command_definition_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn defaults_resolve_when_only_entries_are_given() {
        clean_env();
        let config = parse_from(["mpdcast", "a.mp3", "b.mp3"]);
        assert_eq!(config.entries, vec!["a.mp3".to_string(), "b.mp3".to_string()]);
        assert_eq!(config.playlist, None);
        assert_eq!(config.limit, None);
        assert!(config.start);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 6600);
        assert_eq!(config.password, None);
        assert_eq!(config.verbose, 0);
    }

    #[test]
    fn limit_accepts_both_spellings() {
        clean_env();
        assert_eq!(parse_from(["mpdcast", "--num", "3", "x.mp3"]).limit, Some(3));
        assert_eq!(parse_from(["mpdcast", "--max", "3", "x.mp3"]).limit, Some(3));
        assert_eq!(parse_from(["mpdcast", "-m", "3", "x.mp3"]).limit, Some(3));
        assert_eq!(parse_from(["mpdcast", "-n", "3", "x.mp3"]).limit, Some(3));
    }

    #[test]
    fn start_can_be_disabled_inline() {
        clean_env();
        assert!(!parse_from(["mpdcast", "--start=false", "x.mp3"]).start);
        assert!(parse_from(["mpdcast", "-s", "x.mp3"]).start);
    }

    #[test]
    fn verbosity_counts_repeats() {
        clean_env();
        assert_eq!(parse_from(["mpdcast", "-vv", "x.mp3"]).verbose, 2);
    }

    #[test]
    fn connection_flags_override_defaults() {
        clean_env();
        let config = parse_from([
            "mpdcast",
            "--host",
            "jukebox.local",
            "-P",
            "6601",
            "--password",
            "hunter2",
            "-p",
            "Morning",
            "x.mp3",
        ]);
        assert_eq!(config.host, "jukebox.local");
        assert_eq!(config.port, 6601);
        assert_eq!(config.password.as_deref(), Some("hunter2"));
        assert_eq!(config.playlist.as_deref(), Some("Morning"));
        assert_eq!(config.entries, vec!["x.mp3".to_string()]);
    }
}

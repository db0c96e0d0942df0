use clap::Parser;
use twitch_live::{BackoffPolicy, CheckConfig};

#[derive(Parser, Debug)]
#[command(
    name = "twlive",
    version,
    about = "Check whether a Twitch channel is live, optionally waiting until it is",
    long_about = "Exits with 0 when the channel is live and 2 when it is offline, \
                  its status is unknown, or anything goes wrong."
)]
pub struct Args {
    /// Do not output anything to stdout
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print heartbeat to stdout for debugging
    #[arg(long)]
    pub verbose: bool,

    /// Keep polling until the stream starts, then exit
    #[arg(short, long)]
    pub wait: bool,

    /// How long to wait in case network fails (in seconds). 0 waits forever
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = 300,
        num_args = 0..=1,
        default_missing_value = "300"
    )]
    pub timeout: u64,

    /// Maximum allowed idle time (in seconds) between failed network requests. 0 is unbounded
    #[arg(
        long,
        value_name = "SECONDS",
        default_value_t = 0,
        num_args = 0..=1,
        default_missing_value = "0"
    )]
    pub timeout_max_sleep: u64,

    /// Channel URL, e.g. https://twitch.tv/your_profile
    pub url: String,
}

impl Args {
    pub fn check_config(&self) -> CheckConfig {
        CheckConfig {
            wait: self.wait,
            timeout_secs: self.timeout,
            backoff: BackoffPolicy::capped(self.timeout_max_sleep),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["twlive", "https://twitch.tv/some_user"]).unwrap();
        assert!(!args.quiet && !args.verbose && !args.wait);
        assert_eq!(args.timeout, 300);
        assert_eq!(args.timeout_max_sleep, 0);

        let config = args.check_config();
        assert_eq!(config, CheckConfig::default());
    }

    #[test]
    fn maps_flags_into_config() {
        let args = Args::try_parse_from([
            "twlive",
            "-w",
            "--timeout",
            "0",
            "--timeout-max-sleep",
            "120",
            "https://twitch.tv/some_user",
        ])
        .unwrap();

        let config = args.check_config();
        assert!(config.wait);
        assert!(config.timeout().is_zero());
        assert_eq!(config.backoff.max_sleep_secs, 120);
        assert_eq!(args.url, "https://twitch.tv/some_user");
    }

    #[test]
    fn bare_timeout_flags_use_defaults() {
        let args =
            Args::try_parse_from(["twlive", "https://twitch.tv/some_user", "--timeout"]).unwrap();
        assert_eq!(args.timeout, 300);

        let args = Args::try_parse_from([
            "twlive",
            "https://twitch.tv/some_user",
            "--timeout-max-sleep",
        ])
        .unwrap();
        assert_eq!(args.timeout_max_sleep, 0);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let err = Args::try_parse_from(["twlive", "-q", "--verbose", "https://twitch.tv/x"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn url_is_required() {
        let err = Args::try_parse_from(["twlive", "-w"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}

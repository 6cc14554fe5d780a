use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_PROFILE: &str = "profile";
pub const ARG_HOME_ROUTE: &str = "home-route";
pub const ARG_LOGIN_ROUTE: &str = "login-route";
pub const ARG_NAMESPACE: &str = "namespace";
pub const ARG_VERBOSITY: &str = "verbosity";

pub const CMD_LOGIN: &str = "login";
pub const CMD_NAVIGATE: &str = "navigate";
pub const CMD_STATUS: &str = "status";
pub const CMD_LOGOUT: &str = "logout";

/// Accepts a level name or its index, `error` (0) through `trace` (4), as
/// given by `SECUR_LOG_LEVEL`.
fn parse_log_level(level: &str) -> Result<u8, String> {
    const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

    if let Ok(index) = level.parse::<u8>() {
        return LEVELS
            .get(usize::from(index))
            .map(|_| index)
            .ok_or_else(|| format!("log level index out of range: {index}"));
    }
    LEVELS
        .iter()
        .position(|name| name.eq_ignore_ascii_case(level.trim()))
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("unknown log level: {level}"))
}

fn login() -> Command {
    Command::new(CMD_LOGIN)
        .about("Replace the session with a credential and load the member")
        .arg(
            Arg::new("token")
                .short('t')
                .long("token")
                .help("Session credential issued by the identity service")
                .env("SECUR_TOKEN")
                .hide_env_values(true)
                .required(true),
        )
}

fn navigate() -> Command {
    Command::new(CMD_NAVIGATE)
        .about("Run the session guard for one navigation")
        .arg(
            Arg::new("to")
                .help("Target location, e.g. /dashboard?accessToken=abc")
                .required(true),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .help("Source location, if any"),
        )
        .arg(
            Arg::new("requires-auth")
                .long("requires-auth")
                .help("The target route requires authentication")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("from-requires-auth")
                .long("from-requires-auth")
                .help("The source route requires authentication")
                .requires("from")
                .action(ArgAction::SetTrue),
        )
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("secur")
        .about("Client-side session guard")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(ARG_API_URL)
                .short('a')
                .long(ARG_API_URL)
                .help("Identity service base URL, example: https://api.tld/v1")
                .env("SECUR_API_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_PROFILE)
                .short('p')
                .long(ARG_PROFILE)
                .help("Profile file holding cookies and cached data")
                .default_value(".secur/profile.json")
                .env("SECUR_PROFILE")
                .global(true),
        )
        .arg(
            Arg::new(ARG_HOME_ROUTE)
                .long(ARG_HOME_ROUTE)
                .help("Route used when there is no source route to return to")
                .default_value("/")
                .env("SECUR_HOME_ROUTE")
                .global(true),
        )
        .arg(
            Arg::new(ARG_LOGIN_ROUTE)
                .long(ARG_LOGIN_ROUTE)
                .help("Login route or external login URL")
                .default_value("/login")
                .env("SECUR_LOGIN_ROUTE")
                .global(true),
        )
        .arg(
            Arg::new(ARG_NAMESPACE)
                .long(ARG_NAMESPACE)
                .help("Prefix for cookie names and cache keys")
                .env("SECUR_NAMESPACE")
                .global(true),
        )
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Log guard decisions on stderr, repeat for more: -v warn, -vv info, -vvv debug")
                .env("SECUR_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(parse_log_level),
        )
        .subcommand(login())
        .subcommand(navigate())
        .subcommand(Command::new(CMD_STATUS).about("Show the cached session"))
        .subcommand(Command::new(CMD_LOGOUT).about("Destroy the local session"))
}

use clap::Parser;

/// Medya: several streaming services, one window, one backend state.
#[derive(Parser, Debug)]
#[command(name = "medya", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<String>,

    /// Log level override (e.g. "medya=debug").
    #[arg(long)]
    pub log_level: Option<String>,

    /// Start with no tabs instead of restoring the previous session.
    #[arg(long)]
    pub no_restore: bool,
}

pub fn parse() -> Args {
    Args::parse()
}

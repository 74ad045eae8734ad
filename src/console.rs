//! Admin console: command parsing and colored terminal feedback.
//! Used by: main.

use std::net::SocketAddr;

use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    Status,
    Reload,
    Start,
    Stop,
    Help,
    Quit,
}

impl AdminCommand {
    /// Blank lines parse to `None`; unknown words are returned as `Err`.
    pub fn parse(line: &str) -> Option<Result<Self, String>> {
        let word = line.split_whitespace().next()?;
        Some(match word.to_ascii_lowercase().as_str() {
            "status" => Ok(Self::Status),
            "reload" => Ok(Self::Reload),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            _ => Err(word.to_owned()),
        })
    }
}

// === Startup ===

pub fn print_banner() {
    println!();
    println!("{}", "╔═══════════════════════════════════════════════════════════╗".cyan());
    println!("║     {:<54}║", format!("mcstatus v{}", env!("CARGO_PKG_VERSION")).bold().white());
    println!("║     {:<54}║", "Server status API".dimmed());
    println!("{}", "╚═══════════════════════════════════════════════════════════╝".cyan());
    println!();
}

pub fn print_startup(addr: SocketAddr, https: bool, auth: bool) {
    let scheme = if https { "https" } else { "http" };
    println!("{} {}", "✓".green().bold(), "API ready".white().bold());
    println!("  {} {}", "→".dimmed(), format!("{scheme}://{addr}").cyan().underline());
    println!();
    println!("{}", "Endpoints:".white().bold());
    let lock = if auth { "bearer" } else { "open" };
    println!("  {} {}  {} {}", "GET ".green(), "/api/status".white(), "Current snapshot".dimmed(), lock.yellow());
    println!("  {} {}       {}", "GET ".green(), "/health".white(), "Health check".dimmed());
    println!();
    print_help();
}

pub fn print_help() {
    println!("{}", "Commands:".white().bold());
    println!("  {}  {}", "status".cyan(), "Show version and API address".dimmed());
    println!("  {}  {}", "reload".cyan(), "Re-read config and reschedule updates".dimmed());
    println!("  {}   {}", "start".cyan(), "Start the API server".dimmed());
    println!("  {}    {}", "stop".cyan(), "Stop the API server".dimmed());
    println!("  {}    {}", "quit".cyan(), "Shut down".dimmed());
    println!();
}

// === Badges ===

fn badge(text: &str, fg: colored::Color, bg: colored::Color) -> colored::ColoredString {
    format!(" {} ", text).color(fg).on_color(bg).bold()
}

// === Admin feedback ===

pub fn print_status(addr: Option<SocketAddr>, update_interval: u64) {
    println!(
        "{} {}",
        badge("STATUS", colored::Color::Black, colored::Color::Cyan),
        format!("mcstatus v{}", env!("CARGO_PKG_VERSION")).white()
    );
    match addr {
        Some(addr) => println!("  {} {}", "api:".dimmed(), addr.to_string().green()),
        None => println!("  {} {}", "api:".dimmed(), "stopped".yellow()),
    }
    println!("  {} {}", "update-interval:".dimmed(), format!("{update_interval}s").white());
}

pub fn log_reloaded(update_interval: u64) {
    println!(
        "{} {} {}",
        badge("RELOAD", colored::Color::Black, colored::Color::Green),
        "configuration reloaded;".white(),
        format!("updates every {update_interval}s").dimmed()
    );
}

pub fn log_reload_failed(reason: &str) {
    println!(
        "{} {}",
        badge("RELOAD", colored::Color::White, colored::Color::Red),
        reason.red()
    );
}

pub fn log_api_started(addr: Option<SocketAddr>) {
    let addr = addr.map_or_else(|| "?".to_owned(), |a| a.to_string());
    println!(
        "{} {} {}",
        badge("API", colored::Color::Black, colored::Color::Green),
        "started on".white(),
        addr.cyan()
    );
}

pub fn log_api_failed(reason: &str) {
    println!(
        "{} {} {}",
        badge("API", colored::Color::White, colored::Color::Red),
        "failed to start:".dimmed(),
        reason.red()
    );
}

pub fn log_api_stopped() {
    println!(
        "{} {}",
        badge("API", colored::Color::Black, colored::Color::Yellow),
        "stopped".yellow()
    );
}

pub fn log_unknown_command(word: &str) {
    println!(
        "{} {} {}",
        badge("?", colored::Color::Black, colored::Color::Yellow),
        format!("unknown command: {word}").yellow(),
        "(try `help`)".dimmed()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(AdminCommand::parse("status"), Some(Ok(AdminCommand::Status)));
        assert_eq!(AdminCommand::parse("  RELOAD  "), Some(Ok(AdminCommand::Reload)));
        assert_eq!(AdminCommand::parse("start now"), Some(Ok(AdminCommand::Start)));
        assert_eq!(AdminCommand::parse("stop"), Some(Ok(AdminCommand::Stop)));
        assert_eq!(AdminCommand::parse("?"), Some(Ok(AdminCommand::Help)));
        assert_eq!(AdminCommand::parse("exit"), Some(Ok(AdminCommand::Quit)));
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(AdminCommand::parse(""), None);
        assert_eq!(AdminCommand::parse("   \t"), None);
    }

    #[test]
    fn unknown_words_are_reported() {
        assert_eq!(AdminCommand::parse("restart"), Some(Err("restart".to_owned())));
    }
}

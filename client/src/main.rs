//! NumberPlay - terminal client entry point

use numberplay_client::command::HELP;
use numberplay_client::views::{HistoryView, PlayView, StatsView};
use numberplay_client::{AppState, AuthGate, AuthStatus, ClientConfig, Command};
use numberplay_core::{Error, GamePlayResponse, GameRecord, Prize, RegisterRequest, UserStatistics};
use numberplay_networking::api;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "numberplay_client=debug,numberplay_networking=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting NumberPlay client");

    let config = ClientConfig::from_env();
    tracing::info!("API at {}", config.api_url);

    let state = match AppState::new(config).await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("FATAL: Failed to initialise client: {}", e);
            std::process::exit(1);
        }
    };

    let mut session = Session::new(state);
    session.refresh_auth().await;
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => break,
        };
        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                break;
            }
        };

        match Command::parse(&line) {
            Ok(None) => {}
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => session.run(command).await,
            Err(usage) => println!("{}", usage),
        }
    }

    session.state.connection.shutdown();
    tracing::info!("NumberPlay client stopped");
}

struct Session {
    state: AppState,
    gate: AuthGate,
    play: PlayView,
    history: HistoryView,
    stats: StatsView,
    auth: AuthStatus,
}

impl Session {
    fn new(state: AppState) -> Self {
        let api = state.api();
        Self {
            gate: AuthGate::new(api.clone(), state.connection.clone()),
            play: PlayView::new(api.clone()),
            history: HistoryView::new(api.clone()),
            stats: StatsView::new(api),
            auth: AuthStatus::LoginRequired,
            state,
        }
    }

    async fn refresh_auth(&mut self) {
        self.auth = self.gate.check().await;
        match self.auth {
            AuthStatus::Authenticated => println!("Logged in. Connecting to live results..."),
            AuthStatus::LoginRequired => println!("Please log in: login <email> <password>"),
        }
    }

    async fn run(&mut self, command: Command) {
        match command {
            Command::Login { email, password } => {
                match api::login(&self.state.client, &email, &password).await {
                    Ok(auth) => {
                        println!("Welcome back, {}!", auth.user.username);
                        self.refresh_auth().await;
                    }
                    Err(e) => println!("Login failed: {}", e),
                }
            }
            Command::Register(request) => self.register(request).await,
            Command::Play(input) => self.play(&input).await,
            Command::Results => self.show_results().await,
            Command::History(page) => self.show_history(page).await,
            Command::Stats => self.show_stats().await,
            Command::Status => self.show_status().await,
            Command::Logout => {
                if let Err(e) = self.gate.logout().await {
                    println!("Logout failed: {}", e);
                    return;
                }
                self.auth = AuthStatus::LoginRequired;
                println!("Logged out.");
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => {}
        }
    }

    async fn register(&mut self, request: RegisterRequest) {
        match api::register(&self.state.client, request).await {
            Ok(auth) => {
                println!("Account created, welcome {}!", auth.user.username);
                self.refresh_auth().await;
            }
            Err(e) => println!("Registration failed: {}", e),
        }
    }

    async fn play(&mut self, input: &str) {
        if !self.require_login() {
            return;
        }
        if !self.play.can_submit(self.state.connection.is_connected()) {
            println!("Not connected to the game server yet, try again in a moment.");
            return;
        }

        self.play.set_input(input);
        match self.play.submit().await {
            Ok(outcome) => println!("{}", describe_outcome(&outcome)),
            Err(e) => self.report(e),
        }
    }

    async fn show_results(&self) {
        let view = self.state.results.read().await;
        let indicator = if view.is_connected() { "live" } else { "offline" };
        println!("Live results ({})", indicator);
        if view.feed().is_empty() {
            println!("  No results yet.");
        }
        for outcome in view.feed().iter() {
            println!("  {}", describe_outcome(outcome));
        }
    }

    async fn show_history(&mut self, page: usize) {
        if !self.require_login() {
            return;
        }
        if let Err(e) = self.history.load().await {
            self.report(e);
            return;
        }

        let records = self.history.page(page);
        if records.is_empty() {
            println!("No games on page {}.", page);
            return;
        }
        println!("History, page {} of {}", page, self.history.page_count());
        for record in records {
            println!("  {}", describe_record(record));
        }
    }

    async fn show_stats(&mut self) {
        if !self.require_login() {
            return;
        }
        if let Err(e) = self.stats.load().await {
            self.report(e);
            return;
        }
        if let Some(stats) = self.stats.stats() {
            print_stats(stats);
        }
    }

    async fn show_status(&self) {
        let auth = match self.auth {
            AuthStatus::Authenticated => "logged in",
            AuthStatus::LoginRequired => "logged out",
        };
        println!("Session:    {}", auth);
        println!("Connection: {:?}", self.state.connection.state());
        if let Some(error) = self.state.connection.error() {
            println!("Last error: {}", error);
        }
    }

    fn require_login(&self) -> bool {
        if self.auth == AuthStatus::Authenticated {
            return true;
        }
        println!("Please log in first.");
        false
    }

    fn report(&mut self, error: Error) {
        println!("{}", error);
        if error.requires_login() {
            self.state.connection.set_enabled(false);
            self.auth = AuthStatus::LoginRequired;
            println!("Your session has ended, please log in again.");
        }
    }
}

fn describe_outcome(outcome: &GamePlayResponse) -> String {
    match outcome.winnings() {
        Some(prize) => format!("{}: WIN {}", outcome.number, Prize::new(prize)),
        None if outcome.result.is_win() => format!("{}: WIN", outcome.number),
        None => format!("{}: lose", outcome.number),
    }
}

fn describe_record(record: &GameRecord) -> String {
    let when = record
        .formatted_date
        .as_deref()
        .unwrap_or(&record.created_at);
    let prize = match (&record.formatted_prize, record.prize) {
        (Some(formatted), _) => formatted.clone(),
        (None, Some(prize)) => Prize::new(prize).to_string(),
        (None, None) => "-".to_string(),
    };
    let result = if record.result.is_win() { "win" } else { "lose" };
    format!("{}  {:>4}  {:<4}  {}", when, record.number, result, prize)
}

fn print_stats(stats: &UserStatistics) {
    println!("Games played: {}", stats.total_games);
    println!("Wins/losses:  {}/{}", stats.wins, stats.losses);
    println!("Win rate:     {:.1}%", stats.win_rate);
    println!("Total prize:  {}", Prize::new(stats.total_prize));
    println!("Average:      {}", Prize::new(stats.average_prize));
    println!("Best prize:   {}", Prize::new(stats.best_prize));
    if let Some(last) = &stats.last_played {
        println!("Last played:  {}", last);
    }
}

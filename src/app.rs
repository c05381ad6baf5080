//! The interactive shell.
//! Owns the collaborators and passes them down explicitly: one identity
//! adapter, one document store, one session gate, one inactivity monitor.
//! Every protected view sits behind the gate's `view()` contract, and every
//! line read at the prompt counts as user activity.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{error, info, warn};

use crate::cli::render_dinner_table;
use crate::config::Config;
use crate::dashboard;
use crate::dinners::{suggest, DinnerForm, DinnerLog, SortField};
use crate::error::{AppError, Disposition};
use crate::identity::{
    GateState, GateView, IdentityService, InactivityMonitor, LocalIdentityConfig, LocalIdentityService, Principal,
    SessionGate,
};
use crate::store::{paths, DocumentData, DocumentStore, MemoryStore};

/// Views the shell can be on. Everything except `Entry` is protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Entry,
    Home,
    Dinners,
    Miles,
    Runs,
}

impl Route {
    fn prompt(self) -> &'static str {
        match self {
            Route::Entry => "entry",
            Route::Home => "home",
            Route::Dinners => "dinners",
            Route::Miles => "miles",
            Route::Runs => "runs",
        }
    }
}

/// Build the default local wiring and run the shell until quit.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let identity = Arc::new(LocalIdentityService::new(LocalIdentityConfig { email: config.email.clone() }));
    let store = Arc::new(MemoryStore::new());
    App::new(config, identity, store).run().await
}

pub struct App {
    config: Config,
    identity: Arc<dyn IdentityService>,
    store: Arc<dyn DocumentStore>,
    gate: Arc<SessionGate>,
    dinners: DinnerLog,
    /// Last form that failed to submit, kept so the user can retry.
    pending: Option<DinnerForm>,
}

impl App {
    pub fn new(config: Config, identity: Arc<dyn IdentityService>, store: Arc<dyn DocumentStore>) -> Self {
        let gate = Arc::new(SessionGate::new(store.clone()));
        let dinners = DinnerLog::new(store.clone());
        Self { config, identity, store, gate, dinners, pending: None }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        self.seed_allow_list().await;
        let monitor = self.spawn_idle_monitor();

        println!("lifeboard — your stats dashboard");
        println!();

        let mut rl = DefaultEditor::new().context("terminal line editor unavailable")?;
        let mut route = Route::Entry;
        let mut rendered: Option<Route> = None;

        loop {
            // The gate decides whether any protected view is reachable.
            if self.gate.view() != GateView::Protected {
                route = Route::Entry;
            }
            if rendered != Some(route) {
                self.render(route).await;
                rendered = Some(route);
            }

            let (editor, line) = read_line(rl, format!("{}> ", route.prompt())).await?;
            rl = editor;
            let Some(line) = line else { break };
            monitor.touch();
            let cmd = line.trim().to_string();

            match route {
                Route::Entry => match cmd.as_str() {
                    "" | "login" => {
                        if self.sign_in().await {
                            route = Route::Home;
                        }
                    }
                    "quit" | "exit" => break,
                    "help" => println!("Commands: login, quit"),
                    other => println!("Unknown command '{other}'. Try 'login' or 'quit'."),
                },
                Route::Home => match cmd.as_str() {
                    "dinners" => route = Route::Dinners,
                    "miles" => route = Route::Miles,
                    "runs" => route = Route::Runs,
                    "logout" => self.sign_out_current().await,
                    "quit" | "exit" => break,
                    "" => rendered = None,
                    "help" => println!("Commands: dinners, miles, runs, logout, quit"),
                    other => println!("Unknown command '{other}'. Try 'help'."),
                },
                Route::Dinners => {
                    if cmd == "add" {
                        rl = self.add_dinner(rl, &monitor).await?;
                    } else if cmd == "list" || cmd.is_empty() {
                        self.show_dinners().await;
                    } else if let Some(field) = cmd.strip_prefix("sort") {
                        match SortField::parse(field) {
                            Some(field) => {
                                self.dinners.toggle_sort(field);
                                self.show_dinners().await;
                            }
                            None => println!("Sortable columns: restaurant, date, cost."),
                        }
                    } else if cmd == "back" || cmd == "home" {
                        route = Route::Home;
                    } else if cmd == "logout" {
                        self.sign_out_current().await;
                    } else if cmd == "quit" || cmd == "exit" {
                        break;
                    } else if cmd == "help" {
                        println!("Commands: add, list, sort <column>, back, logout, quit");
                    } else {
                        println!("Unknown command '{cmd}'. Try 'help'.");
                    }
                }
                Route::Miles | Route::Runs => match cmd.as_str() {
                    "back" | "home" => route = Route::Home,
                    "logout" => self.sign_out_current().await,
                    "quit" | "exit" => break,
                    "" => {}
                    _ => println!("Nothing to do here yet. Commands: back, logout, quit"),
                },
            }
        }

        monitor.shutdown();
        Ok(())
    }

    /// The allow-list is provisioned out-of-band; for the local store that
    /// means seeding it from configuration at startup. Best-effort: a failed
    /// seed is logged and the affected email simply stays unauthorized.
    async fn seed_allow_list(&self) {
        for email in &self.config.allowed {
            if let Err(e) = self.store.set(paths::allowed_users(), email, DocumentData::new()).await {
                warn!(email = %email, "failed to seed allow-list entry: {e}");
            }
        }
    }

    fn spawn_idle_monitor(&self) -> InactivityMonitor {
        let identity = self.identity.clone();
        let gate = self.gate.clone();
        InactivityMonitor::spawn(Duration::from_millis(self.config.idle_timeout_ms), move || async move {
            if let Err(e) = identity.sign_out().await {
                let err = AppError::sign_out("sign_out_failed", e.to_string());
                error!("{err}");
            } else {
                info!("user signed out due to inactivity");
            }
            gate.force_signed_out();
            println!();
            println!("Signed out due to inactivity. Press Enter to return to the entry view.");
        })
    }

    /// Interactive sign-in, then the full authorization check.
    async fn sign_in(&self) -> bool {
        println!("Loading...");
        match sign_in_through_gate(self.identity.as_ref(), &self.gate).await {
            GateState::Authorized(p) => {
                println!("Signed in as {}.", p.email);
                true
            }
            GateState::Unauthorized => {
                println!("You are not authorized to access this application.");
                false
            }
            _ => {
                println!("Sign-in failed.");
                false
            }
        }
    }

    async fn sign_out_current(&self) {
        if let Err(e) = self.identity.sign_out().await {
            let err = AppError::sign_out("sign_out_failed", e.to_string());
            error!("{err}");
        }
        // Recompute the gate from whatever the identity service now reports;
        // if sign-out failed the session stays as it is until the next start.
        self.gate.on_principal_changed(self.identity.current()).await;
        println!("Signed out.");
    }

    fn authorized_principal(&self) -> Option<Principal> {
        match self.gate.state() {
            GateState::Authorized(p) => Some(p),
            _ => None,
        }
    }

    async fn render(&self, route: Route) {
        match route {
            Route::Entry => {
                println!("Welcome to Your Stats Dashboard!");
                println!("Sign in to continue ('login', or 'quit' to leave).");
            }
            Route::Home => {
                let Some(principal) = self.authorized_principal() else { return };
                let count = dashboard::visits_in_year(self.store.as_ref(), &principal, self.config.year)
                    .await
                    .unwrap_or(0);
                println!("Welcome to Your Life Dashboard!");
                println!("  dinners (visited this year: {count})");
                println!("  miles");
                println!("  runs");
            }
            Route::Dinners => {
                println!("Your Michelin Star Restaurants");
                self.show_dinners().await;
                println!("Commands: add, list, sort <column>, back, logout, quit");
            }
            Route::Miles => println!("Miles Page"),
            Route::Runs => println!("Runs Page"),
        }
    }

    async fn show_dinners(&self) {
        let Some(principal) = self.authorized_principal() else { return };
        match self.dinners.list(&principal).await {
            Ok(rows) => print!("{}", render_dinner_table(&rows, self.dinners.sort())),
            // Already logged; the view degrades instead of crashing.
            Err(_) => println!("The dinner list is unavailable right now."),
        }
    }

    /// The add-dinner form: restaurant (with fuzzy suggestions), date, cost,
    /// rating. On failure the entered values are kept and offered as
    /// defaults on the next attempt.
    async fn add_dinner(&mut self, mut rl: DefaultEditor, monitor: &InactivityMonitor) -> anyhow::Result<DefaultEditor> {
        let Some(principal) = self.authorized_principal() else { return Ok(rl) };
        let defaults = self.pending.clone().unwrap_or_default();

        let (editor, input) = prompt_field(rl, "Restaurant name", &defaults.restaurant, monitor).await?;
        rl = editor;
        let Some(mut restaurant) = input else { return Ok(rl) };

        // Offer corpus completions; free text stays valid.
        let hits = suggest::suggest(&suggest::RESTAURANTS, &restaurant, self.config.looseness);
        if !hits.is_empty() && hits[0] != restaurant {
            println!("Suggestions:");
            for (i, name) in hits.iter().enumerate().take(5) {
                println!("  {}. {name}", i + 1);
            }
            let (editor, pick) = read_line(rl, "Pick a number or press Enter to keep your text: ".into()).await?;
            rl = editor;
            let Some(pick) = pick else { return Ok(rl) };
            monitor.touch();
            if let Ok(n) = pick.trim().parse::<usize>() {
                if (1..=hits.len().min(5)).contains(&n) {
                    restaurant = hits[n - 1].clone();
                }
            }
        }

        let (editor, date) = prompt_field(rl, "Date visited (YYYY-MM-DD)", &defaults.date, monitor).await?;
        rl = editor;
        let Some(date) = date else { return Ok(rl) };

        let (editor, cost) = prompt_field(rl, "Total meal cost ($)", &defaults.cost, monitor).await?;
        rl = editor;
        let Some(cost) = cost else { return Ok(rl) };

        let rating_default = format!("{:.1}", defaults.rating);
        let (editor, rating_raw) = prompt_field(rl, "Rating 0-5 (half steps)", &rating_default, monitor).await?;
        rl = editor;
        let Some(rating_raw) = rating_raw else { return Ok(rl) };
        // An unparseable rating falls through to validation as out-of-range.
        let rating: f64 = rating_raw.trim().parse().unwrap_or(f64::NAN);

        let form = DinnerForm { restaurant, date, cost, rating };
        match self.dinners.submit(&principal, &form).await {
            Ok(record) => {
                self.pending = None;
                println!("Added {} on {}.", record.restaurant, record.date);
                self.show_dinners().await;
            }
            Err(e) => {
                self.pending = Some(form);
                match e.disposition() {
                    Disposition::Inline => println!("{}", e.message()),
                    Disposition::LogOnly => {
                        error!("{e}");
                        println!("The visit could not be saved; your entry was kept for retry.");
                    }
                }
            }
        }
        Ok(rl)
    }
}

/// The login flow: interactive sign-in followed by the full gate check.
///
/// An unauthorized principal is signed straight back out so no session
/// lingers behind the redirect; a failed sign-in settles the gate on
/// whatever the identity service still reports. Returns the state the gate
/// landed in.
pub async fn sign_in_through_gate(identity: &dyn IdentityService, gate: &SessionGate) -> GateState {
    let principal = match identity.sign_in_interactive().await {
        Ok(p) => p,
        Err(e) => {
            error!("sign-in failed: {e}");
            return gate.on_principal_changed(identity.current()).await;
        }
    };
    let settled = gate.on_principal_changed(Some(principal)).await;
    if settled == GateState::Unauthorized {
        if let Err(e) = identity.sign_out().await {
            let err = AppError::sign_out("sign_out_failed", e.to_string());
            error!("{err}");
        }
    }
    settled
}

/// Read one line off the terminal without blocking the runtime.
/// `None` means the user hit Ctrl-C/Ctrl-D and wants out.
async fn read_line(mut rl: DefaultEditor, prompt: String) -> anyhow::Result<(DefaultEditor, Option<String>)> {
    let (rl, result) = tokio::task::spawn_blocking(move || {
        let result = rl.readline(&prompt);
        if let Ok(line) = &result {
            let _ = rl.add_history_entry(line.as_str());
        }
        (rl, result)
    })
    .await
    .context("prompt task failed")?;
    match result {
        Ok(line) => Ok((rl, Some(line))),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok((rl, None)),
        Err(e) => Err(e).context("reading from the terminal"),
    }
}

/// Prompt for one form field, falling back to the previous attempt's value
/// on empty input. Counts as activity.
async fn prompt_field(
    rl: DefaultEditor,
    label: &str,
    default: &str,
    monitor: &InactivityMonitor,
) -> anyhow::Result<(DefaultEditor, Option<String>)> {
    let prompt = if default.is_empty() {
        format!("{label}: ")
    } else {
        format!("{label} [{default}]: ")
    };
    let (rl, line) = read_line(rl, prompt).await?;
    let Some(line) = line else { return Ok((rl, None)) };
    monitor.touch();
    let value = if line.trim().is_empty() { default.to_string() } else { line.trim().to_string() };
    Ok((rl, Some(value)))
}

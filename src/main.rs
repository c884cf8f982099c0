use anyhow::{Context, Error, Result};
use itertools::Itertools;
use log::*;
use std::sync::Arc;
use structopt::StructOpt;

use levelgg::api::PlayerApi;
use levelgg::config::{load_remote_config, SOCIAL_CALLBACK_PATH};
use levelgg::model::auth::{Provider, Registration};
use levelgg::model::config::RemoteConfig;
use levelgg::poll::{StatsPoller, STATS_POLL_INTERVAL};
use levelgg::{
    auth, copy_to_clipboard, country, dmenu, feed, ApiError, FileStorage, HttpBackend, Notice,
    Onboarding, Route, SessionStore, State, TtlCache,
};

#[derive(Debug, StructOpt)]
#[structopt(name = "levelgg", about = "Level.gg tournament client")]
struct Opt {
    /// Endpoint serving the backend address and OAuth client ids
    #[structopt(long, default_value = "http://localhost:3000/api/my-wrapper")]
    config_url: String,
    /// Where the session and cached listings are kept
    #[structopt(long, default_value = "~/.config/levelgg/storage.json")]
    storage: String,
    #[structopt(subcommand)]
    cmd: Cmd,
}

#[derive(Debug, StructOpt)]
struct Answers {
    /// Country code or name; asked through dmenu when missing
    #[structopt(long)]
    country: Option<String>,
    /// team_lead or player; asked through dmenu when missing
    #[structopt(long)]
    account_type: Option<String>,
    /// Name of the team to create as team lead
    #[structopt(long)]
    team_name: Option<String>,
}

#[derive(Debug, StructOpt)]
enum Cmd {
    /// Log in with email and password
    Login {
        email: String,
        #[structopt(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Create an account with email and password
    Register {
        email: String,
        username: String,
        #[structopt(long)]
        password: Option<String>,
        #[structopt(long)]
        team_lead: bool,
        /// Log in afterwards and continue with profile setup
        #[structopt(long)]
        onboard: bool,
    },
    /// Print the provider URL that starts a social signup
    Signup {
        provider: Provider,
        /// Origin of the web frontend the provider redirects back to
        #[structopt(long, default_value = "http://localhost:3000")]
        origin: String,
    },
    /// Finish a social signup from the provider's redirect URL
    SocialCallback {
        /// Redirect URL or its fragment; read from dmenu when missing
        redirect: Option<String>,
        #[structopt(flatten)]
        answers: Answers,
    },
    /// Continue profile setup after `register --onboard`
    Onboard {
        #[structopt(flatten)]
        answers: Answers,
    },
    /// Finish a social login from the redirect URL
    LoginCallback { redirect: String },
    /// Upcoming tournaments and member counts
    Tournaments,
    /// Recent match results
    Matches,
    News,
    /// Member statistics
    Stats {
        /// Keep refreshing until interrupted
        #[structopt(long)]
        watch: bool,
    },
    /// Join a team with its join code
    Join { code: String },
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    if let Err(e) = run(Opt::from_args()).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(opt: Opt) -> Result<()> {
    let storage = FileStorage::open(&opt.storage)?;
    debug!("Using storage {:?}", storage.path());
    let session = SessionStore::new(storage.clone());
    let cache = TtlCache::new(storage);

    match opt.cmd {
        Cmd::Login { email, password } => {
            let (_, backend) = connect(&opt.config_url).await?;
            let password = secret(password, "Password:")?;
            let route = auth::login(&backend, &session, &email, &password).await?;
            println!("Login successful!");
            continue_at(route);
        }
        Cmd::Logout => {
            continue_at(auth::logout(&session)?);
        }
        Cmd::Register {
            email,
            username,
            password,
            team_lead,
            onboard,
        } => {
            let (_, backend) = connect(&opt.config_url).await?;
            let (password, confirm_password) = match password {
                Some(p) => (p.clone(), p),
                None => (secret(None, "Password:")?, secret(None, "Confirm password:")?),
            };
            let registration = Registration {
                email: email.clone(),
                username,
                password: password.clone(),
                confirm_password,
                is_team_lead: team_lead,
                is_admin: false,
            };
            let route = auth::register(&backend, &registration).await?;
            println!("Account created successfully!");
            if !onboard {
                continue_at(route);
                return Ok(());
            }
            auth::login(&backend, &session, &email, &password).await?;
            session.mark_custom_signup()?;
            println!("Continue with `levelgg onboard`");
        }
        Cmd::Signup { provider, origin } => {
            let config = load_remote_config(&opt.config_url)
                .await
                .with_context(|| "Could not load signup config")?;
            let url = provider.authorize_url(&config, &origin).ok_or_else(|| {
                Error::msg(format!("No {} client configured for {}", provider, origin))
            })?;
            session.set_provider(provider)?;
            println!("Open this URL, then pass the {}{} redirect to `levelgg social-callback`:", origin, SOCIAL_CALLBACK_PATH);
            println!("{}", url);
        }
        Cmd::SocialCallback { redirect, answers } => {
            let backend = connect_or_login(&opt.config_url).await?;
            let redirect = match redirect {
                Some(r) => r,
                None => dmenu::prompt("Redirect URL:")?.unwrap_or_default(),
            };
            let mut machine = Onboarding::new(&backend, &session);
            report(&machine.exchange_token(&redirect).await?);
            drive(&mut machine, answers).await?;
        }
        Cmd::Onboard { answers } => {
            let backend = connect_or_login(&opt.config_url).await?;
            let mut machine = match Onboarding::resume(&backend, &session)? {
                Some(m) => m,
                None => {
                    println!("Nothing to set up");
                    continue_at(Route::Home);
                    return Ok(());
                }
            };
            drive(&mut machine, answers).await?;
        }
        Cmd::LoginCallback { redirect } => {
            let backend = connect_or_login(&opt.config_url).await?;
            continue_at(auth::complete_social_login(&backend, &session, &redirect).await);
        }
        Cmd::Tournaments => {
            let (_, backend) = connect(&opt.config_url).await?;
            let (tournaments, stats) = tokio::join!(
                feed::upcoming_tournaments(&backend, &cache),
                feed::member_stats(&backend, &cache)
            );
            match stats {
                Ok(stats) => println!("{} members, {} online", stats.total_members, stats.online_members),
                Err(e) => warn!("Error fetching member stats: {}", e),
            }
            let tournaments = tournaments?;
            println!(
                "{}",
                tournaments
                    .iter()
                    .map(|t| format!(
                        "{:>5}  {}  [{}]  {}/{} players{}",
                        t.id,
                        t.title,
                        t.start_date.as_deref().unwrap_or("TBA"),
                        t.registered_players,
                        t.max_players,
                        if t.is_active { "" } else { "  (closed)" }
                    ))
                    .join("\n")
            );
        }
        Cmd::Matches => {
            let (_, backend) = connect(&opt.config_url).await?;
            let matches = feed::matches(&backend, &cache).await?;
            println!(
                "{}",
                matches
                    .iter()
                    .map(|m| format!(
                        "{} vs {}  {}  {}",
                        m.team_a,
                        m.team_b,
                        m.score.as_deref().unwrap_or("-"),
                        m.winner_name().map(|w| format!("winner: {}", w)).unwrap_or_default()
                    ))
                    .join("\n")
            );
        }
        Cmd::News => {
            let (_, backend) = connect(&opt.config_url).await?;
            let news = feed::news(&backend, &cache).await?;
            println!(
                "{}",
                news.iter()
                    .map(|n| format!("{}  {}", n.date.as_deref().unwrap_or(""), n.title))
                    .join("\n")
            );
        }
        Cmd::Stats { watch } => {
            let (_, backend) = connect(&opt.config_url).await?;
            let stats = feed::member_stats(&backend, &cache).await?;
            println!("{} members, {} online", stats.total_members, stats.online_members);
            if watch {
                watch_stats(backend, cache).await?;
            }
        }
        Cmd::Join { code } => {
            let (_, backend) = connect(&opt.config_url).await?;
            let token = session
                .access_token()?
                .ok_or_else(|| Error::msg("Not logged in"))?;
            backend
                .join_team(&token, code.trim())
                .await
                .map_err(|e| Error::msg(e.user_message("Failed to join team.")))?;
            println!("Joined team");
        }
    }
    Ok(())
}

async fn connect(config_url: &str) -> Result<(RemoteConfig, HttpBackend), ApiError> {
    let config = load_remote_config(config_url).await?;
    let backend = HttpBackend::new(config.backend_url()?)?;
    Ok((config, backend))
}

// Onboarding pages can't do anything without a backend, so they send the user back to login
async fn connect_or_login(config_url: &str) -> Result<HttpBackend> {
    match connect(config_url).await {
        Ok((_, backend)) => Ok(backend),
        Err(e) => {
            eprintln!("Could not load backend configuration.");
            continue_at(Route::Login);
            Err(Error::new(e))
        }
    }
}

async fn drive<A, S>(machine: &mut Onboarding<'_, A, S>, mut answers: Answers) -> Result<()>
where
    A: levelgg::AuthApi + levelgg::PlayerApi + ?Sized,
    S: levelgg::Storage,
{
    loop {
        let result = match machine.state().clone() {
            State::ExchangingToken => return Err(Error::msg("Signup token was not exchanged")),
            State::CountrySelection => {
                let choice = answer(answers.country.take(), ask_country)?;
                machine.submit_country(&country_code(&choice)).await
            }
            State::AccountTypeSelection => {
                let choice = answer(answers.account_type.take(), || {
                    dmenu::select("Account type:", "team_lead\nplayer")
                })?;
                machine.submit_account_type(&choice).await
            }
            State::TeamCreation => {
                let choice = answer(answers.team_name.take(), || dmenu::prompt("Team name:"))?;
                machine.submit_team(&choice).await
            }
            State::Done { route, team_code } => {
                if let Some(code) = team_code {
                    println!("Share this code with your players: {}", code);
                    if let Err(e) = copy_to_clipboard(&code) {
                        warn!("Could not copy join code to clipboard: {}", e);
                    }
                }
                continue_at(route);
                return Ok(());
            }
        };
        match result {
            Ok(notice) => report(&notice),
            Err(e) => eprintln!("{}", e),
        }
    }
}

fn answer<F>(given: Option<String>, ask: F) -> Result<String>
where
    F: FnOnce() -> std::io::Result<Option<String>>,
{
    match given {
        Some(a) => Ok(a),
        None => ask()?.ok_or_else(|| Error::msg("Cancelled")),
    }
}

fn ask_country() -> std::io::Result<Option<String>> {
    let options = country::COUNTRIES
        .iter()
        .map(|(code, name)| format!("{} ({})", name, code))
        .join("\n");
    dmenu::select("Country:", &options)
}

// Accepts "Name (code)" lines from the picker as well as bare names or codes
fn country_code(choice: &str) -> String {
    let choice = choice.trim();
    if let (Some(open), true) = (choice.rfind('('), choice.ends_with(')')) {
        return choice[open + 1..choice.len() - 1].to_owned();
    }
    country::lookup(choice).unwrap_or(choice).to_owned()
}

fn secret(given: Option<String>, prompt: &str) -> Result<String> {
    answer(given, || dmenu::prompt_hidden(prompt))
}

async fn watch_stats<S: levelgg::Storage + 'static>(backend: HttpBackend, cache: TtlCache<S>) -> Result<()> {
    let poller = StatsPoller::start(Arc::new(backend), Arc::new(cache), STATS_POLL_INTERVAL);
    let mut latest = poller.subscribe();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = latest.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(stats) = *latest.borrow() {
                    println!("{} members, {} online", stats.total_members, stats.online_members);
                }
            }
        }
    }
    poller.stop().await;
    Ok(())
}

fn report(notice: &Notice) {
    match notice {
        Notice::Success(m) | Notice::Info(m) => println!("{}", m),
        Notice::Error(m) => eprintln!("{}", m),
    }
}

fn continue_at(route: Route) {
    println!("Continue at {}", route);
}

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use campusconnect::api::models::{MessageId, NewUser, User};
use campusconnect::app::{App, Route};
use campusconnect::config::ConfigStore;
use campusconnect::logging::init_tracing;
use campusconnect::notice::Notifier;
use campusconnect::session::{SessionContext, SessionStore};
use campusconnect::storage::Upload;
use campusconnect::ui::chat::{ChatController, ChatError};
use campusconnect::ui::discover::DiscoverIntent;
use campusconnect::ui::profile::ProfilePhase;
use campusconnect::validation::{password_strength, PasswordStrength};

const SUGGESTION_WAIT: Duration = Duration::from_secs(3);
const UNREAD_WAIT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(name = "campusconnect")]
#[command(about = "Campus Connect from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and remember the session
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        gender: String,
        #[arg(long)]
        college: String,
        #[arg(long)]
        semester: String,
        #[arg(long)]
        batch: String,
        #[arg(long)]
        password: Option<String>,
        /// Profile picture to upload
        #[arg(long, value_name = "FILE")]
        picture: Option<PathBuf>,
    },
    /// End the session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show the home feed
    Feed,
    /// Publish a post
    Post {
        content: String,
        /// Image or video to attach
        #[arg(long, value_name = "FILE")]
        media: Option<PathBuf>,
    },
    /// Show a profile
    Profile { username: String },
    /// List a user's followers, or whom they follow
    Followers {
        username: String,
        #[arg(long)]
        following: bool,
    },
    Follow { username: String },
    Unfollow { username: String },
    /// Edit your own profile
    Account {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        college: Option<String>,
        #[arg(long)]
        semester: Option<String>,
        #[arg(long)]
        batch: Option<String>,
        #[arg(long, value_name = "FILE")]
        picture: Option<PathBuf>,
    },
    /// List the people you follow
    Chats {
        #[arg(long)]
        filter: Option<String>,
    },
    /// Open an interactive chat
    Chat { username: String },
    /// Suggest usernames, then look one up exactly
    Search {
        term: String,
        #[arg(long, default_value = "")]
        gender: String,
    },
    /// Recommendations, or an advanced search when any criteria are given
    Discover {
        #[arg(long)]
        query: Option<String>,
        #[arg(long = "skill")]
        skills: Vec<String>,
        #[arg(long = "interest")]
        interests: Vec<String>,
        #[arg(long)]
        college: Option<String>,
    },
    /// Unread message count
    Unread {
        /// Keep printing as the count changes
        #[arg(long)]
        watch: bool,
    },
    /// Admin: list users
    Users {
        #[arg(long)]
        filter: Option<String>,
        #[arg(long)]
        gender: Option<String>,
        /// Delete the user with this id
        #[arg(long, value_name = "USER_ID")]
        delete: Option<i64>,
    },
}

impl Command {
    fn route(&self) -> Option<Route> {
        let route = match self {
            Command::Login { .. } => Route::Login,
            Command::Register { .. } => Route::Register,
            Command::Feed | Command::Post { .. } | Command::Account { .. } => Route::Feed,
            Command::Profile { username }
            | Command::Followers { username, .. }
            | Command::Follow { username }
            | Command::Unfollow { username } => Route::Profile(username.clone()),
            Command::Chats { .. } | Command::Chat { .. } | Command::Unread { .. } => Route::Chats,
            Command::Search { .. } | Command::Discover { .. } => Route::Discover,
            Command::Users { .. } => Route::Admin,
            Command::Logout | Command::Whoami => return None,
        };
        Some(route)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = ConfigStore::load_default().context("Failed to load config")?;
    let session = SessionContext::restore(SessionStore::new(SessionStore::default_path()?));
    let app = App::new(config, session).context("Failed to build HTTP client")?;
    let notices = tokio::spawn(print_notices(app.notifier().clone()));

    if let Some(route) = cli.command.route() {
        let resolved = app.resolve(route.clone());
        if resolved != route {
            match resolved {
                Route::Login => bail!("Not logged in. Run `campusconnect login <username>` first."),
                _ if route == Route::Admin => bail!("Admin access required"),
                _ => bail!("Already logged in. Run `campusconnect logout` first."),
            }
        }
    }

    let result = run(&app, cli.command).await;
    notices.abort();
    result
}

async fn run(app: &App, command: Command) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let password = read_secret(password, "Password: ").await?;
            let user = app.auth().login(&username, &password).await?;
            println!("Logged in as {} ({})", user.username, user.display_name());
        }
        Command::Register {
            username,
            email,
            first_name,
            last_name,
            gender,
            college,
            semester,
            batch,
            password,
            picture,
        } => {
            let password = read_secret(password, "Password: ").await?;
            if password_strength(&password) == PasswordStrength::Weak {
                eprintln!("Warning: weak password");
            }
            let picture = picture
                .map(|path| Upload::from_path(&path).with_context(|| format!("Cannot read {}", path.display())))
                .transpose()?;
            let new_user = NewUser {
                first_name,
                last_name,
                username,
                email,
                gender,
                password,
                college,
                semester,
                batch,
                profile_picture: None,
            };
            if let Err(err) = app.auth().register(new_user, picture).await {
                if let Some(fields) = err.field_errors() {
                    for (field, message) in fields {
                        eprintln!("  {:?}: {}", field, message);
                    }
                }
                return Err(err.into());
            }
            println!("Registration successful. You can now log in.");
        }
        Command::Logout => {
            app.logout()?;
            println!("Logged out");
        }
        Command::Whoami => match app.session().current() {
            Some(user) => println!(
                "{} ({}){}",
                user.username,
                user.display_name(),
                if user.admin { " [admin]" } else { "" }
            ),
            None => println!("Not logged in"),
        },
        Command::Feed => {
            let feed = app.feed()?;
            feed.load().await;
            let state = feed.state();
            if state.posts.is_empty() {
                println!("No posts yet.");
            }
            for post in &state.posts {
                let author = post.user.as_ref().map(|u| u.username.as_str()).unwrap_or("?");
                let marker = if state.is_following_author(post) { " (following)" } else { "" };
                println!("#{} @{}{}", post.post_id, author, marker);
                println!("  {}", post.content);
                if let Some(media) = post.media() {
                    println!("  [{}]", media.url());
                }
            }
        }
        Command::Post { content, media } => {
            let media = media
                .map(|path| Upload::from_path(&path).with_context(|| format!("Cannot read {}", path.display())))
                .transpose()?;
            app.feed()?.create_post(&content, media).await?;
            println!("Posted");
        }
        Command::Profile { username } => {
            let profile = app.profile(&username).await?;
            let state = profile.state();
            match &state.phase {
                ProfilePhase::NotFound => bail!("User not found"),
                ProfilePhase::Failed(message) => bail!("{}", message),
                _ => {}
            }
            println!("@{} {}", username, state.display_name());
            println!(
                "  {} followers, {} following",
                state.counts.followers, state.counts.following
            );
            if !state.is_own {
                println!(
                    "  {}{}",
                    if state.following { "following" } else { "not following" },
                    if state.can_chat { ", can message" } else { "" }
                );
            }
            for post in &state.posts {
                println!("#{} {}", post.post_id, post.content);
            }
        }
        Command::Followers {
            username,
            following,
        } => {
            let profile = app.profile(&username).await?;
            let people = if following {
                profile.following().await?
            } else {
                profile.followers().await?
            };
            for person in people {
                println!("@{} {}", person.username, person.display_name());
            }
        }
        Command::Account {
            first_name,
            last_name,
            email,
            college,
            semester,
            batch,
            picture,
        } => {
            let current = app.session().require()?;
            let edited = User {
                first_name: first_name.unwrap_or(current.first_name.clone()),
                last_name: last_name.unwrap_or(current.last_name.clone()),
                email: email.unwrap_or(current.email.clone()),
                college: college.or(current.college.clone()),
                semester: semester.or(current.semester.clone()),
                batch: batch.or(current.batch.clone()),
                ..current
            };
            let picture = picture
                .map(|path| Upload::from_path(&path).with_context(|| format!("Cannot read {}", path.display())))
                .transpose()?;
            let saved = app.auth().update_profile(edited, picture).await?;
            println!("Profile updated for @{}", saved.username);
        }
        Command::Follow { username } => set_following(app, &username, true).await?,
        Command::Unfollow { username } => set_following(app, &username, false).await?,
        Command::Chats { filter } => {
            let chats = app.chat_list()?;
            let mut changes = chats.store().subscribe();
            while chats.state().loading {
                changes.changed().await.context("Chat list closed")?;
            }
            if let Some(filter) = filter {
                chats.set_query(filter);
            }
            for person in chats.state().visible() {
                println!("@{} {}", person.username, person.display_name());
            }
            chats.close();
        }
        Command::Chat { username } => {
            let profile = app.profile(&username).await?;
            let chat_id = profile.message().await?;
            let chat = app.chat(chat_id)?;
            chat_loop(&chat, &username).await?;
            chat.close();
        }
        Command::Search { term, gender } => {
            let mut navbar = app.navbar()?;
            navbar.set_gender(gender);
            navbar.type_query(term.clone());
            if tokio::time::timeout(SUGGESTION_WAIT, navbar.autocomplete().changed())
                .await
                .unwrap_or(false)
            {
                for suggestion in navbar.suggestions().items {
                    println!("  {}", suggestion);
                }
            }
            let found = navbar.search(&term).await?;
            println!("Found @{}", found);
        }
        Command::Discover {
            query,
            skills,
            interests,
            college,
        } => {
            let discover = app.discover()?;
            let advanced =
                query.is_some() || !skills.is_empty() || !interests.is_empty() || college.is_some();
            let results = if advanced {
                discover.type_query(query.unwrap_or_default());
                for skill in skills {
                    discover.update(DiscoverIntent::AddSkill(skill));
                }
                for interest in interests {
                    discover.update(DiscoverIntent::AddInterest(interest));
                }
                if let Some(college) = college {
                    discover.update(DiscoverIntent::SetCollege(college));
                }
                discover.advanced_search().await?;
                discover.state().results
            } else {
                discover.load_recommendations().await;
                discover.state().recommendations
            };
            for result in results {
                println!(
                    "@{} {} {} ({:.0}%)",
                    result.username,
                    result.first_name,
                    result.last_name,
                    result.match_score
                );
                if let Some(reason) = result.match_reason {
                    println!("  {}", reason);
                }
            }
        }
        Command::Unread { watch } => {
            let navbar = app.navbar()?;
            let mut changes = navbar.store().subscribe();
            let deadline = tokio::time::Instant::now() + UNREAD_WAIT;
            let mut printed: Option<u64> = None;
            loop {
                // The first poll may land before the subscription.
                let state = navbar.state();
                if state.unread_loaded && printed != Some(state.unread) {
                    println!("{}", state.badge().unwrap_or_else(|| "0".to_string()));
                    printed = Some(state.unread);
                    if !watch {
                        break;
                    }
                }
                tokio::select! {
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = tokio::time::sleep_until(deadline), if printed.is_none() => {
                        bail!("Could not load the unread count");
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
        Command::Users {
            filter,
            gender,
            delete,
        } => {
            let admin = app.admin()?;
            if let Some(user_id) = delete {
                admin.delete_user(user_id).await?;
            }
            admin.load().await?;
            admin.set_query(filter.unwrap_or_default());
            admin.set_gender(gender.unwrap_or_default());
            let state = admin.state();
            let stats = state.stats();
            println!(
                "{} users ({} admins, {} regular)",
                stats.total, stats.admins, stats.regular
            );
            for user in state.visible() {
                println!(
                    "{:>6} @{} {} <{}>{}",
                    user.user_id,
                    user.username,
                    user.display_name(),
                    user.email,
                    if user.admin { " [admin]" } else { "" }
                );
            }
        }
    }
    Ok(())
}

async fn set_following(app: &App, username: &str, follow: bool) -> Result<()> {
    let profile = app.profile(username).await?;
    match profile.follow_displayed() {
        None => bail!("You cannot follow yourself"),
        Some(current) if current == follow => {
            println!("Already {}", if follow { "following" } else { "not following" });
            return Ok(());
        }
        Some(_) => {}
    }
    let change = profile.toggle_follow().await?;
    let state = profile.state();
    println!(
        "{} @{} ({} followers){}",
        if change.following { "Following" } else { "Unfollowed" },
        username,
        state.counts.followers,
        if state.can_chat { ", you can now message each other" } else { "" }
    );
    Ok(())
}

/// Stdin lines are sent; `/delete <id>` removes one of your messages and
/// `/quit` leaves.
async fn chat_loop(chat: &ChatController, peer: &str) -> Result<()> {
    println!("Chatting with @{}. /delete <id> removes a message, /quit leaves.", peer);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut changes = chat.store().subscribe();
    let mut shown: HashSet<MessageId> = HashSet::new();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line == "/quit" {
                    break;
                }
                if let Some(id) = line.strip_prefix("/delete ") {
                    match id.trim().parse::<MessageId>() {
                        Ok(id) => {
                            if let Err(err) = chat.delete(id).await {
                                report(chat, err);
                            }
                        }
                        Err(_) => eprintln!("Usage: /delete <id>"),
                    }
                    continue;
                }
                chat.set_draft(line);
                if let Err(err) = chat.send().await {
                    report(chat, err);
                }
            }
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = chat.state();
                for message in &state.messages {
                    if shown.insert(message.id) {
                        let who = if state.is_own(message) { "you" } else { message.sender_name.as_str() };
                        println!("[{}] {}: {}", message.id, who, message.content);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

/// Request failures already reach the terminal as notices.
fn report(chat: &ChatController, err: ChatError) {
    if !matches!(err, ChatError::Request { .. }) {
        eprintln!("{}", err);
    }
    chat.dismiss_error();
}

async fn read_secret(given: Option<String>, prompt: &str) -> Result<String> {
    if let Some(secret) = given {
        return Ok(secret);
    }
    eprint!("{}", prompt);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    match lines.next_line().await? {
        Some(line) => Ok(line.trim_end().to_string()),
        None => bail!("No password given"),
    }
}

async fn print_notices(notifier: Notifier) {
    let mut rx = notifier.subscribe();
    loop {
        match rx.recv().await {
            Ok(notice) => eprintln!("[{}] {}", notice.kind.label(), notice.message),
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }
}

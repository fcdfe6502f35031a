use chrono::Utc;
use client::{
    ApiClient, Board,
    auth::{CookieJar, authenticated_token, decode_claims},
    board::{Confirm, CurrentUser, fetch_snapshot},
    config::Config,
    models::{Idea, VoteKind},
    views::{self, SignUpForm},
};
use colored::*;
use std::io::{self, Write};
use tokio::{
    io::{AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::mpsc,
    time::MissedTickBehavior,
};

// ===== Prompt =====

struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    fn show(label: &str) -> io::Result<()> {
        print!("{}", label.bright_green().bold());
        io::stdout().flush()
    }

    /// Next input line, `None` on end of input.
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.lines.next_line().await
    }

    async fn ask(&mut self, label: &str) -> anyhow::Result<String> {
        Self::show(label)?;
        match self.next_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => anyhow::bail!("input closed"),
        }
    }
}

impl Confirm for Prompt {
    async fn confirm(&mut self, title: &str, text: &str) -> bool {
        println!("{} {}", title.yellow().bold(), text);
        match self.ask("Delete it? [y/N] > ").await {
            Ok(answer) => answer.to_lowercase().starts_with('y'),
            Err(_) => false,
        }
    }
}

enum Exit {
    Logout,
    Quit,
}

// ===== Main =====

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let config = Config::load()?;
    let jar = CookieJar::new(&config.cookie_path);
    let mut prompt = Prompt::new();

    println!("{}", "=".repeat(60).bright_cyan());
    println!("{}", "    💡 VOTE.IO - PORTAL DE IDEIAS 💡".bright_yellow().bold());
    println!("{}", "=".repeat(60).bright_cyan());
    println!();

    loop {
        if let Some(token) = authenticated_token(&jar, Utc::now()) {
            match dashboard(&config, &jar, token, &mut prompt).await? {
                Exit::Logout => continue,
                Exit::Quit => break,
            }
        }

        println!("{}", "[L]ogin  [S]ign up  [Q]uit".bright_black());
        let choice = match prompt.ask("> ").await {
            Ok(choice) => choice.to_lowercase(),
            Err(_) => break,
        };

        match choice.as_str() {
            "l" | "login" => login(&config, &jar, &mut prompt).await?,
            "s" | "signup" => sign_up(&config, &mut prompt).await?,
            "q" | "quit" => break,
            _ => println!("{}", "Invalid choice. Please try again.".red()),
        }
    }

    println!();
    println!("{}", "Thanks for sharing your ideas! 👋".bright_cyan().bold());
    Ok(())
}

// ===== Auth views =====

async fn login(config: &Config, jar: &CookieJar, prompt: &mut Prompt) -> anyhow::Result<()> {
    let email = prompt.ask("E-mail: ").await?;
    let password = prompt.ask("Password: ").await?;

    let api = ApiClient::new(&config.api_url);
    match views::login(&api, jar, &email, &password).await {
        Ok(user) => {
            let name = user.map(|u| u.nome).unwrap_or(email);
            println!("{} {}", "✅ Welcome,".green().bold(), name.bright_white());
        }
        Err(e) => eprintln!("{} {}", "❌ Login failed:".red().bold(), e),
    }
    Ok(())
}

async fn sign_up(config: &Config, prompt: &mut Prompt) -> anyhow::Result<()> {
    let form = SignUpForm {
        nome: prompt.ask("Name: ").await?,
        email: prompt.ask("E-mail: ").await?,
        senha: prompt.ask("Password: ").await?,
        confirm_senha: prompt.ask("Confirm password: ").await?,
    };

    let api = ApiClient::new(&config.api_url);
    match views::sign_up(&api, &form).await {
        Ok(()) => println!(
            "{}",
            "✅ Account created! You can log in now.".green().bold()
        ),
        Err(e) => eprintln!("{} {}", "❌ Sign up failed:".red().bold(), e),
    }
    Ok(())
}

// ===== Dashboard =====

async fn dashboard(
    config: &Config,
    jar: &CookieJar,
    token: String,
    prompt: &mut Prompt,
) -> anyhow::Result<Exit> {
    let user = decode_claims(&token).map(CurrentUser::from);
    let api = ApiClient::new(&config.api_url).with_token(token);
    let mut board = Board::new(user);

    render(&board);
    if let Err(e) = board.refresh(&api).await {
        eprintln!("{} {}", "❌ Could not load ideas:".red().bold(), e);
    }
    render(&board);
    print_help();

    let (tx, mut rx) = mpsc::channel(4);
    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await;

    Prompt::show("> ")?;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if authenticated_token(jar, Utc::now()).is_none() {
                    println!();
                    println!("{}", "Session expired, please log in again.".yellow());
                    return Ok(Exit::Logout);
                }
                let ticket = board.begin_snapshot();
                let api = api.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send((ticket, fetch_snapshot(&api).await)).await;
                });
            }
            Some((ticket, result)) = rx.recv() => match result {
                Ok(ideas) => {
                    let before = board.ideas().to_vec();
                    if board.apply_snapshot(ticket, ideas) && board.ideas() != before {
                        println!();
                        render(&board);
                        Prompt::show("> ")?;
                    }
                }
                Err(e) => tracing::warn!("Background refresh failed: {e}"),
            },
            line = prompt.next_line() => {
                let Some(line) = line? else {
                    return Ok(Exit::Quit);
                };
                if let Some(exit) = command(line.trim(), &mut board, &api, jar, prompt).await? {
                    return Ok(exit);
                }
                Prompt::show("> ")?;
            }
        }
    }
}

fn print_help() {
    println!(
        "{}",
        "[L]ist  [N]ew  [U]p <n>  [D]own <n>  [V]iew <n>  [C]omment <n>  [X] delete <n>  [R]efresh  [O] logout  [Q]uit"
            .bright_black()
    );
}

async fn command(
    line: &str,
    board: &mut Board,
    api: &ApiClient,
    jar: &CookieJar,
    prompt: &mut Prompt,
) -> anyhow::Result<Option<Exit>> {
    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or_default().to_lowercase();
    let target = parts
        .next()
        .and_then(|n| n.parse::<usize>().ok())
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| board.ideas().get(i))
        .map(|idea| idea.codigo.clone());

    let needs_target = matches!(verb.as_str(), "u" | "up" | "d" | "down" | "v" | "view" | "c" | "comment" | "x" | "delete");
    if needs_target && target.is_none() {
        println!("{}", "Pick an idea by its number, e.g. `u 2`.".red());
        return Ok(None);
    }
    let codigo = target.unwrap_or_default();

    match verb.as_str() {
        "" => {}
        "l" | "list" => render(board),
        "h" | "help" => print_help(),
        "r" | "refresh" => match board.refresh(api).await {
            Ok(()) => render(board),
            Err(e) => eprintln!("{} {}", "❌ Could not load ideas:".red().bold(), e),
        },
        "n" | "new" => {
            let titulo = prompt.ask("Title: ").await?;
            let descricao = prompt.ask("Description: ").await?;
            match board.submit_idea(api, &titulo, &descricao).await {
                Ok(()) => {
                    println!("{}", "✓ Idea published".green());
                    render(board);
                }
                Err(e) => eprintln!("{} {}", "❌ Could not publish:".red().bold(), e),
            }
        }
        "u" | "up" | "d" | "down" => {
            let kind = if verb.starts_with('u') {
                VoteKind::Up
            } else {
                VoteKind::Down
            };
            match board.vote(api, &codigo, kind).await {
                Ok(_) => {
                    if let Some(idea) = board.idea(&codigo) {
                        print_idea_line(board, idea, None);
                    }
                }
                Err(e) => eprintln!("{} {}", "❌ Vote failed:".red().bold(), e),
            }
        }
        "v" | "view" => {
            if let Some(idea) = board.idea(&codigo) {
                print_idea_detail(idea);
            }
        }
        "c" | "comment" => {
            let texto = prompt.ask("Comment: ").await?;
            match board.comment(api, &codigo, &texto).await {
                Ok(()) => {
                    if let Some(idea) = board.idea(&codigo) {
                        print_idea_detail(idea);
                    }
                }
                Err(e) => eprintln!("{} {}", "❌ Could not comment:".red().bold(), e),
            }
        }
        "x" | "delete" => match board.delete_idea(api, &codigo, prompt).await {
            Ok(true) => println!("{}", "✓ Your idea was removed.".green()),
            Ok(false) => println!("{}", "→ Cancelled".yellow()),
            Err(e) => eprintln!("{} {}", "❌ Could not delete the idea:".red().bold(), e),
        },
        "o" | "logout" => {
            jar.clear_token()?;
            println!("{}", "Logged out.".bright_cyan());
            return Ok(Some(Exit::Logout));
        }
        "q" | "quit" => return Ok(Some(Exit::Quit)),
        _ => println!("{}", "Invalid choice. Type `h` for help.".red()),
    }
    Ok(None)
}

// ===== Rendering =====

fn render(board: &Board) {
    println!("{}", "━".repeat(60).bright_black());
    if let Some(user) = board.current_user() {
        println!(
            "{} {} <{}>",
            "Logged in as".bright_black(),
            user.nome.bright_white().bold(),
            user.email
        );
    }
    println!();

    if board.is_loading() {
        println!("{}", "Loading ideas...".bright_black());
        return;
    }
    if board.ideas().is_empty() {
        println!("{}", "No ideas yet. Be the first to publish one!".bright_black());
    }
    for (i, idea) in board.ideas().iter().enumerate() {
        print_idea_line(board, idea, Some(i + 1));
    }
    println!();
}

fn print_idea_line(board: &Board, idea: &Idea, number: Option<usize>) {
    let up = format!("▲ {}", idea.upvotes);
    let down = format!("▼ {}", idea.downvotes);
    let (up, down) = match idea.user_vote {
        Some(VoteKind::Up) => (up.green().bold(), down.normal()),
        Some(VoteKind::Down) => (up.normal(), down.red().bold()),
        None => (up.normal(), down.normal()),
    };
    let number = number.map(|n| format!("{n}.")).unwrap_or_default();
    let owner = if board.can_delete(idea) { " ✎" } else { "" };

    println!(
        "{} {}  {} {}  💬 {}  {}{}",
        number.bright_cyan(),
        idea.titulo.bright_white().bold(),
        up,
        down,
        idea.comentarios.len(),
        idea.nome_usuario.bright_black(),
        owner
    );
}

fn print_idea_detail(idea: &Idea) {
    println!("{}", "━".repeat(60).bright_black());
    println!("{}", idea.titulo.bright_yellow().bold());
    println!(
        "{} {} <{}>",
        "by".bright_black(),
        idea.nome_usuario,
        idea.email_usuario
    );
    println!();
    println!("{}", idea.descricao);
    println!();
    if idea.comentarios.is_empty() {
        println!("{}", "No comments yet.".bright_black());
    }
    for c in &idea.comentarios {
        println!("  {} {}", format!("{}:", c.nome_usuario).bright_cyan(), c.comentario);
    }
    println!();
}

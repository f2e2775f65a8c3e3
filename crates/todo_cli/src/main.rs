mod cli;

use clap::Parser;
use cli::{Cli, Command, collect_overrides};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tokio::io::{AsyncBufReadExt, BufReader};
use todo_core::api::GraphqlClient;
use todo_core::config::{self, Config, Palette, palette_for_theme};
use todo_core::error::AppError;
use todo_core::form::{FormController, NAME_REQUIRED, SubmitOutcome};
use todo_core::model::Task;
use todo_core::page::TodoPage;
use todo_core::session::{FileSessionProvider, SessionProvider};
use todo_core::view;
use tracing_subscriber::EnvFilter;

type Page = TodoPage<GraphqlClient, FileSessionProvider>;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "CREATED")]
    created: String,
}

fn print_tasks_plain(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    let rows = tasks.iter().enumerate().map(|(index, task)| TaskRow {
        position: index + 1,
        id: task.id.to_string(),
        name: task.name.clone(),
        description: task.description.clone().unwrap_or_default(),
        created: task
            .created_at
            .as_deref()
            .and_then(view::format_timestamp)
            .unwrap_or_else(|| "-".to_string()),
    });
    let mut table = Table::new(rows);
    table.with(Style::psql());
    println!("{table}");
}

fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "name": task.name,
        "description": task.description,
        "userId": task.user_id,
        "createdAt": task.created_at,
    })
}

fn print_tasks_json(tasks: &[Task]) {
    let payload: Vec<serde_json::Value> = tasks.iter().map(task_json).collect();
    println!("{}", serde_json::Value::Array(payload));
}

fn print_tasks(tasks: &[Task], json: bool) {
    if json {
        print_tasks_json(tasks);
    } else {
        print_tasks_plain(tasks);
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;
    let mut quoted_token = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            quoted_token = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() || quoted_token {
                args.push(std::mem::take(&mut current));
                quoted_token = false;
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() || quoted_token {
        args.push(current);
    }

    Ok(args)
}

const PAGE_HELP: &str = "\
Commands:
  add <name> [-d <description>]  Add a task
  complete <id|position>         Complete (remove) a task
  reload                         Reload the list
  whoami                         Print the signed-in user id
  sign-out                       Sign out and close the page
  help, ?                        Show this help
  exit, quit                     Close the page";

fn print_page_help() {
    println!("{PAGE_HELP}");
}

fn init_logging(level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the page and JSON output; diagnostics go to stderr.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

fn resolve_config(raw_overrides: &[String]) -> Result<Config, AppError> {
    let load = config::load_config_with_fallback();
    if let Some(err) = load.error.as_ref() {
        tracing::warn!(error = %err, "ignoring unreadable configuration");
    }
    let overrides = collect_overrides(raw_overrides).map_err(AppError::invalid_input)?;
    Ok(config::merge_overrides(&load.config, &overrides))
}

fn open_page(config: &Config) -> Result<Page, AppError> {
    let session = FileSessionProvider::from_env()?;
    TodoPage::open(session, |user| GraphqlClient::new(config, user))
}

/// Rejects an empty name before any configuration or network access.
fn validate_new_task(name: Option<&str>, description: Option<&str>) -> Result<(), AppError> {
    let mut form = FormController::new();
    form.set_name(name.unwrap_or_default());
    form.set_description(description.unwrap_or_default());
    form.validate().map(|_| ()).map_err(|errors| {
        AppError::invalid_input(errors.name.unwrap_or_else(|| NAME_REQUIRED.to_string()))
    })
}

async fn run_command(cli: Cli, command: Command) -> Result<(), AppError> {
    match command {
        Command::Login { user_id, token } => {
            let session = FileSessionProvider::from_env()?;
            let user = session.sign_in(&user_id, token.as_deref())?;
            if cli.json {
                println!("{}", serde_json::json!({ "userId": user.user_id }));
            } else {
                println!("Signed in as {}", user.user_id);
            }
        }
        Command::SignOut => {
            FileSessionProvider::from_env()?.sign_out()?;
            if !cli.json {
                println!("Signed out.");
            }
        }
        Command::Whoami => {
            let user = FileSessionProvider::from_env()?.current_user()?;
            if cli.json {
                println!("{}", serde_json::json!({ "userId": user.user_id }));
            } else {
                println!("{}", user.user_id);
            }
        }
        Command::List => {
            let config = resolve_config(&cli.config_override)?;
            let mut page = open_page(&config)?;
            page.mount().await?;
            print_tasks(page.store().tasks(), cli.json);
        }
        Command::Add { name, description } => {
            validate_new_task(name.as_deref(), description.as_deref())?;

            let config = resolve_config(&cli.config_override)?;
            let mut page = open_page(&config)?;
            page.form_mut().set_name(name.unwrap_or_default());
            page.form_mut()
                .set_description(description.unwrap_or_default());

            match page.submit().await {
                SubmitOutcome::Created(task) => {
                    if cli.json {
                        println!("{}", task_json(&task));
                    } else {
                        println!("Added task: {} ({})", task.name, task.id);
                        print_tasks_plain(page.store().tasks());
                    }
                }
                SubmitOutcome::Invalid(_) => {
                    return Err(AppError::invalid_input(NAME_REQUIRED));
                }
                SubmitOutcome::Failed(err) => return Err(err),
            }
        }
        Command::Complete { target } => {
            if target.trim().is_empty() {
                return Err(AppError::invalid_input("id is required"));
            }

            let config = resolve_config(&cli.config_override)?;
            let mut page = open_page(&config)?;
            page.mount().await?;
            let task = page
                .complete(&target)
                .await?
                .ok_or_else(|| AppError::invalid_input("id is required"))?;
            if cli.json {
                println!("{}", task_json(&task));
            } else {
                println!("Completed task: {} ({})", task.name, task.id);
                print_tasks_plain(page.store().tasks());
            }
        }
    }

    Ok(())
}

fn render(page: &Page, palette: &Palette) {
    println!("{}", view::render(page, palette));
}

/// Applies one line of input to the open page. Returns `false` once the
/// session has ended.
async fn apply_page_command(page: &mut Page, command: Command) -> Result<bool, AppError> {
    match command {
        Command::Add { name, description } => {
            page.form_mut().set_name(name.unwrap_or_default());
            page.form_mut()
                .set_description(description.unwrap_or_default());
            // The outcome is visible in the next render.
            let _ = page.submit().await;
        }
        Command::Complete { target } => {
            let _ = page.complete(&target).await;
        }
        Command::List => {
            let _ = page.reload().await;
        }
        Command::SignOut => {
            page.sign_out()?;
            return Ok(false);
        }
        Command::Whoami => println!("{}", page.user().user_id),
        Command::Login { .. } => {
            return Err(AppError::invalid_input(
                "already signed in; sign out before logging in again",
            ));
        }
    }
    Ok(true)
}

async fn run_interactive(cli: &Cli) -> Result<(), AppError> {
    let config = resolve_config(&cli.config_override)?;
    let palette = palette_for_theme(config.theme.as_deref());
    let mut page = open_page(&config)?;

    // A failed first load shows up as a notice on the page.
    let _ = page.mount().await;
    render(&page, &palette);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(input) = lines
        .next_line()
        .await
        .map_err(|err| AppError::io(err.to_string()))?
    {
        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_page_help();
            continue;
        }

        if line.eq_ignore_ascii_case("reload") {
            let _ = page.reload().await;
            render(&page, &palette);
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("todo".to_string());
        argv.extend(args);

        let command = match Cli::try_parse_from(argv) {
            Ok(Cli {
                command: Some(command),
                ..
            }) => command,
            Ok(_) => continue,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        match apply_page_command(&mut page, command).await {
            Ok(true) => render(&page, &palette),
            Ok(false) => {
                render(&page, &palette);
                return Ok(());
            }
            Err(err) => eprintln!("ERROR: {}", err),
        }
    }

    page.unmount();
    Ok(())
}

#[tokio::main]
async fn main() {
    let mut cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    init_logging(&cli.log_level);

    let result = match cli.command.take() {
        Some(command) => run_command(cli, command).await,
        None => run_interactive(&cli).await,
    };

    if let Err(err) = result {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{PAGE_HELP, split_command_line, validate_new_task};

    #[test]
    fn split_command_line_honours_quotes() {
        let args = split_command_line(r#"add "Buy milk" -d "2% \"low\" fat""#).unwrap();
        assert_eq!(args, vec!["add", "Buy milk", "-d", r#"2% "low" fat"#]);
    }

    #[test]
    fn split_command_line_keeps_empty_quoted_argument() {
        let args = split_command_line(r#"add """#).unwrap();
        assert_eq!(args, vec!["add", ""]);
    }

    #[test]
    fn split_command_line_rejects_unterminated_quote() {
        let err = split_command_line(r#"add "Buy milk"#).unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn validate_new_task_requires_name() {
        let err = validate_new_task(Some("  "), Some("details")).unwrap_err();
        assert_eq!(err.to_string(), "invalid_input - task name is required");
        assert!(validate_new_task(Some("Buy milk"), None).is_ok());
    }

    #[test]
    fn page_help_lists_only_page_commands() {
        for command in ["add", "complete", "reload", "sign-out", "exit"] {
            assert!(PAGE_HELP.contains(command), "missing {command}");
        }
        assert!(!PAGE_HELP.contains("--json"));
        assert!(!PAGE_HELP.contains("--config-override"));
        assert!(!PAGE_HELP.contains("login"));
    }
}

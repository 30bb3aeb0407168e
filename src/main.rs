use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context};
use clap::{command, value_parser, Arg, ArgAction, ArgMatches, Command};
use git::GitEvent;
use log::debug;
use post::{ContainerSelector, NewPostRequest, DEFAULT_CONTAINER_ID};
use settings::Settings;

mod git;
mod post;
mod settings;

/// Date label format, e.g. `Mar 08, 2025`.
const DATE_FORMAT: &str = "%b %d, %Y";

fn cli() -> Command {
    command!()
        .subcommand_required(true)
        .arg(
            Arg::new("settings")
                .long("settings")
                .global(true)
                .help("Settings file. Defaults to <config dir>/blogcard/settings.json")
                .value_parser(value_parser!(PathBuf)),
        )
        .subcommand(
            Command::new("add")
                .about("Insert a new post card at the top of the blog home page")
                .args(&[
                    Arg::new("html_file")
                        .help("Blog home HTML file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                    Arg::new("title").long("title").required(true).help("Post title"),
                    Arg::new("tags")
                        .long("tags")
                        .required(true)
                        .help("Tags (comma-separated)"),
                    Arg::new("description")
                        .long("description")
                        .required(true)
                        .help("Description/excerpt. `-` reads it from stdin"),
                    Arg::new("read_time")
                        .long("read-time")
                        .required(true)
                        .help("Reading time, e.g. \"5 min read\""),
                    Arg::new("date")
                        .long("date")
                        .help("Date label. Defaults to today, e.g. \"Mar 08, 2025\""),
                    Arg::new("file")
                        .long("file")
                        .required(true)
                        .help("Post HTML filename the card links to. `.html` is appended if missing"),
                    Arg::new("container_id")
                        .long("container-id")
                        .default_value(DEFAULT_CONTAINER_ID)
                        .help("id of the <main> element holding the posts"),
                ]),
        )
        .subcommand(
            Command::new("push")
                .about("Run git add, commit and push in the blog repository")
                .args(&[
                    Arg::new("message")
                        .short('m')
                        .long("message")
                        .required(true)
                        .help("Commit message"),
                    Arg::new("repo")
                        .long("repo")
                        .help("Repository directory. Remembered for later runs")
                        .value_parser(value_parser!(PathBuf)),
                    Arg::new("init")
                        .long("init")
                        .action(ArgAction::SetTrue)
                        .help("Run `git init` if the directory is not a repository yet"),
                ]),
        )
}

fn arg<'a>(matches: &'a ArgMatches, id: &str) -> anyhow::Result<&'a String> {
    matches
        .get_one::<String>(id)
        .with_context(|| format!("missing argument: {id}"))
}

fn add(matches: &ArgMatches) -> anyhow::Result<()> {
    let html_file = matches
        .get_one::<PathBuf>("html_file")
        .context("missing argument: html_file")?;

    let description = arg(matches, "description")?;
    let description = if description == "-" {
        io::read_to_string(io::stdin()).context("while reading description from stdin")?
    } else {
        description.to_owned()
    };
    let date = match matches.get_one::<String>("date") {
        Some(date) => date.to_owned(),
        None => chrono::Local::now().format(DATE_FORMAT).to_string(),
    };

    let request = NewPostRequest {
        title: arg(matches, "title")?.to_owned(),
        tags: arg(matches, "tags")?.to_owned(),
        description,
        read_time: arg(matches, "read_time")?.to_owned(),
        date,
        file_name: arg(matches, "file")?.to_owned(),
    };
    let container = ContainerSelector::with_id(arg(matches, "container_id")?);

    let outcome = post::insert_post(html_file, &request, &container);
    if !outcome.success {
        bail!("{}", outcome.message);
    }
    println!("{}", outcome.message);
    Ok(())
}

fn resolve_repo(
    matches: &ArgMatches,
    settings_path: &Path,
    settings: &mut Settings,
) -> anyhow::Result<PathBuf> {
    let repo = match matches.get_one::<PathBuf>("repo") {
        Some(repo) => repo.to_owned(),
        None => settings
            .repo_path
            .clone()
            .context("No repository configured. Select one with --repo <DIR>.")?,
    };
    if !repo.is_dir() {
        bail!("repository {repo:?} must be a directory.");
    }

    if !git::is_repository(&repo) {
        if !matches.get_flag("init") {
            bail!("{repo:?} is not a git repository. Pass --init to initialize one.");
        }
        let output = git::init_repository(&repo)
            .with_context(|| format!("Failed to initialize git repo at {repo:?}"))?;
        print!("{output}");
    }

    if settings.repo_path.as_ref() != Some(&repo) {
        settings.repo_path = Some(repo.clone());
        settings::save_settings(settings_path, settings)?;
    }
    Ok(repo)
}

fn push(matches: &ArgMatches, settings_path: &Path) -> anyhow::Result<()> {
    let message = arg(matches, "message")?.trim().to_string();
    if message.is_empty() {
        bail!("Commit message cannot be empty.");
    }

    let mut settings = settings::load_settings(settings_path)?;
    let repo = resolve_repo(matches, settings_path, &mut settings)?;
    println!("Repository: {}", repo.display());

    let events = git::spawn_sequence(repo, git::publish_commands(&message));
    let mut stdout = io::stdout();
    for event in events {
        match event {
            GitEvent::Running(command) => println!("Running: {command}"),
            GitEvent::Output(text) => {
                print!("{text}");
                stdout.flush()?;
            }
            GitEvent::Failed(e) => {
                if let Some(code) = e.exit_code() {
                    debug!("git exited with code {code}");
                }
                return Err(anyhow!(e));
            }
            GitEvent::Finished => {
                println!("Operation completed successfully.");
                return Ok(());
            }
        }
    }
    bail!("git worker stopped without reporting a result")
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = cli().get_matches();
    let (name, sub) = matches.subcommand().context("missing subcommand")?;
    let settings_path = sub
        .get_one::<PathBuf>("settings")
        .cloned()
        .unwrap_or_else(settings::default_settings_path);

    match name {
        "add" => add(sub),
        "push" => push(sub, &settings_path),
        _ => bail!("unknown subcommand: {name}"),
    }
}

use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use tracing::{error, info};

mod display;
mod error;
mod logger;
mod planner;
mod recurrence;
mod semester;
mod todoist;
mod utils;

use planner::{Planner, RootPolicy};
use semester::{models::Category, Semester};
use todoist::{Preview, TaskList, Todoist};

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Args {
    /// JSON description of the semester
    #[clap(value_parser)]
    description: PathBuf,

    /// Todoist API token, the schedule is only shown without it
    #[clap(short, long, env = "TODOIST_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Project everything is created into
    #[clap(short, long, value_name = "PROJECT NAME", default_value = "Semester planner")]
    root_project: String,

    /// Category of classes turned into tasks
    #[clap(short, long, value_enum, default_value_t = Category::Labs)]
    category: Category,

    /// Delete and recreate the root project if it exists
    #[clap(long, conflicts_with = "keep")]
    clear: bool,

    /// Add to the root project if it exists
    #[clap(long)]
    keep: bool,

    /// Print the tasks instead of creating them
    #[clap(short, long)]
    dry_run: bool,

    /// Show the classes of the category before planning them
    #[clap(short, long)]
    show: bool,

    /// More logs, can be repeated
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    logger::setup_logging(args.verbose);

    if let Err(err) = run(args).await {
        error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let semester = Semester::load(&args.description).with_context(|| {
        format!(
            "Can't build the semester from {}",
            args.description.display()
        )
    })?;
    info!(number = semester.number, "Semester loaded");

    let mut list: Box<dyn TaskList> = match (&args.token, args.dry_run) {
        (_, true) => Box::new(Preview::default()),
        (Some(token), false) => {
            Box::new(Todoist::new(token.clone()).context("Can't create the Todoist client")?)
        }
        (None, false) => {
            display::semester(&semester, None);
            return Ok(());
        }
    };

    if args.show {
        display::semester(&semester, Some(args.category));
    }

    let policy = if args.clear {
        RootPolicy::Clear
    } else if args.keep {
        RootPolicy::Keep
    } else {
        RootPolicy::Ask
    };

    let root_id = Planner::ensure_root(list.as_mut(), &args.root_project, policy)
        .await
        .context("Can't prepare the root project")?;

    let today = Local::now().date_naive();
    let report = Planner::new(&semester, args.category, today)
        .sync(list.as_mut(), &root_id)
        .await
        .with_context(|| format!("Can't synchronise the {}", args.category.name()))?;

    println!(
        "{} subjects and {} {} planned in « {} »",
        report.groups,
        report.tasks,
        args.category.name(),
        args.root_project
    );

    Ok(())
}

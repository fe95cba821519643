use carebook::api::{CarebookApi, CarebookPaths, ConfigAction, ListOptions};
use carebook::config::CarebookConfig;
use carebook::error::{CareError, Result};
use carebook::model::Collection;
use carebook::query::{FilterState, SortDirection, SortField, SortState};
use carebook::store::fs::FileStore;
use chrono::NaiveDate;
use clap::Parser;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod args;
mod print;
use args::{Cli, Commands};
use print::{print_config, print_messages, print_options, print_page, print_record};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: CarebookApi<FileStore>,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Reports {
            search,
            form_type,
            from,
            to,
            sort,
            desc,
            page,
        }) => {
            let filter = FilterState::default()
                .with_text(search.unwrap_or_default())
                .with_form_type(form_type.as_deref().unwrap_or(""));
            let filter = with_range(filter, from, to)?;
            handle_list(&ctx, Collection::Reports, filter, sort, desc, page)
        }
        Some(Commands::Patients {
            search,
            diagnosis,
            status,
            from,
            to,
            sort,
            desc,
            page,
        }) => {
            let filter = FilterState::default()
                .with_text(search.unwrap_or_default())
                .with_diagnosis(diagnosis.as_deref().unwrap_or(""))
                .with_status(status);
            let filter = with_range(filter, from, to)?;
            handle_list(&ctx, Collection::Patients, filter, sort, desc, page)
        }
        Some(Commands::Show { collection, id }) => handle_show(&ctx, collection, &id),
        Some(Commands::Delete {
            collection,
            id,
            code,
        }) => handle_delete(&mut ctx, collection, &id, &code),
        Some(Commands::Route { category, id }) => handle_route(&ctx, &category, &id),
        Some(Commands::Diagnoses) => handle_diagnoses(&ctx),
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
        None => handle_list(&ctx, Collection::Reports, FilterState::default(), None, false, 1),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("carebook=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("carebook=warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = match cli.dir.clone() {
        Some(dir) => dir,
        None => match std::env::var_os("CAREBOOK_HOME") {
            Some(home) => PathBuf::from(home),
            None => ProjectDirs::from("org", "carebook", "carebook")
                .ok_or_else(|| CareError::Api("Could not determine data dir".to_string()))?
                .data_dir()
                .to_path_buf(),
        },
    };

    let config = CarebookConfig::load(&data_dir)?;
    let store = FileStore::new(data_dir.clone());
    let api = CarebookApi::new(store, config, CarebookPaths { data_dir });
    Ok(AppContext { api })
}

fn with_range(
    filter: FilterState,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<FilterState> {
    if let (Some(start), Some(end)) = (from, to) {
        if start > end {
            return Err(CareError::InvalidInput(format!(
                "--from {} is after --to {}",
                start, end
            )));
        }
    }
    Ok(filter.with_dates(from, to))
}

fn handle_list(
    ctx: &AppContext,
    collection: Collection,
    filter: FilterState,
    sort: Option<SortField>,
    desc: bool,
    page: usize,
) -> Result<()> {
    let direction = if desc {
        SortDirection::Desc
    } else {
        SortDirection::Asc
    };
    let options = ListOptions {
        filter,
        sort: sort.map(|field| SortState::new(field, direction)),
        page,
    };
    let result = ctx.api.list(collection, &options)?;
    if let Some(page) = &result.page {
        print_page(page, ctx.api.current_config().page_size);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_show(ctx: &AppContext, collection: Collection, id: &str) -> Result<()> {
    let result = ctx.api.show(collection, id)?;
    for record in &result.records {
        print_record(record, result.route.as_deref());
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, collection: Collection, id: &str, code: &str) -> Result<()> {
    let result = ctx.api.delete(collection, id, code)?;
    print_messages(&result.messages);
    if result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

fn handle_route(ctx: &AppContext, category: &str, id: &str) -> Result<()> {
    let result = ctx.api.route(category, id);
    if let Some(route) = &result.route {
        println!("{}", route);
    }
    Ok(())
}

fn handle_diagnoses(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.diagnoses()?;
    print_options(&result.options);
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };

    let result = ctx.api.config(action)?;
    if let (Some(config), true) = (&result.config, result.messages.is_empty()) {
        print_config(config);
    }
    print_messages(&result.messages);
    Ok(())
}

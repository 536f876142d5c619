/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Command-line front end: activate a view, tweak it, print or export it.

use bpaf::Bpaf;
use comorbidities_explorer::config::{ExplorerConfig, default_config_path};
use comorbidities_explorer::layout::LayoutWorker;
use comorbidities_explorer::views::{DataRepository, JsonDirSource, ViewRegistry};
use comorbidities_explorer::{ExplorerSession, HistoryManager, LoadOutcome, ParamValue};
use log::{error, info, warn};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
/// Explore comorbidity networks from the command line
struct Options {
    /// Directory holding one JSON file per collection
    #[bpaf(long, argument("DIR"))]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to the user config directory)
    #[bpaf(long, argument("FILE"))]
    config: Option<PathBuf>,

    /// View to open: diseases, patient_subgroups, genes, drugs, patients, studies
    #[bpaf(long, argument("VIEW"))]
    view: Option<String>,

    /// Id forwarded to the view, repeatable
    #[bpaf(long("id"), argument("ID"))]
    ids: Vec<String>,

    /// Override a view parameter, repeatable
    #[bpaf(long("set"), argument("NAME=VALUE"))]
    set: Vec<String>,

    /// Select a node by id, repeatable
    #[bpaf(long, argument("NODE"))]
    select: Vec<String>,

    /// Follow the selection into the next view
    #[bpaf(long, switch)]
    follow: bool,

    /// Fuzzy search the visible nodes
    #[bpaf(long, argument("QUERY"))]
    search: Option<String>,

    /// Write the visible graph as JSON
    #[bpaf(long, argument("FILE"))]
    export: Option<PathBuf>,
}

type Explorer = HistoryManager<LayoutWorker>;

async fn open(history: &mut Explorer, view: &str, ids: Vec<String>) -> Result<(), Box<dyn Error>> {
    let pending = history
        .switch_view(view, ids)
        .ok_or_else(|| format!("unknown view {view}"))?;
    match history.navigate(pending).await {
        LoadOutcome::Applied(report) => {
            info!(
                "Loaded {view}: {} nodes, {} edges ({} skipped)",
                report.nodes, report.edges, report.skipped_edges
            );
            Ok(())
        },
        LoadOutcome::Stale => Err(format!("load of {view} was superseded").into()),
        LoadOutcome::Failed(e) => Err(e.into()),
    }
}

fn print_summary(history: &Explorer) {
    let session = history.session();
    let (nodes, edges) = session.visible_counts();
    println!(
        "{}: {nodes} nodes, {edges} edges visible",
        session.view_name().unwrap_or("?")
    );
    for (name, value) in session.parameters() {
        println!("  {name} = {value}");
    }
    let selected = session.selected_node_ids();
    if !selected.is_empty() {
        println!("  selected: {}", selected.join(", "));
    }
    if let Some(request) = session.next_view_request() {
        println!("  next: {} ({})", request.target_view, request.params.join(", "));
    }
}

async fn run(options: Options) -> Result<(), Box<dyn Error>> {
    let config = match &options.config {
        Some(path) => ExplorerConfig::load(path)?,
        None => ExplorerConfig::load_or_default(&default_config_path())?,
    };
    let data_dir = options
        .data_dir
        .clone()
        .or_else(|| config.data_dir.clone())
        .ok_or("no data directory: pass --data-dir or set data_dir in the config")?;

    let repository = Arc::new(DataRepository::new(Arc::new(JsonDirSource::new(data_dir))));
    let registry = ViewRegistry::standard(repository, &config);
    let session = ExplorerSession::new(LayoutWorker::new(config.layout.clone()));
    let mut history = HistoryManager::new(registry, session);

    let view = options.view.clone().unwrap_or_else(|| config.initial_view.clone());
    open(&mut history, &view, options.ids.clone()).await?;

    for assignment in &options.set {
        let Some((name, value)) = assignment.split_once('=') else {
            warn!("Ignoring malformed --set {assignment}, expected NAME=VALUE");
            continue;
        };
        history
            .session_mut()
            .set_parameter(name.trim(), ParamValue::parse(value));
    }
    if !options.select.is_empty() {
        history.session_mut().add_selection_by_ids(&options.select);
    }

    if options.follow {
        let request = history
            .session()
            .next_view_request()
            .ok_or("the selection does not lead to another view")?;
        print_summary(&history);
        open(&mut history, request.target_view, request.params).await?;
    }

    print_summary(&history);

    if let Some(query) = &options.search {
        for id in history.session().search(query) {
            println!("  match: {id}");
        }
    }

    if let Some(path) = &options.export {
        if !history
            .session_mut()
            .layout_mut()
            .wait(Duration::from_secs(10))
        {
            warn!("Layout did not finish, exporting without positions");
        }
        history.session().snapshot().save(path)?;
        info!("Exported visible graph to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let options = options().run();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start the runtime: {e}");
            return ExitCode::FAILURE;
        },
    };

    match runtime.block_on(run(options)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        },
    }
}

//! Crossdash CLI: run the activity dashboard over a JSON event file
//!
//! Selections given on the command line are applied in order (type,
//! author, view, days) before the requested output is printed.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use crossdash::stats::Role;
use crossdash::{
    ActivityDashboard, ActivityType, DashboardConfig, DisplayPolicy, Granularity, RecordStore, TallySort,
    ViewerContext,
};

#[derive(Parser)]
#[command(name = "crossdash", version, about = "Crossdash activity dashboard CLI")]
struct Cli {
    /// JSON array of activity events
    events: String,

    /// YAML or JSON dashboard configuration
    #[arg(long, global = true, env = "CROSSDASH_CONFIG")]
    config: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(flatten)]
    viewer: ViewerArgs,

    #[command(flatten)]
    selection: SelectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ViewerArgs {
    /// Identity id of the viewer
    #[arg(long, default_value = "", global = true)]
    viewer_id: String,

    /// Display name of the viewer
    #[arg(long, default_value = "", global = true)]
    viewer_name: String,

    #[arg(long, default_value = "member", global = true)]
    role: RoleArg,

    /// Show pseudonyms even to elevated viewers
    #[arg(long, global = true)]
    hide_names: bool,

    /// Drop managers from statistics
    #[arg(long, global = true)]
    hide_managers: bool,
}

#[derive(clap::Args)]
struct SelectionArgs {
    /// Select an activity type
    #[arg(long = "type", global = true)]
    activity: Option<TypeArg>,

    /// Select an author by actor id
    #[arg(long, global = true)]
    author: Option<String>,

    /// Select a view ("Deleted" for records without one)
    #[arg(long, global = true)]
    view: Option<String>,

    /// First day of the timeline brush (YYYY-MM-DD)
    #[arg(long, global = true)]
    from: Option<NaiveDate>,

    /// Last day of the timeline brush (YYYY-MM-DD)
    #[arg(long, global = true)]
    to: Option<NaiveDate>,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum TypeArg {
    Read,
    Modified,
    Created,
}

impl From<TypeArg> for ActivityType {
    fn from(arg: TypeArg) -> Self {
        match arg {
            TypeArg::Read => ActivityType::Read,
            TypeArg::Modified => ActivityType::Modified,
            TypeArg::Created => ActivityType::Created,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum RoleArg {
    Member,
    Manager,
    Administrator,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Member => Role::Member,
            RoleArg::Manager => Role::Manager,
            RoleArg::Administrator => Role::Administrator,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum SortArg {
    Total,
    Read,
    Modified,
    Created,
    Name,
}

impl From<SortArg> for TallySort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Total => TallySort::Total,
            SortArg::Read => TallySort::Read,
            SortArg::Modified => TallySort::Modified,
            SortArg::Created => TallySort::Created,
            SortArg::Name => TallySort::Name,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum GranularityArg {
    Day,
    Week,
    Month,
}

impl From<GranularityArg> for Granularity {
    fn from(arg: GranularityArg) -> Self {
        match arg {
            GranularityArg::Day => Granularity::Day,
            GranularityArg::Week => Granularity::Week,
            GranularityArg::Month => Granularity::Month,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show every panel's rows
    Panels,
    /// Per-identity statistics and averages
    Stats {
        /// Row ordering
        #[arg(long)]
        sort: Option<SortArg>,

        /// Maximum number of rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Timeline rows
    Timeline {
        #[arg(long, default_value = "day")]
        granularity: GranularityArg,
    },
    /// Actor network of the filtered read records
    Network,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive("crossdash=warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DashboardConfig::from_path(path).with_context(|| format!("loading config {}", path))?,
        None => DashboardConfig::default(),
    };
    let json = std::fs::read_to_string(&cli.events).with_context(|| format!("reading events {}", cli.events))?;
    let store = RecordStore::from_json_str(&json, &config.buckets)?;
    let mut dashboard = ActivityDashboard::build(store.into_shared(), &config)?;

    apply_selection(&mut dashboard, &cli.selection)?;

    let viewer = ViewerContext::new(
        cli.viewer.viewer_id.clone(),
        cli.viewer.role.into(),
        cli.viewer.viewer_name.clone(),
    );
    let mut policy = config.policy;
    if cli.viewer.hide_names {
        policy.set_hide_names(&viewer, true);
    }
    if cli.viewer.hide_managers {
        policy.set_hide_managers(&viewer, true);
    }

    match cli.command {
        Commands::Panels => run_panels(&dashboard, &cli.format),
        Commands::Stats { sort, limit } => run_stats(&dashboard, &viewer, &policy, sort, limit, &cli.format),
        Commands::Timeline { granularity } => run_timeline(&dashboard, granularity.into(), &cli.format),
        Commands::Network => run_network(&dashboard, &viewer, &policy, &cli.format),
    }
}

fn apply_selection(dashboard: &mut ActivityDashboard, selection: &SelectionArgs) -> anyhow::Result<()> {
    if let Some(activity) = selection.activity {
        dashboard.select_type(activity.into())?;
    }
    if let Some(author) = &selection.author {
        dashboard.select_author(author)?;
    }
    if let Some(view) = &selection.view {
        dashboard.select_view(view)?;
    }
    match (selection.from, selection.to) {
        (None, None) => {}
        (from, to) => {
            let from = from.unwrap_or(NaiveDate::MIN);
            let to = to.unwrap_or(NaiveDate::MAX);
            dashboard.select_days(from, to)?;
        }
    }
    Ok(())
}

fn run_panels(dashboard: &ActivityDashboard, format: &OutputFormat) -> anyhow::Result<()> {
    let view = dashboard.dashboard().view();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        OutputFormat::Table => {
            println!("{} of {} record(s) pass the filters", view.filtered, view.total);
            for panel in &view.panels {
                println!("\n{} (selection: {})", panel.name, panel.selection);
                if panel.rows.is_empty() {
                    println!("(no rows)");
                    continue;
                }
                let mut table = new_table(&["key", "read", "modified", "created", "total"]);
                for row in &panel.rows {
                    let mut cells = vec![row.key.to_string()];
                    for field in ["read", "modified", "created", "total"] {
                        cells.push(format_table_value(&row.value[field]));
                    }
                    table.add_row(cells);
                }
                println!("{}", table);
            }
        }
    }
    Ok(())
}

fn run_stats(
    dashboard: &ActivityDashboard,
    viewer: &ViewerContext,
    policy: &DisplayPolicy,
    sort: Option<SortArg>,
    limit: Option<usize>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let roster = dashboard.config().roster();
    let stats = dashboard.statistics(viewer, policy, &roster);
    let sort = sort.map(TallySort::from).unwrap_or(dashboard.config().ranking_sort);
    let limit = limit.unwrap_or(dashboard.config().ranking_limit);
    let ranking = dashboard.ranking(viewer, policy, &roster, sort, limit);

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({ "statistics": stats, "ranking": ranking });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Table => {
            let mut table = new_table(&["identity", "read", "modified", "created", "total"]);
            for row in &ranking {
                table.add_row(vec![
                    row.display.clone(),
                    row.counts.read.to_string(),
                    row.counts.modified.to_string(),
                    row.counts.created.to_string(),
                    row.counts.total.to_string(),
                ]);
            }
            println!("{}", table);
            println!("{} identit(y/ies)", stats.distinct_identities);
            println!("Selected total: {}", stats.selected_total.total);
            println!(
                "Class average:  read {:.2}  modified {:.2}  created {:.2}  total {:.2}",
                stats.class_average.read, stats.class_average.modified, stats.class_average.created, stats.class_average.total
            );
            if let Some(avg) = stats.view_average {
                println!(
                    "View average:   read {:.2}  modified {:.2}  created {:.2}  total {:.2}",
                    avg.read, avg.modified, avg.created, avg.total
                );
            }
        }
    }
    Ok(())
}

fn run_timeline(dashboard: &ActivityDashboard, granularity: Granularity, format: &OutputFormat) -> anyhow::Result<()> {
    let rows = dashboard.timeline(granularity)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Table => {
            let mut table = new_table(&["bucket", "read", "modified", "created", "total"]);
            for row in &rows {
                table.add_row(vec![
                    row.key.to_string(),
                    row.value.read.to_string(),
                    row.value.modified.to_string(),
                    row.value.created.to_string(),
                    row.value.total.to_string(),
                ]);
            }
            println!("{}", table);
            println!("{} row(s)", rows.len());
        }
    }
    Ok(())
}

fn run_network(
    dashboard: &ActivityDashboard,
    viewer: &ViewerContext,
    policy: &DisplayPolicy,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let network = dashboard.network(viewer, policy);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&network)?);
        }
        OutputFormat::Table => {
            let mut nodes = new_table(&["node", "weight", "size", "cluster"]);
            for node in &network.nodes {
                nodes.add_row(vec![
                    node.label.clone(),
                    node.weight.to_string(),
                    format!("{:.1}", node.size),
                    node.cluster.to_string(),
                ]);
            }
            println!("{}", nodes);

            let arrow = if network.directional { "->" } else { "--" };
            let mut edges = new_table(&["edge", "count", "weight"]);
            for edge in &network.edges {
                edges.add_row(vec![
                    format!("{} {} {}", edge.source, arrow, edge.target),
                    edge.count.to_string(),
                    edge.weight.to_string(),
                ]);
            }
            println!("{}", edges);
            println!("{} node(s), {} edge(s)", network.node_count(), network.edge_count());
        }
    }
    Ok(())
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

fn format_table_value(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => "".to_string(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => serde_json::to_string(v).unwrap_or_default(),
    }
}

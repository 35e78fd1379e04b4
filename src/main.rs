use crossdash::stats::Role;
use crossdash::{
    ActivityDashboard, ActivityType, BucketConfig, DashboardConfig, DashboardEvent, DashboardView, DisplayPolicy,
    Granularity, RecordStore, ViewerContext,
};

const SAMPLE: &str = r#"[
  {"id": 1, "type": "read",     "when": 1710064800000, "from": "Alice", "fromId": "u1", "fromPseudo": "Otter",
   "to": "Bob", "toPseudo": "Heron", "view": "Math"},
  {"id": 2, "type": "read",     "when": 1710151200000, "from": "Bob",   "fromId": "u2", "fromPseudo": "Heron",
   "to": "Alice", "toPseudo": "Otter", "view": "Math"},
  {"id": 3, "type": "created",  "when": 1710237600000, "from": "Alice", "fromId": "u1", "fromPseudo": "Otter",
   "view": "Art"},
  {"id": 4, "type": "modified", "when": 1710669600000, "from": "Carol", "fromId": "u3", "fromPseudo": "Lynx"},
  {"id": 5, "type": "read",     "when": 1710756000000, "from": "Carol", "fromId": "u3", "fromPseudo": "Lynx",
   "to": "Alice", "toPseudo": "Otter", "view": "Art"},
  {"id": 6, "type": "created",  "when": 1711360800000, "from": "Bob",   "fromId": "u2", "fromPseudo": "Heron",
   "view": "Math"}
]"#;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Crossdash v{}", crossdash::version());
    println!("==========================================");
    println!();

    let config = DashboardConfig::default();
    let store = RecordStore::from_json_str(SAMPLE, &BucketConfig::default())?;
    let mut dashboard = ActivityDashboard::build(store.into_shared(), &config)?;
    dashboard.subscribe(|event: &DashboardEvent, view: &DashboardView| {
        println!("  -> {} change(s), {}/{} records live", event.changes().len(), view.filtered, view.total);
    });

    demo_panels(&mut dashboard)?;
    demo_statistics(&dashboard);
    demo_network(&dashboard);

    Ok(())
}

fn demo_panels(dashboard: &mut ActivityDashboard) -> anyhow::Result<()> {
    println!("=== Demo 1: Cross-filtered panels ===");
    print_view(&dashboard.dashboard().view());

    println!("\nSelecting type 'read'");
    dashboard.select_type(ActivityType::Read)?;
    print_view(&dashboard.dashboard().view());

    println!("\nWeekly timeline:");
    for row in dashboard.timeline(Granularity::Week)? {
        println!("  {}  {:>3} activities", row.key, row.value.total);
    }
    Ok(())
}

fn demo_statistics(dashboard: &ActivityDashboard) {
    println!("\n=== Demo 2: Statistics ===");
    let viewer = ViewerContext::new("u1", Role::Member, "Alice");
    let policy = DisplayPolicy::default();
    let stats = dashboard.statistics(&viewer, &policy, &dashboard.config().roster());

    for row in &stats.rows {
        println!(
            "  {:<8} read {:>2}  modified {:>2}  created {:>2}",
            row.display, row.counts.read, row.counts.modified, row.counts.created
        );
    }
    println!("  Selected total: {}", stats.selected_total.total);
    println!("  Class average:  {:.2}", stats.class_average.total);
}

fn demo_network(dashboard: &ActivityDashboard) {
    println!("\n=== Demo 3: Actor network ===");
    let viewer = ViewerContext::new("admin", Role::Administrator, "Admin");
    let network = dashboard.network(&viewer, &DisplayPolicy::default());

    for node in &network.nodes {
        println!("  ({}) weight {} size {:.1} cluster {}", node.label, node.weight, node.size, node.cluster);
    }
    for edge in &network.edges {
        println!("  {} -- {}  weight {}", edge.source, edge.target, edge.weight);
    }
}

fn print_view(view: &DashboardView) {
    println!("  {}/{} records pass the filters", view.filtered, view.total);
    for panel in &view.panels {
        let keys: Vec<String> = panel.rows.iter().map(|r| r.key.to_string()).collect();
        println!("  [{}] selection: {}  rows: {}", panel.name, panel.selection, keys.join(", "));
    }
}

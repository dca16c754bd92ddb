use clap::Parser;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use talpa::{
    build_executor, source_for, ExecutionStrategy, PageRegistry, SearchIndex, SearchSession,
    SessionConfig, INDEX_ARTIFACT, PAGES_ARTIFACT,
};

mod cli;
use cli::{Cli, Commands};

/// Inner width of the inspect boxes.
const W: usize = 60;

/// How long a CLI query may spend on loading plus execution.
const QUERY_DEADLINE: Duration = Duration::from_secs(30);

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Search {
            site,
            query,
            docs_version,
            worker,
            limit,
        } => run_search(&site, &query, &docs_version, worker, limit),
        Commands::Inspect { site } => run_inspect(&site),
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn run_search(
    site: &str,
    query: &str,
    version: &str,
    worker: bool,
    limit: usize,
) -> Result<(), String> {
    let source = source_for(site).map_err(|e| e.to_string())?;
    let pages = source.fetch(site, PAGES_ARTIFACT)?;
    let registry =
        PageRegistry::from_json_slice(&pages).map_err(|e| format!("{}: {}", PAGES_ARTIFACT, e))?;

    let strategy = if worker {
        ExecutionStrategy::Worker
    } else {
        ExecutionStrategy::InThread
    };
    let executor = build_executor(strategy, source, site);

    let mut session = SearchSession::new(
        registry,
        executor,
        SessionConfig {
            base_path: site.to_string(),
            version: version.to_string(),
        },
    );

    let started = Instant::now();
    session.set_query(query);
    if !session.wait_idle(QUERY_DEADLINE) {
        return Err(format!(
            "no answer after {}s; giving up",
            QUERY_DEADLINE.as_secs()
        ));
    }
    if let Some(err) = session.last_error() {
        return Err(err.to_string());
    }
    let elapsed = started.elapsed();

    let state = session.state();
    let total = state.results().len();
    if total == 0 {
        println!(
            "No pages match \"{}\" in {} ({:.1}ms)",
            query,
            version,
            elapsed.as_secs_f64() * 1000.0
        );
        return Ok(());
    }

    println!(
        "✓ {} result{} for \"{}\" in {} ({:.1}ms)",
        total,
        if total == 1 { "" } else { "s" },
        query,
        version,
        elapsed.as_secs_f64() * 1000.0
    );
    println!();
    for (position, page) in state.results().iter().take(limit).enumerate() {
        let marker = if state.selected() == Some(position) {
            "▸"
        } else {
            " "
        };
        println!(
            "{} {:>2}. {:<34} {}{}",
            marker,
            position + 1,
            page.title,
            site,
            page.path
        );
    }
    if total > limit {
        println!("  … {} more not shown", total - limit);
    }

    Ok(())
}

fn run_inspect(site: &str) -> Result<(), String> {
    let source = source_for(site).map_err(|e| e.to_string())?;

    let index_bytes = source.fetch(site, INDEX_ARTIFACT)?;
    let index = SearchIndex::from_json_slice(&index_bytes)
        .map_err(|e| format!("{}: {}", INDEX_ARTIFACT, e))?;

    let pages_bytes = source.fetch(site, PAGES_ARTIFACT)?;
    let registry = PageRegistry::from_json_slice(&pages_bytes)
        .map_err(|e| format!("{}: {}", PAGES_ARTIFACT, e))?;

    let posting_total: usize = index.terms.values().map(Vec::len).sum();
    let dangling = index
        .terms
        .values()
        .flatten()
        .filter(|posting| registry.get(&posting.id).is_none())
        .count();

    let mut versions: BTreeMap<&str, usize> = BTreeMap::new();
    for page in registry.entries() {
        *versions.entry(page.version.as_str()).or_insert(0) += 1;
    }
    let versions_line = versions
        .iter()
        .map(|(version, count)| format!("{} ×{}", version, count))
        .collect::<Vec<_>>()
        .join(", ");

    let mut heaviest: Vec<(&str, usize)> = index
        .terms
        .iter()
        .map(|(term, postings)| (term.as_str(), postings.len()))
        .collect();
    heaviest.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    let heaviest_line = heaviest
        .iter()
        .take(5)
        .map(|(term, count)| format!("{} ({})", term, count))
        .collect::<Vec<_>>()
        .join(", ");

    println!();
    println!("╔{}╗", "═".repeat(W));
    println!("║{:^w$}║", "SITE SEARCH ARTIFACTS", w = W);
    println!("╠{}╣", "═".repeat(W));
    println!("║  Site:     {:<46}  ║", truncate(site, 46));
    println!("╚{}╝", "═".repeat(W));
    println!();

    println!("┌─ INDEX {}┐", "─".repeat(W - 9));
    println!("│  artifact:  {:<w$}│", INDEX_ARTIFACT, w = W - 14);
    println!("│  docs:      {:<w$}│", index.doc_count, w = W - 14);
    println!("│  terms:     {:<w$}│", index.term_count(), w = W - 14);
    println!("│  postings:  {:<w$}│", posting_total, w = W - 14);
    println!(
        "│  heaviest:  {:<w$}│",
        truncate(&heaviest_line, W - 14),
        w = W - 14
    );
    println!("└{}┘", "─".repeat(W));
    println!();

    println!("┌─ PAGES {}┐", "─".repeat(W - 9));
    println!("│  artifact:  {:<w$}│", PAGES_ARTIFACT, w = W - 14);
    println!("│  pages:     {:<w$}│", registry.len(), w = W - 14);
    println!(
        "│  versions:  {:<w$}│",
        truncate(&versions_line, W - 14),
        w = W - 14
    );
    println!("└{}┘", "─".repeat(W));
    println!();

    if dangling == 0 {
        println!("✓ every posting resolves to a registered page");
    } else {
        println!(
            "⚠ {} posting{} reference pages missing from the registry",
            dangling,
            if dangling == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

/// Keep the tail of over-long values so paths stay recognizable.
fn truncate(text: &str, max: usize) -> String {
    let count = text.chars().count();
    if count <= max {
        return text.to_string();
    }
    let tail: String = text.chars().skip(count - (max - 1)).collect();
    format!("…{}", tail)
}

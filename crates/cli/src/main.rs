use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use eventdesk_catalog::{
    Event, EventCategory, EventDraft, EventFilters, EventQuery, SortKey, SortOrder, hhmm,
};
use eventdesk_client::{
    ClientConfig, EventStore, HttpEventGateway, SearchOrchestrator, SearchState,
};
use eventdesk_core::EventId;

mod render;

#[derive(Parser)]
#[command(name = "eventdesk")]
#[command(about = "Browse and manage events on an event-manager backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Backend base URL (overrides EVENTDESK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List events, filtered and sorted locally
    List(ListArgs),
    /// Show one event
    Show {
        /// Event ID
        id: EventId,
    },
    /// Create an event
    Create(DraftArgs),
    /// Update an event; omitted fields keep their current value
    Update {
        /// Event ID
        id: EventId,
        #[command(flatten)]
        fields: UpdateArgs,
    },
    /// Delete an event
    Delete {
        /// Event ID
        id: EventId,
    },
    /// Events after today
    Upcoming {
        /// Restrict to a category (includes today)
        #[arg(short, long)]
        category: Option<EventCategory>,
    },
    /// Events of one category
    Category {
        category: EventCategory,
    },
    /// Events between two dates (inclusive)
    Range {
        from: NaiveDate,
        to: NaiveDate,
    },
    /// Events whose organizer contains the given text
    Organizer {
        organizer: String,
    },
    /// Remote search by name
    Search {
        name: String,
    },
    /// Read search terms from stdin, one per line, through the debounced search
    LiveSearch {
        /// Quiet interval in milliseconds (overrides EVENTDESK_SEARCH_DEBOUNCE_MS)
        #[arg(long)]
        debounce_ms: Option<u64>,
    },
}

#[derive(Args)]
struct ListArgs {
    /// Free text matched against name, description, location and organizer
    #[arg(short, long)]
    query: Option<String>,
    #[arg(short, long)]
    category: Option<EventCategory>,
    #[arg(long)]
    organizer: Option<String>,
    #[arg(long)]
    location: Option<String>,
    /// Earliest event date (yyyy-MM-dd)
    #[arg(long)]
    from: Option<String>,
    /// Latest event date (yyyy-MM-dd)
    #[arg(long)]
    to: Option<String>,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    /// eventDate, name, organizer, capacity or price
    #[arg(short, long, default_value = "eventDate")]
    sort_by: SortKey,
    /// Sort descending
    #[arg(long)]
    desc: bool,
}

impl ListArgs {
    fn into_query(self) -> EventQuery {
        let filters = EventFilters {
            category: self.category,
            organizer: self.organizer,
            location: self.location,
            start_date: self.from,
            end_date: self.to,
            min_price: self.min_price,
            max_price: self.max_price,
        };
        let order = if self.desc { SortOrder::Desc } else { SortOrder::Asc };
        let query = EventQuery::new()
            .with_filters(filters)
            .sorted_by(self.sort_by, order);
        match self.query {
            Some(text) => query.with_text(text),
            None => query,
        }
    }
}

#[derive(Args)]
struct DraftArgs {
    #[arg(long)]
    name: String,
    /// Event date (yyyy-MM-dd)
    #[arg(long)]
    date: NaiveDate,
    /// Start time (HH:mm)
    #[arg(long, value_parser = parse_time)]
    start: NaiveTime,
    /// End time (HH:mm)
    #[arg(long, value_parser = parse_time)]
    end: NaiveTime,
    #[arg(long)]
    location: String,
    #[arg(long)]
    organizer: String,
    #[arg(long)]
    capacity: u32,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    category: Option<EventCategory>,
}

impl From<DraftArgs> for EventDraft {
    fn from(args: DraftArgs) -> Self {
        EventDraft {
            name: args.name,
            event_date: args.date,
            start_time: args.start,
            end_time: args.end,
            location: args.location,
            organizer: args.organizer,
            capacity: args.capacity,
            description: args.description,
            price: args.price,
            category: args.category,
        }
    }
}

#[derive(Args)]
struct UpdateArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_time)]
    start: Option<NaiveTime>,
    #[arg(long, value_parser = parse_time)]
    end: Option<NaiveTime>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    organizer: Option<String>,
    #[arg(long)]
    capacity: Option<u32>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<f64>,
    #[arg(long)]
    category: Option<EventCategory>,
}

impl UpdateArgs {
    fn apply(self, mut draft: EventDraft) -> EventDraft {
        if let Some(v) = self.name {
            draft.name = v;
        }
        if let Some(v) = self.date {
            draft.event_date = v;
        }
        if let Some(v) = self.start {
            draft.start_time = v;
        }
        if let Some(v) = self.end {
            draft.end_time = v;
        }
        if let Some(v) = self.location {
            draft.location = v;
        }
        if let Some(v) = self.organizer {
            draft.organizer = v;
        }
        if let Some(v) = self.capacity {
            draft.capacity = v;
        }
        if self.description.is_some() {
            draft.description = self.description;
        }
        if self.price.is_some() {
            draft.price = self.price;
        }
        if self.category.is_some() {
            draft.category = self.category;
        }
        draft
    }
}

fn parse_time(raw: &str) -> Result<NaiveTime, String> {
    hhmm::parse(raw).ok_or_else(|| format!("invalid time '{raw}', expected HH:mm"))
}

struct Output {
    json: bool,
    today: NaiveDate,
}

impl Output {
    fn events(&self, events: &[Event]) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(events)?);
        } else {
            println!("{}", render::event_list(events, self.today));
        }
        Ok(())
    }

    fn event(&self, event: &Event) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(event)?);
        } else {
            println!("{}", render::event_detail(event, self.today));
        }
        Ok(())
    }

    fn search_state(&self, state: &SearchState) {
        match state {
            SearchState::Idle | SearchState::Pending { .. } => {}
            SearchState::Ready { term, events } => {
                if self.json {
                    match serde_json::to_string(events) {
                        Ok(body) => println!("{body}"),
                        Err(e) => eprintln!("error: {e}"),
                    }
                } else {
                    println!("== {term}: {} result(s)", events.len());
                    println!("{}", render::event_list(events, self.today));
                }
            }
            SearchState::Failed { term, message } => {
                eprintln!("search '{term}' failed: {message}");
            }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    eventdesk_observability::init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config = config.with_api_url(url);
    }
    tracing::debug!(api_url = %config.api_url, "client configured");

    let out = Output {
        json: cli.json,
        today: Local::now().date_naive(),
    };
    let gateway = Arc::new(HttpEventGateway::new(&config)?);
    let mut store = EventStore::new(Arc::clone(&gateway));

    match cli.command {
        Commands::List(args) => {
            store.load().await.context("failed to load events")?;
            out.events(&store.view(&args.into_query()))?;
        }
        Commands::Show { id } => {
            out.event(&store.get(id).await?)?;
        }
        Commands::Create(args) => {
            let created = store.create(&args.into()).await?;
            out.event(&created)?;
        }
        Commands::Update { id, fields } => {
            let current = store.get(id).await?;
            let updated = store.update(id, &fields.apply(current.to_draft())).await?;
            out.event(&updated)?;
        }
        Commands::Delete { id } => {
            store.delete(id).await?;
            if !out.json {
                println!("deleted event {id}");
            }
        }
        Commands::Upcoming { category } => {
            let events = match category {
                Some(c) => store.upcoming_by_category(c).await?,
                None => store.upcoming().await?,
            };
            out.events(&events)?;
        }
        Commands::Category { category } => {
            out.events(&store.by_category(category).await?)?;
        }
        Commands::Range { from, to } => {
            if from > to {
                bail!("range start {from} is after end {to}");
            }
            out.events(&store.by_date_range(from, to).await?)?;
        }
        Commands::Organizer { organizer } => {
            out.events(&store.by_organizer(&organizer).await?)?;
        }
        Commands::Search { name } => {
            if name.trim().is_empty() {
                store.load().await?;
            }
            out.events(&store.search(&name).await?)?;
        }
        Commands::LiveSearch { debounce_ms } => {
            let quiet = debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(config.search_debounce);
            live_search(gateway, quiet, out).await?;
        }
    }

    Ok(())
}

async fn live_search(gateway: Arc<HttpEventGateway>, quiet: Duration, out: Output) -> Result<()> {
    let search = SearchOrchestrator::new(gateway, quiet);
    let mut rx = search.subscribe();

    let printer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            out.search_state(&state);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last = None;
    while let Some(line) = lines.next_line().await? {
        last = search.submit(&line);
    }

    if let Some(handle) = last {
        handle.fired().await;
    }
    drop(search);
    printer.await.context("search printer task failed")?;
    Ok(())
}

//! atoll-travel command line
//!
//! ```bash
//! atoll-travel currency list                     # Supported display currencies
//! atoll-travel currency set EUR                  # Persist the display currency
//! atoll-travel currency format 1250              # Convert from USD and format
//! atoll-travel geocode search "Maafushi"         # Search Maldivian places
//! atoll-travel geocode reverse 3.9412 73.4885    # Island and atoll at a point
//! atoll-travel listings properties --sort price-low --max-price 300
//! atoll-travel booking nights 2025-03-01 2025-03-05 --price-per-night 120
//! ```

use anyhow::{Context, Result};
use atoll_travel::backend::{PackageField, PropertyField};
use atoll_travel::currency::{convert_between, find_currency};
use atoll_travel::filters::{FilterConfig, FilterState, FilterUpdate, SortBy, apply_filters};
use atoll_travel::geocoding::{GeocodingClient, LocationResolver, SearchSession, select_place};
use atoll_travel::{
    AppConfig, BackendClient, CurrencyStore, FormatOptions, PersistentStore, SessionRole,
    SessionTokens, booking, logging,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Parser)]
#[command(name = "atoll-travel", version)]
#[command(about = "Maldives travel listings, currencies and island lookup", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display currency selection and conversion
    #[command(subcommand)]
    Currency(CurrencyCommand),
    /// Island and atoll lookup
    #[command(subcommand)]
    Geocode(GeocodeCommand),
    /// Filter and sort backend listings
    #[command(subcommand)]
    Listings(ListingsCommand),
    /// Stay length and price
    #[command(subcommand)]
    Booking(BookingCommand),
    /// Stored backend session tokens
    #[command(subcommand)]
    Session(SessionCommand),
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Store a token
    Login {
        token: String,
        /// Store as the admin token instead of the customer token
        #[arg(long)]
        admin: bool,
    },
    /// Forget a token
    Logout {
        #[arg(long)]
        admin: bool,
    },
    /// Show which sessions are stored
    Status,
}

#[derive(Subcommand)]
enum CurrencyCommand {
    /// List supported currencies
    List,
    /// Show the selected currency
    Show,
    /// Select and persist a display currency
    Set { code: String },
    /// Convert an amount between two currencies
    Convert {
        amount: f64,
        #[arg(long, default_value = "USD")]
        from: String,
        /// Target currency (defaults to the selected one)
        #[arg(long)]
        to: Option<String>,
    },
    /// Format a USD amount in the selected currency
    Format {
        amount: f64,
        /// Fixed number of fraction digits
        #[arg(short, long)]
        precision: Option<u8>,
        /// Number only, without the currency symbol
        #[arg(long)]
        plain: bool,
    },
}

#[derive(Subcommand)]
enum GeocodeCommand {
    /// Island and atoll at a coordinate
    Reverse {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
    },
    /// Search places by name
    Search { query: String },
}

#[derive(clap::Args)]
struct ListingFilterArgs {
    /// Case-insensitive text search
    #[arg(short, long, default_value = "")]
    search: String,
    /// Property type or package category ("all" for any)
    #[arg(short = 't', long = "type", default_value = "all")]
    item_type: String,
    #[arg(long, default_value_t = 0.0)]
    min_price: f64,
    /// Defaults to the configured price ceiling
    #[arg(long)]
    max_price: Option<f64>,
    /// featured, price-low, price-high, rating or reviews
    #[arg(long, default_value = "featured")]
    sort: SortBy,
    /// Bearer token for the backend (defaults to the stored customer token)
    #[arg(long)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum ListingsCommand {
    Properties(ListingFilterArgs),
    Packages(ListingFilterArgs),
}

#[derive(Subcommand)]
enum BookingCommand {
    /// Nights between two YYYY-MM-DD dates
    Nights {
        check_in: String,
        check_out: String,
        #[arg(long)]
        price_per_night: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load_from_path(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = logging::init(&config.logging, cli.verbose) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn open_store(config: &AppConfig) -> Result<PersistentStore> {
    PersistentStore::open(&config.storage.location)
        .with_context(|| format!("Failed to open storage at {}", config.storage.location))
}

async fn run(command: Commands, config: &AppConfig) -> Result<()> {
    match command {
        Commands::Currency(command) => run_currency(command, config),
        Commands::Geocode(command) => run_geocode(command, config).await,
        Commands::Listings(command) => run_listings(command, config).await,
        Commands::Booking(command) => run_booking(command),
        Commands::Session(command) => run_session(command, config),
    }
}

fn run_currency(command: CurrencyCommand, config: &AppConfig) -> Result<()> {
    let store = open_store(config)?;
    let mut currencies = CurrencyStore::rehydrate(store);

    match command {
        CurrencyCommand::List => {
            let selected = currencies.selected().code;
            println!("Supported currencies (* = selected):");
            for currency in currencies.currencies() {
                let marker = if currency.code == selected { "*" } else { " " };
                println!(
                    "  {marker} {} {:<4} {:<18} {:>8.2} per USD",
                    currency.code, currency.symbol, currency.name, currency.rate
                );
            }
        }
        CurrencyCommand::Show => {
            let selected = currencies.selected();
            println!("{} ({}, {})", selected.code, selected.name, selected.symbol);
        }
        CurrencyCommand::Set { code } => {
            let selected = currencies.change_currency(&code.to_uppercase())?;
            println!("Display currency set to {} ({})", selected.code, selected.name);
        }
        CurrencyCommand::Convert { amount, from, to } => {
            let from = from.to_uppercase();
            let to = to.map_or_else(|| currencies.selected().code.to_string(), |c| c.to_uppercase());
            for code in [&from, &to] {
                if find_currency(code).is_none() {
                    anyhow::bail!("Unsupported currency '{code}'");
                }
            }
            let converted = convert_between(amount, &from, &to);
            println!("{amount} {from} = {converted:.2} {to}");
        }
        CurrencyCommand::Format {
            amount,
            precision,
            plain,
        } => {
            let options = FormatOptions {
                show_symbol: !plain,
                precision,
            };
            println!("{}", currencies.format_price(amount, options));
        }
    }
    Ok(())
}

async fn run_geocode(command: GeocodeCommand, config: &AppConfig) -> Result<()> {
    let client = Arc::new(GeocodingClient::new(&config.geocoding)?);

    match command {
        GeocodeCommand::Reverse { lat, lng } => {
            let mut resolver = LocationResolver::new(Arc::clone(&client));
            match open_store(config) {
                Ok(store) => {
                    resolver = resolver.with_cache(store, config.geocoding.reverse_cache_ttl_hours);
                }
                Err(e) => debug!("Reverse lookups not cached: {e:#}"),
            }
            match resolver.reverse_geocode(lat, lng).await? {
                Some(location) => {
                    println!("Island: {}", location.island);
                    println!("Atoll:  {}", location.atoll);
                    println!("Name:   {}", location.full_name);
                }
                None => println!("No island found near {lat}, {lng}"),
            }
        }
        GeocodeCommand::Search { query } => {
            let session = SearchSession::from_config(Arc::clone(&client), &config.geocoding);
            session.search_now(&query).await;
            let state = session.state();
            if let Some(message) = state.last_error {
                anyhow::bail!(message);
            }
            if state.results.is_empty() {
                println!("No places found for '{query}'");
            }
            for place in &state.results {
                let selected = select_place(place)?;
                println!(
                    "{:<24} {:<24} ({:.4}, {:.4})",
                    selected.data.island, selected.data.atoll, selected.latitude, selected.longitude
                );
            }
        }
    }
    Ok(())
}

fn filter_state(args: &ListingFilterArgs, default_max: f64) -> FilterState {
    let mut state = FilterState::new(default_max);
    state.update(FilterUpdate::SearchTerm(args.search.clone()));
    state.update(FilterUpdate::ItemType(args.item_type.clone()));
    state.update(FilterUpdate::PriceRange(
        args.min_price,
        args.max_price.unwrap_or(default_max),
    ));
    state.update(FilterUpdate::SortBy(args.sort));
    state
}

fn backend_client(config: &AppConfig, token: Option<String>) -> Result<BackendClient> {
    let client = BackendClient::new(&config.backend)?;
    if let Some(token) = token {
        return Ok(client.with_token(token));
    }
    Ok(match open_store(config) {
        Ok(store) => client.with_session_token(None, &SessionTokens::new(store)),
        Err(_) => client,
    })
}

async fn run_listings(command: ListingsCommand, config: &AppConfig) -> Result<()> {
    let max_price = config.listings.max_price;
    let currencies = CurrencyStore::rehydrate(open_store(config)?);

    match command {
        ListingsCommand::Properties(args) => {
            let client = backend_client(config, args.token.clone())?;
            let properties = client.properties().await.context("Failed to load properties")?;
            let filter_config = FilterConfig::new(
                vec![
                    PropertyField::Name,
                    PropertyField::Description,
                    PropertyField::Island,
                    PropertyField::Atoll,
                ],
                max_price,
            )
            .with_type_field(PropertyField::PropertyType)
            .with_price_field(PropertyField::PricePerNight);

            let shown = apply_filters(&properties, &filter_config, &filter_state(&args, max_price));
            println!("{} of {} properties ({})", shown.len(), properties.len(), args.sort.label());
            for property in shown {
                let island = property.location.as_ref().map_or("-", |l| l.island.as_str());
                println!(
                    "  {:<32} {:<16} {:>10} / night{}",
                    property.name,
                    island,
                    currencies.format_price(property.price_per_night.value(), FormatOptions::default()),
                    if property.is_featured { "  *" } else { "" }
                );
            }
        }
        ListingsCommand::Packages(args) => {
            let client = backend_client(config, args.token.clone())?;
            let packages = client.packages().await.context("Failed to load packages")?;
            let filter_config = FilterConfig::new(
                vec![PackageField::Name, PackageField::Description, PackageField::Category],
                max_price,
            )
            .with_type_field(PackageField::Category)
            .with_price_field(PackageField::Price);

            let shown = apply_filters(&packages, &filter_config, &filter_state(&args, max_price));
            println!("{} of {} packages ({})", shown.len(), packages.len(), args.sort.label());
            for package in shown {
                println!(
                    "  {:<32} {:>3} days {:>10}  {}",
                    package.name,
                    package.duration.unwrap_or_default(),
                    currencies.format_price(package.price.value(), FormatOptions::default()),
                    package.destinations().join(", ")
                );
            }
        }
    }
    Ok(())
}

fn run_booking(command: BookingCommand) -> Result<()> {
    match command {
        BookingCommand::Nights {
            check_in,
            check_out,
            price_per_night,
        } => {
            let nights = booking::parse_and_count(&check_in, &check_out)?;
            println!("{nights} night(s)");
            if let Some(price) = price_per_night {
                let total = booking::total_price(nights, price);
                println!("Total: {}", atoll_travel::currency::format_price_usd(total));
            }
        }
    }
    Ok(())
}

fn role(admin: bool) -> SessionRole {
    if admin {
        SessionRole::Admin
    } else {
        SessionRole::Customer
    }
}

fn run_session(command: SessionCommand, config: &AppConfig) -> Result<()> {
    let tokens = SessionTokens::new(open_store(config)?);
    match command {
        SessionCommand::Login { token, admin } => {
            tokens.set(role(admin), &token)?;
            println!("Stored {} session", if admin { "admin" } else { "customer" });
        }
        SessionCommand::Logout { admin } => {
            tokens.clear(role(admin))?;
            println!("Cleared {} session", if admin { "admin" } else { "customer" });
        }
        SessionCommand::Status => {
            for (name, role) in [("admin", SessionRole::Admin), ("customer", SessionRole::Customer)] {
                let state = if tokens.is_authenticated(role) { "signed in" } else { "signed out" };
                println!("{name:<9} {state}");
            }
        }
    }
    Ok(())
}

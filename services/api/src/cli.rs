use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand, ValueEnum};
use realty_desk::error::AppError;
use realty_desk::workflows::map::{select_render_strategy, RenderStrategy, CLIENT_CLUSTER_LIMIT};
use realty_desk::workflows::moderation::{moderation_options, ListingType, OfferType, Role};

#[derive(Parser, Debug)]
#[command(
    name = "Realty Desk",
    about = "Run the listing moderation and map service, or inspect its rules from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Inspect moderation status rules
    Moderation {
        #[command(subcommand)]
        command: ModerationCommand,
    },
    /// Inspect map rendering rules
    Map {
        #[command(subcommand)]
        command: MapCommand,
    },
    /// Run the moderation and map scenario against an in-memory backend
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ModerationCommand {
    /// List the statuses a role may pick and the fields they require
    Options(OptionsArgs),
}

#[derive(Subcommand, Debug)]
enum MapCommand {
    /// Show whether a point count is clustered on the client or by the server
    Strategy(StrategyArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum RoleArg {
    Admin,
    Agent,
    Superadmin,
}

impl From<RoleArg> for Role {
    fn from(value: RoleArg) -> Self {
        match value {
            RoleArg::Admin => Role::Admin,
            RoleArg::Agent => Role::Agent,
            RoleArg::Superadmin => Role::Superadmin,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum OfferArg {
    Sale,
    Rent,
}

impl From<OfferArg> for OfferType {
    fn from(value: OfferArg) -> Self {
        match value {
            OfferArg::Sale => OfferType::Sale,
            OfferArg::Rent => OfferType::Rent,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum ListingArg {
    Regular,
    Vip,
    Urgent,
}

impl From<ListingArg> for ListingType {
    fn from(value: ListingArg) -> Self {
        match value {
            ListingArg::Regular => ListingType::Regular,
            ListingArg::Vip => ListingType::Vip,
            ListingArg::Urgent => ListingType::Urgent,
        }
    }
}

#[derive(Args, Debug)]
struct OptionsArgs {
    /// Acting staff role
    #[arg(long, value_enum)]
    role: RoleArg,
    /// Whether the listing is for sale or rent
    #[arg(long, value_enum, default_value = "sale")]
    offer_type: OfferArg,
    /// Promotion tier of the listing
    #[arg(long, value_enum, default_value = "regular")]
    listing_type: ListingArg,
    /// Show the options of the creation form instead of the edit form
    #[arg(long)]
    creating: bool,
}

#[derive(Args, Debug)]
struct StrategyArgs {
    /// Number of listings already loaded on the client
    #[arg(long)]
    points: usize,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Moderation {
            command: ModerationCommand::Options(args),
        } => {
            print_options(args);
            Ok(())
        }
        Command::Map {
            command: MapCommand::Strategy(args),
        } => {
            print_strategy(args.points);
            Ok(())
        }
        Command::Demo(args) => run_demo(args).await,
    }
}

fn print_options(args: OptionsArgs) {
    let role = Role::from(args.role);
    let offer_type = OfferType::from(args.offer_type);
    let listing_type = ListingType::from(args.listing_type);
    let options = moderation_options(role, offer_type, listing_type, !args.creating, None);

    println!(
        "Statuses for {} on a {:?} {:?} listing ({}):",
        role.label(),
        listing_type,
        offer_type,
        if args.creating { "create" } else { "edit" }
    );
    for option in &options.statuses {
        let required = crate::demo::describe_required(option.status);
        println!("  - {:<14} {}", option.label, required);
    }
    println!("Default selection: {}", options.selected.display_name());
    println!(
        "Listing type editable: {}",
        if options.listing_type_editable {
            "yes"
        } else {
            "no"
        }
    );
}

fn print_strategy(points: usize) {
    let strategy = select_render_strategy(points);
    let explanation = match strategy {
        RenderStrategy::ClientClusters => {
            format!("{points} preloaded listings fit the client limit of {CLIENT_CLUSTER_LIMIT}")
        }
        RenderStrategy::ServerClusters if points == 0 => {
            "nothing preloaded; features come from the map endpoint".to_string()
        }
        RenderStrategy::ServerClusters => {
            format!("{points} listings exceed the client limit of {CLIENT_CLUSTER_LIMIT}")
        }
    };
    println!("{strategy:?}: {explanation}");
}

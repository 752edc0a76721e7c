use accounts::account::{Account, AccountAttributes, Accounts, AccountsApi, ListRequest};
use accounts::console::{Console, write_json};
use anyhow::Result;
use clap::Parser;
use uuid::Uuid;

/// accounts - Organisation Accounts API client
///
/// Create, fetch, list and delete accounts. Without a subcommand an
/// interactive console is started on stdin.
///
/// Examples:
///   accounts fetch ea6239c1-99e9-42b3-bca1-92f5c068da6b
///   accounts list --country GB --page-size 10
///   accounts delete ea6239c1-99e9-42b3-bca1-92f5c068da6b --version 0
#[derive(Parser, Debug)]
#[command(author, version = env!("ACCOUNTS_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Base URL of the accounts API
    #[arg(
        long = "server-url",
        env = "SERVER_URL",
        value_name = "URL",
        default_value = "http://localhost:8080",
        global = true
    )]
    server_url: String,

    /// Value of the Host header sent with every request
    #[arg(long, env = "HOST", value_name = "HOST", global = true)]
    host: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Create a new account
    Create(CreateArgs),

    /// Fetch an existing account
    Fetch(FetchArgs),

    /// List accounts, optionally filtered
    List(ListArgs),

    /// Delete an account
    Delete(DeleteArgs),

    /// Start the interactive console (the default)
    Console,
}

#[derive(clap::Args, Debug)]
struct CreateArgs {
    /// Organisation owning the account (a new ID when omitted)
    #[arg(long, value_name = "UUID")]
    organisation_id: Option<Uuid>,

    /// ISO 3166-1 country code, e.g. GB
    #[arg(long)]
    country: Option<String>,

    /// ISO 4217 currency code, e.g. GBP
    #[arg(long)]
    base_currency: Option<String>,

    #[arg(long)]
    bank_id: Option<String>,

    #[arg(long)]
    bank_id_code: Option<String>,

    #[arg(long)]
    bic: Option<String>,

    #[arg(long)]
    account_number: Option<String>,

    #[arg(long)]
    iban: Option<String>,

    #[arg(long)]
    customer_id: Option<String>,

    /// Account holder name line (repeatable, up to four)
    #[arg(long = "name", value_name = "LINE")]
    name: Vec<String>,

    /// Alternative account name (repeatable)
    #[arg(long = "alternative-name", value_name = "NAME")]
    alternative_names: Vec<String>,

    #[arg(long)]
    account_classification: Option<String>,

    #[arg(long)]
    joint_account: Option<bool>,

    #[arg(long)]
    switched: Option<bool>,

    #[arg(long)]
    account_matching_opt_out: Option<bool>,

    #[arg(long)]
    secondary_identification: Option<String>,
}

#[derive(clap::Args, Debug)]
struct FetchArgs {
    /// Account ID
    #[arg(value_name = "ID")]
    id: Uuid,
}

#[derive(clap::Args, Debug)]
struct ListArgs {
    /// Page number, starting at 0
    #[arg(long, default_value_t = 0)]
    page_number: u32,

    /// Page size (server default when omitted)
    #[arg(long, default_value_t = 0)]
    page_size: u32,

    /// Filter by bank ID (comma separated or repeated)
    #[arg(long, value_delimiter = ',')]
    bank_id: Vec<String>,

    /// Filter by account number
    #[arg(long, value_delimiter = ',')]
    account_number: Vec<String>,

    /// Filter by IBAN
    #[arg(long, value_delimiter = ',')]
    iban: Vec<String>,

    /// Filter by customer ID
    #[arg(long, value_delimiter = ',')]
    customer_id: Vec<String>,

    /// Filter by country
    #[arg(long, value_delimiter = ',')]
    country: Vec<String>,
}

#[derive(clap::Args, Debug)]
struct DeleteArgs {
    /// Account ID
    #[arg(value_name = "ID")]
    id: Uuid,

    /// Current version of the account
    #[arg(long, default_value_t = 0)]
    version: i64,
}

impl From<CreateArgs> for Account {
    fn from(args: CreateArgs) -> Self {
        let attributes = AccountAttributes {
            country: args.country,
            base_currency: args.base_currency,
            account_number: args.account_number,
            bank_id: args.bank_id,
            bank_id_code: args.bank_id_code,
            bic: args.bic,
            iban: args.iban,
            customer_id: args.customer_id,
            name: args.name,
            alternative_names: args.alternative_names,
            account_classification: args.account_classification,
            joint_account: args.joint_account,
            switched: args.switched,
            account_matching_opt_out: args.account_matching_opt_out,
            secondary_identification: args.secondary_identification,
            ..Default::default()
        };
        Account::new(args.organisation_id.unwrap_or_else(Uuid::new_v4), attributes)
    }
}

impl From<ListArgs> for ListRequest {
    fn from(args: ListArgs) -> Self {
        ListRequest {
            page_number: args.page_number,
            page_size: args.page_size,
            bank_id: args.bank_id,
            account_number: args.account_number,
            iban: args.iban,
            customer_id: args.customer_id,
            country: args.country,
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    write_json(&mut std::io::stdout().lock(), value)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let api = AccountsApi::new(cli.server_url, cli.host)?;

    match cli.command.unwrap_or(Commands::Console) {
        Commands::Create(args) => print_json(&api.create(&args.into()).await?)?,
        Commands::Fetch(args) => print_json(&api.fetch(args.id).await?)?,
        Commands::List(args) => print_json(&api.list(&args.into()).await?)?,
        Commands::Delete(args) => {
            api.delete(args.id, args.version).await?;
            println!("Account deleted successfully");
        }
        Commands::Console => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            Console::new(api, stdin.lock(), stdout.lock()).run().await?
        }
    }
    Ok(())
}

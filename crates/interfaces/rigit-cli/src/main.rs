use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use rigit_cli::commands::{self, SettingsUpdate};
use rigit_cli::{CliContractScope, CliLeadScope, CliList, CliQuotationScope, CliReference};
use rigit_config::{API_BASE_URL_ENV, LOG_FILTER_ENV};
use rigit_core::{ContractPatch, ContractStatus, EnquiryDraft, LeadDraft, LeadStatus, PublicEnquiryForm};
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about = "Rental ERP client")]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Backend root, e.g. http://localhost:8000
    #[arg(long, global = true, env = API_BASE_URL_ENV)]
    base_url: Option<String>,
    #[arg(long, global = true)]
    config_dir: Option<Utf8PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a bearer token for later commands
    Login { token: String },
    Logout,
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    Leads {
        #[command(subcommand)]
        command: LeadCommands,
    },
    /// Submit the public enquiry form (no login needed)
    Enquire(EnquireArgs),
    Enquiries {
        #[command(subcommand)]
        command: EnquiryCommands,
    },
    Quotations {
        #[command(subcommand)]
        command: QuotationCommands,
    },
    Orders {
        #[command(subcommand)]
        command: OrderCommands,
    },
    Contracts {
        #[command(subcommand)]
        command: ContractCommands,
    },
    Rentals {
        #[arg(short, long)]
        filter: Option<String>,
    },
    Invoices {
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Show a master-data, HR or warehouse list
    Reference {
        #[arg(value_enum)]
        list: CliReference,
    },
    /// Keep a list on screen and refresh it until Ctrl-C
    Watch {
        #[arg(value_enum)]
        list: CliList,
        #[arg(long, help = "Poll interval in seconds (defaults to the configured one)")]
        interval: Option<u64>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    Show,
    Set {
        #[arg(long)]
        api_base_url: Option<String>,
        #[arg(long)]
        http_timeout_secs: Option<u64>,
        #[arg(long)]
        refresh_interval_secs: Option<u64>,
        #[arg(long)]
        dispatch_delay_ms: Option<u64>,
        #[arg(long)]
        quotation_validity_days: Option<u32>,
        #[arg(long)]
        default_rental_duration_days: Option<u32>,
    },
}

#[derive(Subcommand)]
enum LeadCommands {
    List {
        #[arg(long, value_enum, default_value_t = CliLeadScope::Assigned)]
        scope: CliLeadScope,
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Lead counts per status
    Summary {
        #[arg(long, value_enum, default_value_t = CliLeadScope::Assigned)]
        scope: CliLeadScope,
    },
    Status { id: String, status: String },
    Add {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: String,
        #[arg(long)]
        mobile: Option<String>,
        #[arg(long)]
        organization: Option<String>,
        #[arg(long)]
        source: Option<String>,
    },
}

#[derive(Args)]
struct EnquireArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    organization: Option<String>,
    #[arg(long)]
    category: String,
    #[arg(long)]
    equipment_type: Option<String>,
    #[arg(long, default_value_t = 1)]
    quantity: u32,
    #[arg(long)]
    start_date: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    message: Option<String>,
}

impl From<EnquireArgs> for PublicEnquiryForm {
    fn from(a: EnquireArgs) -> Self {
        Self {
            first_name: a.first_name,
            last_name: a.last_name,
            email: a.email,
            phone: a.phone,
            organization: a.organization,
            equipment_category: a.category,
            equipment_type: a.equipment_type,
            quantity: a.quantity,
            desired_start_date: a.start_date,
            location: a.location,
            message: a.message,
        }
    }
}

#[derive(Subcommand)]
enum EnquiryCommands {
    List {
        #[arg(short, long)]
        filter: Option<String>,
    },
    Add {
        #[arg(long)]
        customer_name: String,
        #[arg(long)]
        customer_email: String,
        #[arg(long)]
        equipment: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        delivery_location: String,
        #[arg(long)]
        delivery_date: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    Status { id: String, status: String },
    /// Draft a quotation from the enquiry and send it for approval
    Quote { id: String },
}

#[derive(Subcommand)]
enum QuotationCommands {
    List {
        #[arg(long, value_enum, default_value_t = CliQuotationScope::Sales)]
        scope: CliQuotationScope,
        #[arg(short, long)]
        filter: Option<String>,
    },
    Send { id: String },
    Approve { id: String },
    Reject { id: String },
}

#[derive(Subcommand)]
enum OrderCommands {
    List {
        #[arg(short, long)]
        filter: Option<String>,
    },
    CheckStock { id: String },
    CreateContract { id: String },
}

#[derive(Subcommand)]
enum ContractCommands {
    List {
        #[arg(long, value_enum, default_value_t = CliContractScope::Pending)]
        scope: CliContractScope,
        #[arg(short, long)]
        filter: Option<String>,
    },
    Approve { id: String },
    Reject { id: String },
    Edit {
        id: String,
        #[arg(long)]
        customer: Option<String>,
        #[arg(long)]
        project: Option<String>,
        #[arg(long)]
        equipment: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        renewal_date: Option<String>,
    },
    Delete { id: String },
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let builder = FmtSubscriber::builder().with_writer(std::io::stderr);
    match std::env::var(LOG_FILTER_ENV) {
        Ok(filter) if !verbose => {
            let subscriber = builder.with_env_filter(EnvFilter::new(filter)).finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        _ => {
            let level = if verbose { Level::DEBUG } else { Level::WARN };
            let subscriber = builder.with_max_level(level).finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    }
    .context("Failed to install the log subscriber")
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if let Some(hint) = rigit_cli::failure_hint(&e) {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(rigit_cli::exit_code(&e))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    init_tracing(cli.verbose)?;

    let dir = commands::config_dir(cli.config_dir)?;

    if let Commands::Config { command } = &cli.command {
        return match command {
            ConfigCommands::Show => {
                let settings = commands::load_settings(&dir, cli.base_url)?;
                commands::cmd_config_show(&dir, &settings)
            }
            ConfigCommands::Set {
                api_base_url,
                http_timeout_secs,
                refresh_interval_secs,
                dispatch_delay_ms,
                quotation_validity_days,
                default_rental_duration_days,
            } => commands::cmd_config_set(
                &dir,
                SettingsUpdate {
                    api_base_url: api_base_url.clone(),
                    http_timeout_secs: *http_timeout_secs,
                    refresh_interval_secs: *refresh_interval_secs,
                    dispatch_delay_ms: *dispatch_delay_ms,
                    quotation_validity_days: *quotation_validity_days,
                    default_rental_duration_days: *default_rental_duration_days,
                },
            )
            .map(|_| ()),
        };
    }

    let kernel = commands::open_kernel(&dir, cli.base_url)?;

    match cli.command {
        Commands::Config { .. } => {}
        Commands::Login { token } => commands::cmd_login(&kernel, &token)?,
        Commands::Logout => commands::cmd_logout(&kernel)?,
        Commands::Leads { command } => match command {
            LeadCommands::List { scope, filter } => {
                commands::cmd_leads(&kernel, scope, filter.as_deref()).await?;
            }
            LeadCommands::Summary { scope } => {
                commands::cmd_leads_summary(&kernel, scope).await?;
            }
            LeadCommands::Status { id, status } => {
                commands::cmd_lead_status(&kernel, &id, &status).await?
            }
            LeadCommands::Add {
                first_name,
                last_name,
                email,
                mobile,
                organization,
                source,
            } => {
                let draft = LeadDraft {
                    first_name,
                    last_name,
                    email,
                    mobile,
                    organization,
                    source,
                    status: LeadStatus::New,
                };
                commands::cmd_lead_add(&kernel, &draft).await?;
            }
        },
        Commands::Enquire(args) => {
            commands::cmd_enquire(&kernel, &args.into()).await?;
        }
        Commands::Enquiries { command } => match command {
            EnquiryCommands::List { filter } => {
                commands::cmd_enquiries(&kernel, filter.as_deref()).await?;
            }
            EnquiryCommands::Add {
                customer_name,
                customer_email,
                equipment,
                quantity,
                days,
                delivery_location,
                delivery_date,
                notes,
            } => {
                let mut draft = EnquiryDraft::new(kernel.settings().default_rental_duration_days);
                draft.customer_name = customer_name;
                draft.customer_email = customer_email;
                draft.equipment_name = equipment;
                draft.quantity = quantity;
                if let Some(days) = days {
                    draft.rental_duration_days = days;
                }
                draft.delivery_location = delivery_location;
                draft.expected_delivery_date = delivery_date.unwrap_or_default();
                draft.special_instructions = notes.unwrap_or_default();
                commands::cmd_enquiry_add(&kernel, &draft).await?;
            }
            EnquiryCommands::Status { id, status } => {
                commands::cmd_enquiry_status(&kernel, &id, &status).await?
            }
            EnquiryCommands::Quote { id } => {
                commands::cmd_enquiry_quote(&kernel, &id).await?;
            }
        },
        Commands::Quotations { command } => match command {
            QuotationCommands::List { scope, filter } => {
                commands::cmd_quotations(&kernel, scope, filter.as_deref()).await?;
            }
            QuotationCommands::Send { id } => commands::cmd_quotation_send(&kernel, &id).await?,
            QuotationCommands::Approve { id } => {
                commands::cmd_quotation_approve(&kernel, &id).await?;
            }
            QuotationCommands::Reject { id } => {
                commands::cmd_quotation_reject(&kernel, &id).await?
            }
        },
        Commands::Orders { command } => match command {
            OrderCommands::List { filter } => {
                commands::cmd_orders(&kernel, filter.as_deref()).await?;
            }
            OrderCommands::CheckStock { id } => {
                commands::cmd_order_check_stock(&kernel, &id).await?;
            }
            OrderCommands::CreateContract { id } => {
                commands::cmd_order_create_contract(&kernel, &id).await?;
            }
        },
        Commands::Contracts { command } => match command {
            ContractCommands::List { scope, filter } => {
                commands::cmd_contracts(&kernel, scope, filter.as_deref()).await?;
            }
            ContractCommands::Approve { id } => {
                commands::cmd_contract_approve(&kernel, &id).await?;
            }
            ContractCommands::Reject { id } => commands::cmd_contract_reject(&kernel, &id).await?,
            ContractCommands::Edit {
                id,
                customer,
                project,
                equipment,
                start_date,
                end_date,
                amount,
                status,
                renewal_date,
            } => {
                let patch = ContractPatch {
                    customer,
                    project,
                    equipment,
                    start_date,
                    end_date,
                    amount,
                    status: status.as_deref().map(ContractStatus::parse),
                    renewal_date,
                };
                commands::cmd_contract_edit(&kernel, &id, &patch).await?
            }
            ContractCommands::Delete { id } => commands::cmd_contract_delete(&kernel, &id).await?,
        },
        Commands::Rentals { filter } => {
            commands::cmd_rentals(&kernel, filter.as_deref()).await?;
        }
        Commands::Invoices { filter } => {
            commands::cmd_invoices(&kernel, filter.as_deref()).await?;
        }
        Commands::Reference { list } => {
            commands::cmd_reference(&kernel, list).await?;
        }
        Commands::Watch { list, interval } => {
            commands::cmd_watch(&kernel, list, interval.map(Duration::from_secs)).await?
        }
    }

    Ok(())
}

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ldy")]
#[command(about = "Laundrify operator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> site overrides...)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Time-slot administration
    Slots {
        #[command(subcommand)]
        cmd: SlotsCmd,
    },

    /// Order lookup and status changes
    Order {
        #[command(subcommand)]
        cmd: OrderCmd,
    },

    /// Barcode tokens and images (no database needed)
    Barcode {
        #[command(subcommand)]
        cmd: BarcodeCmd,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    Status,

    /// Apply embedded SQL migrations.
    Migrate,
}

#[derive(Subcommand)]
enum SlotsCmd {
    /// Create every configured time range for a date. Existing slots are kept.
    Seed {
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Layered config paths in merge order (defaults when omitted)
        #[arg(long = "config")]
        config_paths: Vec<String>,
    },

    /// List active slots for a date with remaining capacity.
    List {
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
    },
}

#[derive(Subcommand)]
enum OrderCmd {
    /// Find an order by exact barcode or a fragment of its id.
    Lookup {
        #[arg(long)]
        token: String,

        /// Print the full order as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Set an order's status (any status may follow any other).
    Transition {
        /// Order id
        #[arg(long)]
        id: String,

        /// pending | pickup | washing | drying | completed | delivered
        #[arg(long)]
        status: String,

        #[arg(long)]
        feedback: Option<String>,

        #[arg(long)]
        slot_note: Option<String>,
    },
}

#[derive(Subcommand)]
enum BarcodeCmd {
    /// Print a freshly generated token.
    Token,

    /// Render a token as a PBM image.
    Render {
        #[arg(long)]
        text: String,

        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience).
    let _ = dotenvy::from_filename(".env.local");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Db { cmd } => {
            let pool = ldy_db::connect_from_env().await?;
            match cmd {
                DbCmd::Status => {
                    let s = ldy_db::status(&pool).await?;
                    println!("db_ok={} has_orders_table={}", s.ok, s.has_orders_table);
                }
                DbCmd::Migrate => {
                    ldy_db::migrate(&pool).await?;
                    println!("migrations_applied=true");
                }
            }
        }

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = ldy_config::load_layered_yaml(&path_refs)?;
            // Typed validation so a bad layer fails here, not at daemon start.
            loaded.laundry()?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Slots { cmd } => match cmd {
            SlotsCmd::Seed { date, config_paths } => {
                commands::slots::seed(&date, config_paths).await?;
            }
            SlotsCmd::List { date } => {
                commands::slots::list(&date).await?;
            }
        },

        Commands::Order { cmd } => match cmd {
            OrderCmd::Lookup { token, json } => {
                commands::order::lookup(&token, json).await?;
            }
            OrderCmd::Transition {
                id,
                status,
                feedback,
                slot_note,
            } => {
                commands::order::transition(&id, &status, feedback, slot_note).await?;
            }
        },

        Commands::Barcode { cmd } => match cmd {
            BarcodeCmd::Token => commands::barcode::token(),
            BarcodeCmd::Render { text, out } => commands::barcode::render(&text, out.as_deref())?,
        },
    }

    Ok(())
}

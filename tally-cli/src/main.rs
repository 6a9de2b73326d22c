use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tally_core::{
    Frequency, Kind, Ledger, PaymentMethod, SortOrder, TallyError, TransactionDraft, TransactionFilter, YearMonth,
    time,
};
use tally_io::{default_export_name, export_csv, export_json, load_ledger, save_ledger};

mod config;
mod render;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "Personal income/expense tracker"
)]
struct Cli {
    /// Data file to use instead of the configured one
    #[arg(long, global = true, env = "TALLY_DATA")]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default ~/.tally/config.toml
    Init,

    /// Record an income or expense
    Add {
        /// income | expense
        kind: Kind,
        amount: f64,
        /// Category id (see `tally categories`)
        category: String,
        /// YYYY-MM-DD (default: today)
        #[arg(long, value_parser = time::parse_date)]
        date: Option<NaiveDate>,
        #[arg(short, long)]
        description: Option<String>,
        /// cash | card | bank-transfer | digital-wallet
        #[arg(short, long, default_value = "cash")]
        payment: PaymentMethod,
        /// Repeat this transaction: daily | weekly | monthly | yearly
        #[arg(long)]
        recurring: Option<Frequency>,
    },

    /// Replace fields of an existing transaction
    Edit {
        id: String,
        #[arg(long)]
        kind: Option<Kind>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_parser = time::parse_date)]
        date: Option<NaiveDate>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        payment: Option<PaymentMethod>,
    },

    /// Delete a transaction
    Delete { id: String },

    /// List transactions
    List {
        #[arg(long)]
        kind: Option<Kind>,
        #[arg(long)]
        category: Option<String>,
        /// Case-insensitive match on category name or description
        #[arg(short, long)]
        search: Option<String>,
        /// newest | oldest | highest | lowest
        #[arg(long, default_value = "newest")]
        sort: SortOrder,
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Income, expenses and net for a month
    Summary {
        /// YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<YearMonth>,
    },

    /// Totals per category for a month
    Breakdown {
        #[arg(long)]
        month: Option<YearMonth>,
        #[arg(long, default_value = "expense")]
        kind: Kind,
    },

    /// Month-by-month income and expenses
    Trend {
        #[arg(long, default_value_t = 6)]
        months: usize,
        /// Last month shown (default: current month)
        #[arg(long)]
        ending: Option<YearMonth>,
    },

    /// Monthly category budgets
    Budget {
        #[command(subcommand)]
        command: BudgetCommand,
    },

    /// Recurring transaction rules
    Recurring {
        #[command(subcommand)]
        command: RecurringCommand,
    },

    /// Show the category registry
    Categories,

    /// Show or change preferences
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Convert an amount with the configured static exchange rates
    Convert {
        amount: f64,
        from: String,
        /// Target currency (default: the base currency)
        to: Option<String>,
    },

    /// Export the ledger
    Export {
        #[command(subcommand)]
        command: ExportCommand,
    },
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    /// Set (or replace) the monthly limit for an expense category
    Set { category: String, limit: f64 },
    /// Remove the budget of a category
    Remove { category: String },
    /// Progress of every budget
    List {
        #[arg(long)]
        month: Option<YearMonth>,
    },
}

#[derive(Subcommand, Debug)]
enum RecurringCommand {
    /// List rules and whether they are due
    List,
    /// Generate the transactions that are due today
    Run,
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,
    Set {
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        theme: Option<tally_core::Theme>,
        #[arg(long)]
        language: Option<tally_core::Language>,
    },
    /// Set the static rate: units of CODE per one unit of the base currency
    Rate { code: String, rate: f64 },
}

#[derive(Subcommand, Debug)]
enum ExportCommand {
    /// Transactions as CSV
    Csv {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// The full data blob as pretty JSON
    Json {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

struct RunContext {
    today: NaiveDate,
    month: YearMonth,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("tally={level},tally_core={level},tally_io={level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::Init = cli.command {
        return config::init_config();
    }

    let cfg = config::load_config()?;
    init_tracing(&cfg.log.level);

    let tz = cfg.timezone()?;
    let data_path = match cli.data {
        Some(p) => p,
        None => cfg.data_path()?,
    };

    let mut ledger = load_ledger(&data_path);
    let today = time::today_in(tz);
    let ctx = RunContext {
        today,
        month: YearMonth::of(today),
    };

    let generated = ledger.process_recurring(today);
    if !generated.is_empty() {
        info!(count = generated.len(), "recurring transactions generated");
        println!("Generated {} recurring transaction(s).\n", generated.len());
    }

    let outcome = run(cli.command, &mut ledger, &ctx);

    let changed = matches!(outcome, Ok(true)) || !generated.is_empty();
    if changed {
        if let Err(e) = save_ledger(&data_path, &ledger) {
            error!("{e}");
            return Err(e).with_context(|| format!("saving {}", data_path.display()));
        }
    }

    outcome.map(|_| ())
}

/// Execute one command. Returns whether the ledger was modified.
fn run(command: Command, ledger: &mut Ledger, ctx: &RunContext) -> Result<bool> {
    let currency = ledger.settings.currency.clone();

    match command {
        Command::Init => config::init_config().map(|_| false),

        Command::Add {
            kind,
            amount,
            category,
            date,
            description,
            payment,
            recurring,
        } => {
            let mut draft = TransactionDraft::new(kind, amount, category, date.unwrap_or(ctx.today))
                .with_payment_method(payment);
            if let Some(d) = description {
                draft = draft.with_description(d);
            }
            let id = ledger.add_transaction(draft, recurring)?;
            println!("Transaction added: {id}");
            if let Some(f) = recurring {
                println!("Repeats {f}.");
            }
            Ok(true)
        }

        Command::Edit {
            id,
            kind,
            amount,
            category,
            date,
            description,
            payment,
        } => {
            let Some(current) = ledger.transactions.find(&id) else {
                return Err(TallyError::not_found(id).into());
            };
            let mut draft = current.to_draft();
            if let Some(k) = kind {
                draft.kind = k;
            }
            if let Some(a) = amount {
                draft.amount = a;
            }
            if let Some(c) = category {
                draft.category_id = c;
            }
            if let Some(d) = date {
                draft.date = d;
            }
            if let Some(d) = description {
                draft = draft.with_description(d);
            }
            if let Some(p) = payment {
                draft.payment_method = p;
            }
            ledger.update_transaction(&id, draft)?;
            println!("Transaction updated: {id}");
            Ok(true)
        }

        Command::Delete { id } => match ledger.delete_transaction(&id) {
            Ok(_) => {
                println!("Transaction deleted: {id}");
                Ok(true)
            }
            Err(TallyError::NotFound(_)) => {
                println!("No transaction {id} (already deleted?)");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        },

        Command::List {
            kind,
            category,
            search,
            sort,
            limit,
        } => {
            let filter = TransactionFilter {
                kind,
                category_id: category,
                search,
            };
            let mut list = ledger.transactions.list(&filter, sort);
            if let Some(n) = limit {
                list.truncate(n);
            }
            render::transactions(&list, &currency);
            Ok(false)
        }

        Command::Summary { month } => {
            let month = month.unwrap_or(ctx.month);
            render::summary(month, &ledger.summary(month), &currency);
            Ok(false)
        }

        Command::Breakdown { month, kind } => {
            let month = month.unwrap_or(ctx.month);
            let totals = ledger.breakdown(month, kind);
            render::breakdown(month, kind, &totals, &ledger.categories, &currency);
            Ok(false)
        }

        Command::Trend { months, ending } => {
            if months == 0 {
                bail!("--months must be at least 1");
            }
            render::trend(&ledger.trend(months, ending.unwrap_or(ctx.month)), &currency);
            Ok(false)
        }

        Command::Budget { command } => match command {
            BudgetCommand::Set { category, limit } => {
                let b = ledger.set_budget(&category, limit)?;
                println!("Budget set: {} {}", b.category_name, tally_core::format_amount(b.limit, &currency));
                Ok(true)
            }
            BudgetCommand::Remove { category } => {
                ledger.remove_budget(&category)?;
                println!("Budget removed: {category}");
                Ok(true)
            }
            BudgetCommand::List { month } => {
                let month = month.unwrap_or(ctx.month);
                render::budgets(month, &ledger.budget_report(month), &currency);
                Ok(false)
            }
        },

        Command::Recurring { command } => match command {
            RecurringCommand::List => {
                render::rules(&ledger.recurring_transactions, ctx.today, &currency);
                Ok(false)
            }
            RecurringCommand::Run => {
                let generated = ledger.process_recurring(ctx.today);
                if generated.is_empty() {
                    println!("Nothing due.");
                }
                for id in &generated {
                    println!("Generated: {id}");
                }
                Ok(!generated.is_empty())
            }
        },

        Command::Categories => {
            render::categories(&ledger.categories);
            Ok(false)
        }

        Command::Settings { command } => match command {
            SettingsCommand::Show => {
                render::settings(&ledger.settings);
                Ok(false)
            }
            SettingsCommand::Set {
                currency,
                theme,
                language,
            } => {
                if currency.is_none() && theme.is_none() && language.is_none() {
                    bail!("nothing to change (pass --currency, --theme or --language)");
                }
                if let Some(c) = currency {
                    ledger.settings.set_currency(&c)?;
                }
                if let Some(t) = theme {
                    ledger.settings.theme = t;
                }
                if let Some(l) = language {
                    ledger.settings.language = l;
                }
                render::settings(&ledger.settings);
                Ok(true)
            }
            SettingsCommand::Rate { code, rate } => {
                ledger.settings.set_exchange_rate(&code, rate)?;
                println!("1 {} = {rate} {}", ledger.settings.currency, code.to_uppercase());
                Ok(true)
            }
        },

        Command::Convert { amount, from, to } => {
            let to = to.unwrap_or_else(|| currency.clone());
            let converted = ledger.settings.convert(amount, &from, &to)?;
            println!(
                "{} = {}",
                tally_core::format_amount(amount, &from),
                tally_core::format_amount(converted, &to)
            );
            Ok(false)
        }

        Command::Export { command } => {
            match command {
                ExportCommand::Csv { out } => {
                    let path = out.unwrap_or_else(|| PathBuf::from(default_export_name(ctx.today, "csv")));
                    let rows = export_csv(ledger.transactions.as_slice(), &path)
                        .with_context(|| format!("exporting {}", path.display()))?;
                    println!("Exported {rows} transaction(s) to {}", path.display());
                }
                ExportCommand::Json { out } => {
                    let path = out.unwrap_or_else(|| PathBuf::from(default_export_name(ctx.today, "json")));
                    export_json(ledger, &path).with_context(|| format!("exporting {}", path.display()))?;
                    println!("Exported to {}", path.display());
                }
            }
            Ok(false)
        }
    }
}

use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, Month};

use finance_ledger::{
    initialize_db,
    mirror::mirror_new_transaction,
    stores::sqlite::SQLiteIndexStore,
    transaction::{Category, Status, Transaction, create_transaction},
};

/// A utility for creating a populated pair of stores for manual testing.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the application SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// File path to save the index store database to.
    #[arg(long, short, default_value = "index.db")]
    index_path: String,
}

/// Create and populate both stores for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);
    let index_path = Path::new(&args.index_path);

    for path in [output_path, index_path] {
        if path.extension().is_none_or(|extension| extension.is_empty()) {
            eprintln!("Paths must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }

        if path.is_file() {
            eprintln!("File already exists at {path:#?}!");
            exit(1);
        }
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;
    initialize_db(&conn)?;

    println!("Creating index store at {index_path:#?}");
    let index_store = SQLiteIndexStore::new(Connection::open(index_path)?)?;

    println!("Creating test transactions...");

    let samples = [
        (520_000, Category::Ganho, Month::January, 5, "Salário", Status::Pago),
        (145_000, Category::Gasto, Month::January, 10, "Aluguel", Status::Pago),
        (32_075, Category::Gasto, Month::January, 18, "Mercado", Status::Pago),
        (520_000, Category::Ganho, Month::February, 5, "Salário", Status::Pago),
        (145_000, Category::Gasto, Month::February, 10, "Aluguel", Status::Atrasado),
        (8_990, Category::Gasto, Month::February, 22, "Internet", Status::Pendente),
        (75_000, Category::Ganho, Month::March, 3, "Freelance", Status::Pendente),
    ];

    for (cents, category, month, day, description, status) in samples {
        let date = Date::from_calendar_date(2025, month, day)?;
        let builder = Transaction::build(Decimal::new(cents, 2), category, date)
            .description(description)
            .status(status)
            .validate()?;
        let transaction = create_transaction(builder, &conn)?;
        mirror_new_transaction(&index_store, &transaction)?;
        println!(
            "  {} {} {}",
            transaction.date, transaction.category, transaction.amount
        );
    }

    println!("Success!");

    Ok(())
}

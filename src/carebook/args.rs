use carebook::model::Collection;
use carebook::query::{SortField, StatusFilter};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "carebook", version)]
#[command(about = "Browse and manage home-care reports and the patient register", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory holding Reports.json, patients.json and config.json
    /// (defaults to $CAREBOOK_HOME, then the platform data dir)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List visit reports
    #[command(alias = "r")]
    Reports {
        /// Text to look for in name, address, diagnosis or register number
        #[arg(short, long)]
        search: Option<String>,

        /// Exact form type (e.g. "NHC", "SOCIAL REPORT")
        #[arg(short, long)]
        form_type: Option<String>,

        /// First submission day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last submission day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Sort field: name, registernumber or submittedAt
        #[arg(long)]
        sort: Option<SortField>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Page to show
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// List registered patients
    #[command(alias = "p")]
    Patients {
        /// Text to look for in name, address, phone, diagnosis or register number
        #[arg(short, long)]
        search: Option<String>,

        /// Diagnosis to match exactly ("All" for any)
        #[arg(short, long)]
        diagnosis: Option<String>,

        /// all, active or inactive
        #[arg(long, default_value = "all")]
        status: StatusFilter,

        /// First registration day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last registration day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Sort field: name, registernumber or submittedAt
        #[arg(long)]
        sort: Option<SortField>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Page to show
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// Show every field of one record
    #[command(alias = "v")]
    Show {
        /// reports or patients
        collection: Collection,

        /// Record id
        id: String,
    },

    /// Permanently delete a record
    #[command(alias = "rm")]
    Delete {
        /// reports or patients
        collection: Collection,

        /// Record id
        id: String,

        /// Confirmation code
        #[arg(long)]
        code: String,
    },

    /// Print the detail-view path for a category and id
    Route {
        /// Report form type, or "patient"
        category: String,

        /// Record id
        id: String,
    },

    /// List the distinct diagnoses in the patient register
    Diagnoses,

    /// Get or set configuration
    Config {
        /// Configuration key (page-size, confirmation-code)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}

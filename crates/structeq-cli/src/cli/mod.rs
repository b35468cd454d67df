//! Clap CLI definition: root struct, subcommands, and shared argument groups.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use structeq_core::{CompareOptions, DEFAULT_EPSILON, DeepEqualsConfig, JsonShape};

/// A file argument, or `-` for standard input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathOrStdin {
    /// Read from standard input.
    Stdin,
    /// Read from the given filesystem path.
    Path(PathBuf),
}

impl PathOrStdin {
    /// Label used in messages: the path, or `-` for stdin.
    pub fn label(&self) -> String {
        match self {
            Self::Stdin => "-".to_owned(),
            Self::Path(path) => path.display().to_string(),
        }
    }
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(Self::Stdin)
        } else {
            Ok(Self::Path(PathBuf::from(s)))
        }
    }
}

/// Output format for results written to stdout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text (default).
    Human,
    /// A single JSON object per result.
    Json,
}

/// How JSON documents map onto comparable values.
#[derive(Args, Clone, Debug, Default)]
pub struct ShapeArgs {
    /// Treat JSON objects as records: member-wise comparison with field
    /// names in diagnostics.
    #[arg(long)]
    pub objects_as_records: bool,

    /// Treat JSON arrays as unordered collections.
    #[arg(long)]
    pub arrays_as_sets: bool,
}

impl ShapeArgs {
    /// The conversion settings these flags select.
    pub fn shape(&self) -> JsonShape {
        JsonShape {
            objects_as_records: self.objects_as_records,
            arrays_as_sets: self.arrays_as_sets,
        }
    }
}

/// Comparison tolerance, resource limits and diagnostics settings.
///
/// Every flag falls back to a `STRUCTEQ_*` environment variable; the flag
/// takes precedence.
#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    /// Relative tolerance for floating-point comparison.
    #[arg(long, env = "STRUCTEQ_EPSILON", default_value_t = DEFAULT_EPSILON)]
    pub epsilon: f64,

    /// Redact credential-like members and token-like text in diagnostics.
    #[arg(long, env = "STRUCTEQ_SECURE_ERRORS")]
    pub secure_errors: bool,

    /// Maximum traversal depth (the root is depth 0).
    #[arg(long, env = "STRUCTEQ_MAX_DEPTH")]
    pub max_depth: Option<usize>,

    /// Maximum element count of a list or set.
    #[arg(long, env = "STRUCTEQ_MAX_COLLECTION_SIZE")]
    pub max_collection_size: Option<usize>,

    /// Maximum array length.
    #[arg(long, env = "STRUCTEQ_MAX_ARRAY_SIZE")]
    pub max_array_size: Option<usize>,

    /// Maximum map entry count.
    #[arg(long, env = "STRUCTEQ_MAX_MAP_SIZE")]
    pub max_map_size: Option<usize>,

    /// Maximum member count of a record.
    #[arg(long, env = "STRUCTEQ_MAX_RECORD_FIELDS")]
    pub max_record_fields: Option<usize>,

    /// Container elements shown per value in diagnostics.
    #[arg(long, env = "STRUCTEQ_MAX_DISPLAY_ELEMENTS", default_value = "5")]
    pub max_display_elements: usize,

    /// Characters of text shown before truncation in diagnostics.
    #[arg(long, env = "STRUCTEQ_MAX_DISPLAY_TEXT", default_value = "100")]
    pub max_display_text: usize,
}

impl ConfigArgs {
    /// Engine configuration built from the flags.
    pub fn config(&self) -> DeepEqualsConfig {
        DeepEqualsConfig {
            epsilon: self.epsilon,
            secure_errors: self.secure_errors,
            max_collection_size: self.max_collection_size,
            max_array_size: self.max_array_size,
            max_map_size: self.max_map_size,
            max_record_fields: self.max_record_fields,
            max_depth: self.max_depth,
            max_display_elements: self.max_display_elements,
            max_display_text: self.max_display_text,
        }
    }
}

/// All subcommands exposed by the `structeq` binary.
#[derive(Subcommand)]
pub enum Command {
    /// Compare two JSON documents and describe the first difference.
    ///
    /// Exits 0 when the documents are equal and 1 when they differ.
    Compare {
        /// The expected document, or `-` for stdin.
        #[arg(value_name = "LEFT")]
        left: PathOrStdin,
        /// The actual document (cannot be `-` if LEFT is `-`).
        #[arg(value_name = "RIGHT")]
        right: PathOrStdin,
        /// Let numeric text match numbers ("1.50" equals 1.5).
        #[arg(long)]
        strings_match_numbers: bool,
        #[command(flatten)]
        shape: ShapeArgs,
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the structural hash of one or more JSON documents.
    ///
    /// Documents that compare equal print the same hash.
    Hash {
        /// Paths to JSON documents, or `-` for stdin (at most once).
        #[arg(value_name = "FILE", num_args = 1.., required = true)]
        files: Vec<PathOrStdin>,
        #[command(flatten)]
        shape: ShapeArgs,
    },
}

impl Command {
    /// Per-call comparison options for `compare`; defaults otherwise.
    pub fn options(&self) -> CompareOptions {
        match self {
            Self::Compare {
                strings_match_numbers: true,
                ..
            } => CompareOptions::strings_match_numbers(),
            Self::Compare { .. } | Self::Hash { .. } => CompareOptions::default(),
        }
    }
}

/// Root CLI struct for the `structeq` binary.
#[derive(Parser)]
#[command(
    name = "structeq",
    version,
    about = "Deep structural comparison of JSON documents",
    long_about = "Compares JSON documents structurally, with unordered collections,\n\
                  numeric tolerance and cycle-safe traversal, and explains the first\n\
                  difference found."
)]
pub struct Cli {
    /// Active subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Output format: human (default) or json.
    #[arg(long, short = 'f', default_value = "human", global = true)]
    pub format: OutputFormat,

    /// Only log errors to stderr (incompatible with `--verbose`).
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log comparison progress to stderr (incompatible with `--quiet`).
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Maximum input size in bytes per document.
    ///
    /// Can also be set via the `STRUCTEQ_MAX_FILE_SIZE` environment variable.
    #[arg(
        long,
        global = true,
        env = "STRUCTEQ_MAX_FILE_SIZE",
        default_value = "67108864"
    )]
    pub max_file_size: u64,
}

use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "bpbd-board",
    version,
    about = "disaster information board for BPBD Kabupaten Tapanuli Tengah",
    long_about = "bpbd-board reads the agency's shared spreadsheet and shows evacuees, deceased victims, helipad locations and shelter posts (posko), with search, category filters and paging.\n\nExamples:\n  bpbd-board evacuees -q budi\n  bpbd-board deceased -k \"tertimbun longsor\"\n  bpbd-board posko -q pandan -o posko.html\n  bpbd-board helipads --fixture ./fixtures/sheet.json -A json\n\nTip: Use --init-config to write ~/.bpbd-board/config.yml and keep sheet ranges there."
)]
pub struct CliArgs {
    #[arg(
        value_name = "VIEW",
        help = "View to show: evacuees, deceased, helipads or posko."
    )]
    pub view: Option<String>,

    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long = "q",
        visible_alias = "query",
        value_name = "TEXT",
        help_heading = "Filters",
        help = "Case-insensitive search across the view's columns."
    )]
    pub query: Option<String>,

    #[arg(
        short = 'k',
        long = "cat",
        visible_alias = "category",
        value_name = "VALUE",
        help_heading = "Filters",
        help = "Exact location (evacuees) or description (deceased); 'all' disables it."
    )]
    pub category: Option<String>,

    #[arg(
        short = 'p',
        long = "pg",
        visible_alias = "page",
        value_name = "N",
        help_heading = "Filters",
        help = "Page to show (1-based, 50 rows per page)."
    )]
    pub page: Option<usize>,

    #[arg(
        long = "cl",
        visible_alias = "collapse",
        value_name = "DISTRICTS",
        help_heading = "Filters",
        help = "Posko districts to show collapsed (comma-separated)."
    )]
    pub collapse: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.bpbd-board/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write the default config file if it does not exist, then exit."
    )]
    pub init_config: bool,

    #[arg(
        long = "fx",
        visible_alias = "fixture",
        value_name = "FILE",
        help_heading = "Input",
        help = "Read ranges from a local JSON snapshot instead of the live sheet."
    )]
    pub fixture: Option<String>,

    #[arg(
        long = "sid",
        visible_alias = "spreadsheet-id",
        value_name = "ID",
        help_heading = "Spreadsheet",
        help = "Spreadsheet id to read from."
    )]
    pub spreadsheet_id: Option<String>,

    #[arg(
        long = "key",
        visible_alias = "api-key",
        value_name = "KEY",
        help_heading = "Spreadsheet",
        help = "API key for the Sheets API."
    )]
    pub api_key: Option<String>,

    #[arg(
        short = 'T',
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "Spreadsheet",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'o',
        long = "out",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the rendered view to a file."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'A',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (text, json, html)."
    )]
    pub output_format: Option<String>,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,
}

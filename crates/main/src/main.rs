use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use grid_report::definition::ReportDefinition;
use grid_report::{GridReportService, PageFormat, PagedDataSource, ReportFormat, StreamProvider};

mod data;
mod logging;

/// Renders paginated grid reports to PDF or XLSX.
///
/// PDF output needs a TrueType font family. Put the Roboto fonts under
/// `assets/fonts` next to the binary, point `GRID_REPORT_FONTS_DIR` or
/// `--font-dir` at them, or install Liberation Sans.
#[derive(Parser)]
#[command(author, version, about = "Render grid reports to PDF or XLSX")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory holding the fonts used for PDF output.
    #[arg(long, global = true)]
    font_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a report from a JSON definition and a CSV file.
    Render(RenderArgs),

    /// Render a synthetic report.
    Demo(DemoArgs),
}

#[derive(Args)]
struct OutputArgs {
    #[arg(long, value_enum, default_value_t = FormatArg::Pdf)]
    format: FormatArg,

    #[arg(long, value_enum, default_value_t = PageFormatArg::A4)]
    page_format: PageFormatArg,

    /// Rows per data page.
    #[arg(long, default_value_t = 10)]
    page_size: usize,

    /// Text shown for missing values.
    #[arg(long)]
    null_string: Option<String>,
}

#[derive(Args)]
struct RenderArgs {
    /// JSON report definition.
    #[arg(long)]
    definition: PathBuf,

    /// CSV file whose header line names the fields.
    #[arg(long)]
    data: PathBuf,

    /// Overrides the definition's output path.
    #[arg(long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    output_args: OutputArgs,
}

#[derive(Args)]
struct DemoArgs {
    #[arg(long, default_value_t = 50)]
    rows: usize,

    /// Number of columns; the last two demonstrate missing values.
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u16).range(2..))]
    columns: u16,

    #[arg(long, default_value = "grid_report")]
    output: PathBuf,

    /// Print page numbers in the footer.
    #[arg(long)]
    page_numbers: bool,

    #[command(flatten)]
    output_args: OutputArgs,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Pdf,
    #[value(alias = "xlsx")]
    Excel,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Pdf => ReportFormat::Pdf,
            FormatArg::Excel => ReportFormat::Excel,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PageFormatArg {
    A4,
    A4Landscape,
    Letter,
    Legal,
}

impl From<PageFormatArg> for PageFormat {
    fn from(value: PageFormatArg) -> Self {
        match value {
            PageFormatArg::A4 => PageFormat::A4,
            PageFormatArg::A4Landscape => PageFormat::A4Landscape,
            PageFormatArg::Letter => PageFormat::Letter,
            PageFormatArg::Legal => PageFormat::Legal,
        }
    }
}

fn render(service: &GridReportService, args: RenderArgs) -> Result<PathBuf, Box<dyn Error>> {
    let mut definition = ReportDefinition::from_path(&args.definition)?;
    if let Some(output) = args.output {
        definition.output_file_path = Some(output);
    }
    if args.output_args.null_string.is_some() {
        definition.null_string = args.output_args.null_string;
    }
    let configuration = definition.into_configuration()?;

    let rows = data::csv_rows(&args.data)?;
    let mut source = PagedDataSource::new(args.output_args.page_size, StreamProvider::new(rows))?;
    let path = service.build(
        &configuration,
        &mut source,
        args.output_args.format.into(),
        args.output_args.page_format.into(),
    )?;
    Ok(path)
}

fn demo(service: &GridReportService, args: DemoArgs) -> Result<PathBuf, Box<dyn Error>> {
    let columns = usize::from(args.columns);
    let configuration = data::demo_configuration(
        &args.output,
        columns,
        args.output_args.null_string,
        args.page_numbers,
    )?;
    let mut source =
        PagedDataSource::from_rows(args.output_args.page_size, data::demo_rows(args.rows, columns))?;
    let path = service.build(
        &configuration,
        &mut source,
        args.output_args.format.into(),
        args.output_args.page_format.into(),
    )?;
    Ok(path)
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let service = GridReportService::new().with_font_dir(cli.font_dir);
    let result = match cli.command {
        Commands::Render(args) => render(&service, args),
        Commands::Demo(args) => demo(&service, args),
    };

    match result {
        Ok(path) => info!("report written to {}", path.display()),
        Err(err) => {
            eprintln!("Error: {}", err);
            print_error_sources(err.as_ref());
            std::process::exit(1);
        }
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}

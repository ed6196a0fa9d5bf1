mod client;
mod coord;
mod error;
mod form;
mod inspect;
mod profile;
mod questionnaire;
mod reader;
mod records;
mod report;
mod template;
mod writer;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "onboarding-filler")]
#[command(version, about = "Inspect, generate and fill application onboarding workbooks")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Print detailed progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarize every sheet of a workbook
    Analyze {
        /// Workbook to analyze (.xlsx, .xlsm or .xls)
        input: PathBuf,

        /// Also save the analysis as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// List cells that look like form labels and where their values go
    DetectFields {
        /// Workbook to scan
        input: PathBuf,

        /// Sheet to scan, repeatable (default: the questionnaire's form sheets)
        #[arg(short, long)]
        sheet: Vec<String>,

        /// Maximum fields printed per sheet
        #[arg(short, long, default_value_t = inspect::DEFAULT_FIELD_LIMIT)]
        limit: usize,
    },

    /// Generate an empty onboarding form workbook
    CreateTemplate {
        /// Output file
        #[arg(short, long, default_value = template::DEFAULT_OUTPUT)]
        output: PathBuf,
    },

    /// Print the user data summary from the query endpoint
    Fetch {
        #[command(flatten)]
        endpoint: EndpointArgs,
    },

    /// Build the onboarding form from endpoint data
    Draft {
        #[command(flatten)]
        endpoint: EndpointArgs,

        #[command(flatten)]
        profile: ProfileArgs,

        /// Also write the form into a freshly generated template
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fill the onboarding questionnaire with endpoint data
    Fill {
        /// Questionnaire template
        #[arg(short, long, env = "ONBOARDING_TEMPLATE", default_value = questionnaire::DEFAULT_TEMPLATE)]
        template: PathBuf,

        /// Output file (default: timestamped file in --output-dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory for the timestamped output file
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        #[command(flatten)]
        endpoint: EndpointArgs,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Read the values of a filled onboarding form
    Read {
        /// Onboarding form workbook
        input: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct EndpointArgs {
    /// User data query endpoint
    #[arg(long, env = "ONBOARDING_QUERY_URL", default_value = client::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

impl EndpointArgs {
    fn client(&self) -> client::QueryClient {
        client::QueryClient::new(self.endpoint.as_str(), Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// JSON file overriding the literal questionnaire answers
    #[arg(long, env = "ONBOARDING_PROFILE")]
    pub profile: Option<PathBuf>,
}

impl ProfileArgs {
    fn load(&self) -> error::Result<profile::ApplicationProfile> {
        profile::ApplicationProfile::load(self.profile.as_deref())
    }
}

#[derive(Serialize)]
struct DraftReport {
    sailpoint_onboarding_form: form::OnboardingForm,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_file: Option<String>,
}

#[derive(Serialize)]
struct FormReport {
    form_data: form::FormData,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "onboarding_filler=debug"
    } else {
        "onboarding_filler=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(command: Command) -> error::Result<()> {
    match command {
        Command::Analyze { input, json } => {
            tracing::info!(path = %input.display(), "analyzing workbook");
            let workbook = reader::open_workbook(&input)?;
            let analysis = inspect::analyze(&workbook);
            inspect::render_analysis(&workbook, &analysis, io::stdout().lock())?;

            if let Some(json_path) = json {
                let file = std::fs::File::create(&json_path)?;
                serde_json::to_writer_pretty(file, &analysis)?;
                println!("Analysis saved to: {}", json_path.display());
            }
            Ok(())
        }
        Command::DetectFields {
            input,
            sheet,
            limit,
        } => {
            let workbook = reader::open_workbook(&input)?;
            let sheet_names: Vec<String> = if sheet.is_empty() {
                inspect::DEFAULT_FORM_SHEETS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            } else {
                sheet
            };

            let mut out = io::stdout().lock();
            for name in &sheet_names {
                let Some(ws) = workbook.get_sheet_by_name(name) else {
                    tracing::debug!(sheet = %name, "sheet not present, skipping");
                    continue;
                };
                let fields = inspect::detect_fields(ws);
                inspect::render_fields(&mut out, name, &fields, limit)?;
            }
            Ok(())
        }
        Command::CreateTemplate { output } => {
            report::emit(template::create_template(&output), io::stdout().lock())
        }
        Command::Fetch { endpoint } => {
            report::emit(endpoint.client().fetch_user_data(), io::stdout().lock())
        }
        Command::Draft {
            endpoint,
            profile,
            output,
        } => {
            let result = draft(&endpoint, &profile, output);
            report::emit(result, io::stdout().lock())
        }
        Command::Fill {
            template,
            output,
            output_dir,
            endpoint,
            profile,
        } => {
            let result = profile.load().and_then(|profile| {
                let request = questionnaire::FillRequest {
                    template: &template,
                    output: output.as_deref(),
                    output_dir: &output_dir,
                    profile: &profile,
                };
                questionnaire::fill(&request, &endpoint.client())
            });
            report::emit(result, io::stdout().lock())
        }
        Command::Read { input } => {
            let result = form::read_form(&input).map(|form_data| FormReport { form_data });
            report::emit(result, io::stdout().lock())
        }
    }
}

fn draft(
    endpoint: &EndpointArgs,
    profile: &ProfileArgs,
    output: Option<PathBuf>,
) -> error::Result<DraftReport> {
    let profile = profile.load()?;
    let data = endpoint.client().fetch_user_data()?;
    let onboarding_form = form::OnboardingForm::draft(&data, &profile);

    let output_file = match output {
        Some(path) => {
            form::write_draft(&onboarding_form, &path)?;
            Some(path.display().to_string())
        }
        None => None,
    };

    Ok(DraftReport {
        sailpoint_onboarding_form: onboarding_form,
        output_file,
    })
}

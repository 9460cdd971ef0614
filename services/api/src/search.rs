use crate::infra::build_search_service;
use clap::{Args, Subcommand};
use truck_finder::config::AppConfig;
use truck_finder::error::AppError;
use truck_finder::telemetry;
use truck_finder::trucks::{ApplicantSearch, FoodTruck, NearestSearch, StreetSearch};

#[derive(Subcommand, Debug)]
pub(crate) enum SearchCommand {
    /// Fuzzy match on the permit applicant name
    Applicant(ApplicantArgs),
    /// Substring match on the street address
    Street(StreetArgs),
    /// Permits in the same whole-degree cell as a point, ordered by applicant
    Nearest(NearestArgs),
}

#[derive(Args, Debug)]
pub(crate) struct ApplicantArgs {
    /// Applicant name fragment
    #[arg(long)]
    pub(crate) name: String,
    /// Permit status (APPROVED, REQUESTED, ... or ALL)
    #[arg(long)]
    pub(crate) status: Option<String>,
    #[command(flatten)]
    pub(crate) output: OutputArgs,
}

#[derive(Args, Debug)]
pub(crate) struct StreetArgs {
    /// Street address fragment
    #[arg(long)]
    pub(crate) query: String,
    #[command(flatten)]
    pub(crate) output: OutputArgs,
}

#[derive(Args, Debug)]
pub(crate) struct NearestArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) lat: String,
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) lng: String,
    /// Maximum number of permits to return (clamped to 1..=100)
    #[arg(long)]
    pub(crate) limit: Option<String>,
    /// Permit status, defaults to APPROVED; ALL disables the filter
    #[arg(long)]
    pub(crate) status: Option<String>,
    #[command(flatten)]
    pub(crate) output: OutputArgs,
}

#[derive(Args, Debug, Default)]
pub(crate) struct OutputArgs {
    /// Print the raw JSON records instead of a summary table
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_search(command: SearchCommand) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let service = build_search_service(&config.upstream)?;

    let (trucks, output) = match command {
        SearchCommand::Applicant(args) => {
            let search =
                ApplicantSearch::new(Some(args.name.as_str()), args.status.as_deref())?;
            (service.search_by_applicant(&search).await?, args.output)
        }
        SearchCommand::Street(args) => {
            let search = StreetSearch::new(Some(args.query.as_str()))?;
            (service.search_by_street(&search).await?, args.output)
        }
        SearchCommand::Nearest(args) => {
            let search = NearestSearch::from_raw(
                Some(args.lat.as_str()),
                Some(args.lng.as_str()),
                args.limit.as_deref(),
                args.status.as_deref(),
            )?;
            (service.find_nearest(&search).await?, args.output)
        }
    };

    if output.json {
        let rendered = serde_json::to_string_pretty(&trucks).map_err(std::io::Error::from)?;
        println!("{rendered}");
    } else {
        print!("{}", render_table(&trucks));
    }
    Ok(())
}

fn render_table(trucks: &[FoodTruck]) -> String {
    if trucks.is_empty() {
        return "No permits matched.\n".to_string();
    }

    let mut out = format!("{} permit(s)\n", trucks.len());
    for truck in trucks {
        let position = match truck.coordinates() {
            Some((lat, lng)) => format!("{lat:.5}, {lng:.5}"),
            None => "-".to_string(),
        };
        out.push_str(&format!(
            "- {} [{}] {} ({})\n",
            truck.applicant.as_deref().unwrap_or("(unnamed)"),
            truck.status.as_deref().unwrap_or("UNKNOWN"),
            truck.address.as_deref().unwrap_or("no address"),
            position
        ));
    }
    out
}

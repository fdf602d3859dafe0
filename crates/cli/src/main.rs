use anyhow::Context;
use clap::{Parser, Subcommand};
use clinic_core::models::{AppointmentStatus, DrugBody, DrugCategory, DrugFilters};
use clinic_core::schema::{AppointmentStatusForm, PredictForm};
use clinic_core::{ApiClient, Attachment, ClientConfig, FormBody, RawForm, StatusChange};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Clinic admin API command line client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Drug catalogue
    Drugs {
        #[command(subcommand)]
        command: DrugCommands,
    },
    /// Appointments
    Appointments {
        #[command(subcommand)]
        command: AppointmentCommands,
    },
    /// Patients
    Patients {
        #[command(subcommand)]
        command: PatientCommands,
    },
    /// Medical records
    Records {
        #[command(subcommand)]
        command: RecordCommands,
    },
    /// Classify a retinal image
    Predict {
        /// Path to the image file
        image: PathBuf,
        /// Number of ranked labels to return
        #[arg(long)]
        top_k: Option<i64>,
    },
}

#[derive(Subcommand)]
enum DrugCommands {
    /// List drugs
    List {
        #[arg(long)]
        search: Option<String>,
        /// Category wire name, e.g. EYE_DROPS
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        in_stock: Option<bool>,
    },
    /// Create a drug
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        unit: String,
        #[arg(long)]
        category: String,
        #[arg(long)]
        stock: Option<i64>,
        #[arg(long)]
        manufacturer: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Product image to upload
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Delete a drug
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum AppointmentCommands {
    /// Appointments scheduled today
    Today,
    /// Change an appointment's status
    Status { id: i64, status: String },
}

#[derive(Subcommand)]
enum PatientCommands {
    /// Look up the patient profile of a user account
    ByUser { user_id: i64 },
}

#[derive(Subcommand)]
enum RecordCommands {
    /// Whether an appointment already has a medical record
    Check { appointment_id: i64 },
}

fn attachment(path: Option<&PathBuf>) -> anyhow::Result<Option<Attachment>> {
    path.map(|p| {
        Attachment::from_path(p).with_context(|| format!("reading {}", p.display()))
    })
    .transpose()
}

fn drug_form(command: &DrugCommands) -> anyhow::Result<RawForm> {
    let DrugCommands::Create {
        name,
        price,
        unit,
        category,
        stock,
        manufacturer,
        description,
        image,
    } = command
    else {
        anyhow::bail!("not a create command");
    };
    Ok(RawForm::new()
        .with("name", name.as_str())
        .with("price", *price)
        .with("unit", unit.as_str())
        .with("category", category.as_str())
        .with("stock_quantity", *stock)
        .with("manufacturer", manufacturer.clone())
        .with("description", description.clone())
        .with("image", attachment(image.as_ref())?))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(client: ApiClient, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Drugs { command } => match command {
            DrugCommands::List {
                search,
                category,
                in_stock,
            } => {
                let category = category
                    .map(|c| c.parse::<DrugCategory>())
                    .transpose()
                    .map_err(anyhow::Error::msg)?;
                let filters = DrugFilters {
                    search,
                    category,
                    in_stock,
                };
                let drugs = client.drugs().list(&filters).await?;
                if drugs.is_empty() {
                    println!("No drugs found.");
                }
                for drug in drugs {
                    println!(
                        "ID: {}, Name: {}, Category: {}, Stock: {} {}",
                        drug.drug_id, drug.name, drug.category, drug.stock_quantity, drug.unit
                    );
                }
            }
            create @ DrugCommands::Create { .. } => {
                let body = DrugBody::from_form(&drug_form(&create)?)?;
                let drug = client.drugs().create(&body).await?;
                println!("Created drug with ID: {}", drug.drug_id);
            }
            DrugCommands::Delete { id } => {
                client.drugs().delete(id).await?;
                println!("Deleted drug {id}");
            }
        },
        Commands::Appointments { command } => match command {
            AppointmentCommands::Today => {
                for a in client.appointments().today().await? {
                    println!(
                        "ID: {}, Patient: {}, At: {}, Type: {}, Status: {}",
                        a.appointment_id, a.patient_id, a.scheduled_at, a.appointment_type, a.status
                    );
                }
            }
            AppointmentCommands::Status { id, status } => {
                let form = RawForm::new().with("status", status);
                let AppointmentStatusForm { status } = AppointmentStatusForm::from_form(&form)?;
                let appointment = client
                    .appointments()
                    .update_status(StatusChange::<AppointmentStatus>::new(id, status))
                    .await?;
                println!(
                    "Appointment {} is now {}",
                    appointment.appointment_id, appointment.status
                );
            }
        },
        Commands::Patients {
            command: PatientCommands::ByUser { user_id },
        } => print_json(&client.patients().by_user(user_id).await?)?,
        Commands::Records {
            command: RecordCommands::Check { appointment_id },
        } => {
            let check = client.medical_records().check(appointment_id).await?;
            match check.record_id {
                Some(id) if check.exists => println!("Appointment {appointment_id} has record {id}"),
                _ => println!("Appointment {appointment_id} has no record"),
            }
        }
        Commands::Predict { image, top_k } => {
            let form = RawForm::new()
                .with("image", attachment(Some(&image))?)
                .with("top_k", top_k);
            let form = PredictForm::from_form(&form)?;
            let result = client.predict().predict(&form).await?;
            for p in &result.predictions {
                println!("{:<26} {:.3}", p.label, p.probability);
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'clinic --help' for commands");
        return Ok(());
    };

    let config = ClientConfig::from_env_values(
        std::env::var("CLINIC_API_URL").ok(),
        std::env::var("CLINIC_API_TOKEN").ok(),
        std::env::var("CLINIC_API_TIMEOUT_SECS").ok(),
    )?;
    tracing::debug!(base_url = config.base_url(), "using backend");
    run(ApiClient::from_config(config)?, command).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_arguments_parse_into_drug_body() {
        let cli = Cli::try_parse_from([
            "clinic", "drugs", "create", "--name", "Atropine", "--price", "12.5", "--unit",
            "bottle", "--category", "EYE_DROPS",
        ])
        .unwrap();
        let Some(Commands::Drugs { command }) = cli.command else {
            panic!("expected drugs command");
        };
        let body = DrugBody::from_form(&drug_form(&command).unwrap()).unwrap();
        assert_eq!(body.price, 12.5);
        assert_eq!(body.stock_quantity, 0);
        assert_eq!(body.category, DrugCategory::EyeDrops);
    }

    #[test]
    fn test_negative_price_is_rejected_before_sending() {
        let cli = Cli::try_parse_from([
            "clinic", "drugs", "create", "--name", "Atropine", "--price=-1", "--unit",
            "bottle", "--category", "EYE_DROPS",
        ])
        .unwrap();
        let Some(Commands::Drugs { command }) = cli.command else {
            panic!("expected drugs command");
        };
        let err = DrugBody::from_form(&drug_form(&command).unwrap()).unwrap_err();
        assert!(err.has_field("price"));
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let form = RawForm::new().with("status", "ARCHIVED");
        let err = AppointmentStatusForm::from_form(&form).unwrap_err();
        assert!(err.has_field("status"));
    }
}

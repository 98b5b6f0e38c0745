use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tinaco_client::api::containers::{ContainerUpdate, NewContainer};
use tinaco_client::api::dispensers::{DispenserUpdate, NewDispenser};
use tinaco_client::api::recommendations::PhotoUpload;
use tinaco_client::api::sensors::{NewSensor, SensorUpdate};
use tinaco_client::{
    ApiClient, ApiError, ContainerLink, CredentialStore, DispenserDetail, FileCredentialStore,
    Gateway, MemoryCredentialStore, SensorDetail,
};
use tinaco_core::{Container, ContainerId, Dispenser, DispenserId, Recommendation, Sensor, SensorId};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::{ApiConfig, Config, CredentialConfig};

#[derive(Parser)]
#[command(name = "tinaco")]
#[command(about = "Water container monitoring from the terminal")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "tinaco.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session credential
    Login { email: String, password: String },
    /// Create an account and store its first session credential
    Register {
        name: String,
        email: String,
        password: String,
    },
    /// Forget the stored credential
    Logout,
    /// Manage water containers
    Containers {
        #[command(subcommand)]
        command: ContainerCommand,
    },
    /// Manage sensors
    Sensors {
        #[command(subcommand)]
        command: SensorCommand,
    },
    /// Manage dispensers
    Dispensers {
        #[command(subcommand)]
        command: DispenserCommand,
    },
    /// Ask for a recommendation for a container
    Recommend {
        container: i64,
        /// JPEG to base the recommendation on instead of the stored profile
        #[arg(long)]
        photo: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ContainerCommand {
    List,
    Get {
        id: i64,
    },
    Create {
        /// e.g. "Alberca", "Tinaco", "Contenedor"
        #[arg(long)]
        kind: String,
        #[arg(long)]
        location: String,
        /// Capacity in liters
        #[arg(long)]
        capacity: u32,
    },
    Update {
        id: i64,
        #[arg(long)]
        kind: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        capacity: u32,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum SensorCommand {
    List {
        /// Also resolve each sensor's parent container
        #[arg(long)]
        detailed: bool,
    },
    Get {
        id: i64,
    },
    Create {
        /// e.g. "Sensor de pH", "Sensor de TDS"
        #[arg(long)]
        kind: String,
        /// Container the sensor is mounted on
        #[arg(long)]
        container: Option<i64>,
    },
    Update {
        id: i64,
        #[arg(long)]
        kind: String,
        #[arg(long)]
        container: Option<i64>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum DispenserCommand {
    List {
        /// Also resolve each dispenser's parent container
        #[arg(long)]
        detailed: bool,
    },
    Get {
        id: i64,
    },
    Create {
        /// e.g. "Dispensador de pH", "Dispensador de TDS"
        #[arg(long)]
        kind: String,
        #[arg(long)]
        container: Option<i64>,
    },
    Update {
        id: i64,
        #[arg(long)]
        kind: String,
        #[arg(long)]
        container: Option<i64>,
    },
    Delete {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = if cli.config.exists() {
        info!(path = ?cli.config, "Loading configuration");
        Config::load(&cli.config)?
    } else {
        info!("No configuration file found, using defaults");
        Config::default()
    };

    match config.credentials {
        CredentialConfig::File { path } => {
            let store = FileCredentialStore::new(path);
            run(cli.command, config.api, store).await
        }
        CredentialConfig::Memory => {
            let store = MemoryCredentialStore::new();
            run(cli.command, config.api, store).await
        }
    }
}

async fn run<S: CredentialStore>(
    command: Command,
    api: ApiConfig,
    store: S,
) -> color_eyre::Result<()> {
    let gateway =
        Gateway::new(api.base_url, store).with_timeout(Duration::from_secs(api.timeout_secs));
    let client = ApiClient::with_gateway(gateway);

    match command {
        Command::Login { email, password } => match client.login(&email, &password).await {
            Ok(credential) => {
                client.credentials().save(&credential).await?;
                println!("Signed in.");
            }
            Err(error) => fail(&error),
        },

        Command::Register {
            name,
            email,
            password,
        } => match client.register(&name, &email, &password).await {
            Ok(credential) => {
                client.credentials().save(&credential).await?;
                println!("Account created and signed in.");
            }
            Err(error) => fail(&error),
        },

        Command::Logout => {
            client.credentials().clear().await?;
            println!("Signed out.");
        }

        Command::Containers { command } => run_containers(command, &client).await,

        Command::Sensors { command } => run_sensors(command, &client).await,

        Command::Dispensers { command } => run_dispensers(command, &client).await,

        Command::Recommend { container, photo } => {
            let container = ContainerId(container);
            let outcome = match photo {
                Some(path) => {
                    let bytes = tokio::fs::read(&path).await?;
                    client
                        .photo_recommendation(container, PhotoUpload::jpeg(bytes))
                        .await
                }
                None => client.recommendation(container).await,
            };

            match outcome {
                Ok(recommendation) => print_recommendation(&recommendation),
                Err(error) => fail(&error),
            }
        }
    }

    Ok(())
}

async fn run_containers<S: CredentialStore>(command: ContainerCommand, client: &ApiClient<S>) {
    match command {
        ContainerCommand::List => match client.list_containers().await {
            Ok(containers) if containers.is_empty() => println!("No containers yet."),
            Ok(containers) => {
                for container in &containers {
                    print_container(container);
                }
            }
            Err(error) => fail(&error),
        },

        ContainerCommand::Get { id } => match client.get_container(ContainerId(id)).await {
            Ok(container) => print_container(&container),
            Err(error) => fail(&error),
        },

        ContainerCommand::Create {
            kind,
            location,
            capacity,
        } => {
            let new = NewContainer {
                kind,
                location,
                capacity_liters: capacity,
            };
            match client.create_container(&new).await {
                Ok(container) => {
                    println!("Created:");
                    print_container(&container);
                }
                Err(error) => fail(&error),
            }
        }

        ContainerCommand::Update {
            id,
            kind,
            location,
            capacity,
        } => {
            let update = ContainerUpdate {
                kind,
                location,
                capacity_liters: capacity,
            };
            match client.update_container(ContainerId(id), &update).await {
                Ok(container) => {
                    println!("Updated:");
                    print_container(&container);
                }
                Err(error) => fail(&error),
            }
        }

        ContainerCommand::Delete { id } => match client.delete_container(ContainerId(id)).await {
            Ok(()) => println!("Deleted container #{id}."),
            Err(error) => fail(&error),
        },
    }
}

async fn run_sensors<S: CredentialStore>(command: SensorCommand, client: &ApiClient<S>) {
    match command {
        SensorCommand::List { detailed: true } => match client.list_sensors_detailed().await {
            Ok(details) if details.is_empty() => println!("No sensors yet."),
            Ok(details) => {
                for detail in &details {
                    print_sensor_detail(detail);
                }
            }
            Err(error) => fail(&error),
        },

        SensorCommand::List { detailed: false } => match client.list_sensors().await {
            Ok(sensors) if sensors.is_empty() => println!("No sensors yet."),
            Ok(sensors) => {
                for sensor in &sensors {
                    print_sensor(sensor);
                }
            }
            Err(error) => fail(&error),
        },

        SensorCommand::Get { id } => match client.sensor_detail(SensorId(id)).await {
            Ok(detail) => print_sensor_detail(&detail),
            Err(error) => fail(&error),
        },

        SensorCommand::Create { kind, container } => {
            let new = NewSensor {
                kind,
                container_id: container.map(ContainerId),
            };
            match client.create_sensor(&new).await {
                Ok(sensor) => {
                    println!("Created:");
                    print_sensor(&sensor);
                }
                Err(error) => fail(&error),
            }
        }

        SensorCommand::Update {
            id,
            kind,
            container,
        } => {
            let update = SensorUpdate {
                kind,
                container_id: container.map(ContainerId),
            };
            match client.update_sensor(SensorId(id), &update).await {
                Ok(sensor) => {
                    println!("Updated:");
                    print_sensor(&sensor);
                }
                Err(error) => fail(&error),
            }
        }

        SensorCommand::Delete { id } => match client.delete_sensor(SensorId(id)).await {
            Ok(()) => println!("Deleted sensor #{id}."),
            Err(error) => fail(&error),
        },
    }
}

async fn run_dispensers<S: CredentialStore>(command: DispenserCommand, client: &ApiClient<S>) {
    match command {
        DispenserCommand::List { detailed: true } => {
            match client.list_dispensers_detailed().await {
                Ok(details) if details.is_empty() => println!("No dispensers yet."),
                Ok(details) => {
                    for detail in &details {
                        print_dispenser_detail(detail);
                    }
                }
                Err(error) => fail(&error),
            }
        }

        DispenserCommand::List { detailed: false } => match client.list_dispensers().await {
            Ok(dispensers) if dispensers.is_empty() => println!("No dispensers yet."),
            Ok(dispensers) => {
                for dispenser in &dispensers {
                    print_dispenser(dispenser);
                }
            }
            Err(error) => fail(&error),
        },

        DispenserCommand::Get { id } => match client.dispenser_detail(DispenserId(id)).await {
            Ok(detail) => print_dispenser_detail(&detail),
            Err(error) => fail(&error),
        },

        DispenserCommand::Create { kind, container } => {
            let new = NewDispenser {
                kind,
                container_id: container.map(ContainerId),
            };
            match client.create_dispenser(&new).await {
                Ok(dispenser) => {
                    println!("Created:");
                    print_dispenser(&dispenser);
                }
                Err(error) => fail(&error),
            }
        }

        DispenserCommand::Update {
            id,
            kind,
            container,
        } => {
            let update = DispenserUpdate {
                kind,
                container_id: container.map(ContainerId),
            };
            match client.update_dispenser(DispenserId(id), &update).await {
                Ok(dispenser) => {
                    println!("Updated:");
                    print_dispenser(&dispenser);
                }
                Err(error) => fail(&error),
            }
        }

        DispenserCommand::Delete { id } => match client.delete_dispenser(DispenserId(id)).await {
            Ok(()) => println!("Deleted dispenser #{id}."),
            Err(error) => fail(&error),
        },
    }
}

fn print_container(container: &Container) {
    println!(
        "#{} {} at {} ({} L)",
        container.id, container.kind, container.location, container.capacity_liters
    );
}

fn print_sensor(sensor: &Sensor) {
    match sensor.container_id {
        Some(container) => println!("#{} {} (container #{container})", sensor.id, sensor.kind),
        None => println!("#{} {} (unassigned)", sensor.id, sensor.kind),
    }
}

fn print_dispenser(dispenser: &Dispenser) {
    match dispenser.container_id {
        Some(container) => println!(
            "#{} {} (container #{container})",
            dispenser.id, dispenser.kind
        ),
        None => println!("#{} {} (unassigned)", dispenser.id, dispenser.kind),
    }
}

fn print_sensor_detail(detail: &SensorDetail) {
    println!(
        "#{} {} -> {}",
        detail.sensor.id,
        detail.sensor.kind,
        describe_link(&detail.container)
    );
}

fn print_dispenser_detail(detail: &DispenserDetail) {
    println!(
        "#{} {} -> {}",
        detail.dispenser.id,
        detail.dispenser.kind,
        describe_link(&detail.container)
    );
}

fn describe_link(link: &ContainerLink) -> String {
    match link {
        ContainerLink::Details(container) => format!(
            "{} at {} ({} L)",
            container.kind, container.location, container.capacity_liters
        ),
        ContainerLink::Unavailable(id) => format!("container #{id} (details unavailable)"),
        ContainerLink::Unassigned => "unassigned".to_string(),
    }
}

fn print_recommendation(recommendation: &Recommendation) {
    println!(
        "For a {} of {} L:",
        recommendation.container_kind, recommendation.container_capacity_liters
    );
    println!("{}", recommendation.advice);
}

fn fail(error: &ApiError) -> ! {
    match error {
        ApiError::AuthMissing => {
            eprintln!("Not signed in. Run `tinaco login <email> <password>` first.");
        }
        ApiError::Client { status: 401, .. } => {
            eprintln!("The server rejected the session (401). Sign in again with `tinaco login`.");
        }
        ApiError::Client { status, message } => {
            eprintln!("Request rejected ({status}): {message}");
        }
        ApiError::Server {
            status: Some(status),
            message,
        } => {
            eprintln!("Server failure ({status}): {message}");
            eprintln!("The service may be waking up; try again in a moment.");
        }
        ApiError::Server {
            status: None,
            message,
        } => {
            eprintln!("Could not reach the server: {message}");
        }
        ApiError::Malformed(detail) => {
            eprintln!("The server answered in an unexpected shape: {detail}");
        }
    }

    std::process::exit(1);
}

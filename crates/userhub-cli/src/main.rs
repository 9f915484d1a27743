use std::sync::Arc;

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand};
use dialoguer::Password;
use dotenvy::dotenv;
use userhub_auth::{Authenticator, KeyStore};
use userhub_cli::{DEFAULT_ROLES, gen_token, user_add, users_json};
use userhub_config::{AuthConfig, DatabaseConfig};
use userhub_core::password::DEFAULT_COST;
use userhub_db::{PgUserRepository, init_db_pool, run_migrations};

#[derive(Parser)]
#[command(name = "userhub-admin")]
#[command(about = "userhub admin - Administrative tools for the userhub API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update the database schema
    Migrate,
    /// Add a new user
    Useradd {
        /// Display name
        name: String,

        /// Email address
        email: String,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Roles to grant
        #[arg(short = 'r', long, value_delimiter = ',', default_values_t = DEFAULT_ROLES.map(String::from))]
        roles: Vec<String>,
    },
    /// List every user as JSON
    Users,
    /// Generate a token for a user
    Gentoken {
        /// Id of the user the token is for
        user_id: String,

        /// Roles to put in the token instead of the stored ones
        #[arg(short = 'r', long, value_delimiter = ',')]
        roles: Option<Vec<String>>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    let db_config = DatabaseConfig::from_env().context("loading database config")?;
    let pool = init_db_pool(&db_config)
        .await
        .context("connecting to database")?;
    let repo = PgUserRepository::new(pool.clone());

    match cli.command {
        Commands::Migrate => {
            run_migrations(&pool).await.context("running migrations")?;
            println!("migrations complete");
        }
        Commands::Useradd {
            name,
            email,
            password,
            roles,
        } => {
            let password = match password {
                Some(password) => password,
                None => Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords don't match")
                    .interact()
                    .context("reading password")?,
            };

            let user = user_add(&repo, name, email, password, roles, DEFAULT_COST, Utc::now()).await?;
            println!("user id: {}", user.id);
        }
        Commands::Users => {
            println!("{}", users_json(&repo).await?);
        }
        Commands::Gentoken { user_id, roles } => {
            let auth_config = AuthConfig::from_env().context("loading auth config")?;
            let keys = KeyStore::from_dir(&auth_config.keys_folder).with_context(|| {
                format!("loading keys from {}", auth_config.keys_folder.display())
            })?;
            let auth = Authenticator::new(Arc::new(keys), &auth_config)
                .context("constructing authenticator")?;

            let token = gen_token(
                &repo,
                &auth,
                &user_id,
                roles,
                userhub_auth::jwt::now_unix(),
            )
            .await?;
            println!("{}", token);
        }
    }

    Ok(())
}

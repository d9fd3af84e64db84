use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input};
use dotenvy::dotenv;

use pumpfiction::cli::{create_admin, mint_token, seed_users, set_user_role};
use pumpfiction::modules::role_applications::service::RoleApplicationService;
use pumpfiction::state::init_stores;
use pumpfiction_config::{JwtConfig, RoleSyncConfig, StorageBackend};
use pumpfiction_models::Role;

#[derive(Parser)]
#[command(name = "pumpfiction-cli")]
#[command(about = "Pump-Fiction CLI - Administrative tools for the Pump-Fiction API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an admin account
    CreateAdmin {
        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Display name
        #[arg(short = 'n', long)]
        full_name: Option<String>,
    },
    /// Overwrite a user's role
    SetRole {
        #[arg(short = 'e', long)]
        email: String,

        /// One of admin, normal_user, trainer, seller
        #[arg(short = 'r', long)]
        role: Role,

        /// Skip the confirmation prompt when granting admin
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Retry the role write for approved applications that never landed
    ReconcileRoleSync,
    /// Insert fake normal users
    Seed {
        #[arg(short = 'u', long, default_value = "20")]
        users: usize,
    },
    /// Print a signed access token for an existing user
    MintToken {
        #[arg(short = 'e', long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let (users, applications) = init_stores(StorageBackend::Postgres)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::CreateAdmin { email, full_name } => {
            let email = match email {
                Some(email) => email,
                None => Input::new().with_prompt("Email address").interact_text()?,
            };
            let full_name = match full_name {
                Some(name) => name,
                None => Input::new().with_prompt("Full name").interact_text()?,
            };

            let admin = create_admin(users.as_ref(), &email, &full_name)
                .await
                .map_err(|e| e.error)?;
            println!("\n✅ Admin created successfully!");
            println!("   ID: {}", admin.id);
            println!("   Email: {}", admin.email);
        }
        Commands::SetRole { email, role, yes } => {
            if role == Role::Admin && !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Grant admin to {email}?"))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("Aborted.");
                    return Ok(());
                }
            }

            let (previous, user) = set_user_role(users.as_ref(), &email, role)
                .await
                .map_err(|e| e.error)?;
            println!("✅ {} is now {} (was {})", user.email, user.role, previous);
        }
        Commands::ReconcileRoleSync => {
            let service =
                RoleApplicationService::new(applications, users, RoleSyncConfig::from_env());
            let report = service.reconcile_role_sync().await?;

            println!("Attempted: {}", report.attempted);
            println!("Synced:    {}", report.synced);
            if report.still_pending.is_empty() {
                println!("✅ Nothing left to reconcile");
            } else {
                println!("❌ Still pending:");
                for id in &report.still_pending {
                    println!("   {id}");
                }
                std::process::exit(1);
            }
        }
        Commands::Seed { users: count } => {
            let seeded = seed_users(users.as_ref(), count)
                .await
                .map_err(|e| e.error)?;
            println!("✅ Seeded {} users", seeded.len());
        }
        Commands::MintToken { email } => {
            let token = mint_token(users.as_ref(), &JwtConfig::from_env(), &email)
                .await
                .map_err(|e| e.error)?;
            println!("{token}");
        }
    }

    Ok(())
}

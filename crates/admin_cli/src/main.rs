use clap::{Args, Parser, Subcommand};
use engine::Engine;
use migration::MigratorTrait;
use sea_orm::Database;

#[derive(Parser, Debug)]
#[command(name = "splitpot_admin")]
#[command(about = "Admin utilities for Splitpot (bootstrap user accounts)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./splitpot.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    List,
    Delete(UserDeleteArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    avatar_url: Option<String>,
}

#[derive(Args, Debug)]
struct UserDeleteArgs {
    #[arg(long)]
    id: uuid::Uuid,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = Database::connect(&cli.database_url).await?;
    migration::Migrator::up(&db, None).await?;
    let engine = Engine::builder().database(db).build();

    match cli.command {
        Command::User(user) => match user.command {
            UserCommand::Create(args) => {
                let user = engine
                    .create_user(
                        &args.name,
                        &args.email,
                        args.avatar_url.as_deref(),
                        chrono::Utc::now(),
                    )
                    .await?;
                println!("created user {} <{}> ({})", user.name, user.email, user.id);
            }
            UserCommand::List => {
                for user in engine.list_users().await? {
                    println!("{}  {} <{}>", user.id, user.name, user.email);
                }
            }
            UserCommand::Delete(args) => {
                engine.delete_user(args.id).await?;
                println!("deleted user {}", args.id);
            }
        },
    }

    Ok(())
}

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use souk::prelude::*;
use souk::session::GENERIC_MESSAGE;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "marketplace")]
#[command(about = "Browse and sell on the Souk marketplace from a terminal", long_about = None)]
struct Cli {
    /// API root. Overrides SOUK_BASE_URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Session file. Overrides SOUK_STORE_PATH.
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        email: String,
        #[arg(long, env = "SOUK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Email a password reset link
    ForgotPassword { email: String },
    /// List products
    Products {
        #[arg(long)]
        search: Option<String>,
        /// Only my live listings
        #[arg(long)]
        mine: bool,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Print the news feed
    Feed {
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Publish a listing
    Sell {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        price: String,
        #[arg(long)]
        location: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Photos to upload
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Delete one of my listings
    Delete { id: String },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    souk::telemetry::init("souk=warn,marketplace=info");
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", describe(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), SoukError> {
    let mut builder = SoukClientBuilder::from_env();
    if let Some(url) = cli.base_url {
        builder = builder.base_url(url);
    }
    if let Some(path) = cli.store {
        builder = builder.store_path(path);
    }
    let client = builder.build()?;
    let session = client.start().await;

    match cli.command {
        Commands::Login { email, password } => {
            client.session().login(&email, &password).await?;
            let name = client
                .session()
                .current_user()
                .map(|u| u.display_name())
                .unwrap_or(email);
            println!("Signed in as {name}");
        }
        Commands::Logout => {
            client.session().logout().await;
            println!("Signed out");
        }
        Commands::Whoami => match session.user {
            Some(user) => println!("{} <{}>", user.display_name(), user.email),
            None if session.is_authenticated => println!("Signed in (profile unavailable)"),
            None => println!("Not signed in"),
        },
        Commands::ForgotPassword { email } => {
            client.session().forgot_password(&email).await?;
            println!("If that address has an account, a reset link is on its way.");
        }
        Commands::Products {
            search,
            mine,
            page,
            limit,
        } => {
            require_login(&session)?;
            let products = if mine {
                let email = session.user.map(|u| u.email).unwrap_or_default();
                client.products().list_owned_by(&email).await?
            } else {
                let mut query = ProductQuery::default().page(page, limit);
                if let Some(text) = search {
                    query = query.search(text);
                }
                client.products().list(&query).await?
            };
            if products.is_empty() {
                println!("No products");
            }
            for product in products {
                println!("{:<26} {:>10.2}  {}", product.id, product.price, product.title);
            }
        }
        Commands::Feed { pages } => {
            require_login(&session)?;
            let mut feed = client.feed();
            for _ in 0..pages.max(1) {
                if feed.load_more().await? == 0 {
                    break;
                }
            }
            for post in feed.posts() {
                println!("{}  {}", post.pub_date, post.title);
            }
        }
        Commands::Sell {
            title,
            description,
            price,
            location,
            lat,
            lon,
            images,
        } => {
            require_login(&session)?;
            let picked = FilePicker::new(images)
                .pick(ImageSource::Library, usize::MAX)
                .await?;
            let draft = ProductDraft {
                name: title,
                description,
                price,
                location: Some(Location {
                    name: location,
                    latitude: lat,
                    longitude: lon,
                }),
                images: picked.into_assets(),
            };
            match client.products().create(draft).await? {
                Some(product) => println!("Listed {} as {}", product.title, product.id),
                None => println!("Listed"),
            }
        }
        Commands::Delete { id } => {
            require_login(&session)?;
            client.products().delete(&id).await?;
            println!("Deleted {id}");
        }
    }
    Ok(())
}

fn require_login(session: &Session) -> Result<(), SoukError> {
    if session.is_authenticated {
        Ok(())
    } else {
        Err(SoukError::Config("not signed in; run `marketplace login` first".into()))
    }
}

/// The sentence shown to the user for `error`.
fn describe(error: &SoukError) -> String {
    match error {
        SoukError::Market(e) => e.user_message(GENERIC_MESSAGE),
        other => other.to_string(),
    }
}

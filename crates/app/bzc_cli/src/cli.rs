//! Command definitions and handlers.

use clap::{Parser, Subcommand};
use uuid::Uuid;

use bzc_client::api::{admin, auth, catalog};
use bzc_client::{ClientConfig, SessionManager, SessionPhase};
use bzc_core::auth::FileTokenStore;
use bzc_core::catalog::TreeNode;
use bzc_core::models::Category;

use crate::{Error, Result};

#[derive(Parser)]
#[command(name = "bzc", about = "bzCommerce storefront CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Session and account commands.
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Storefront catalog commands.
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Admin commands (require an admin session).
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
    Version,
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Log in and persist the session credential.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Register a new account (does not log in).
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// End the session and clear the persisted credential.
    Logout,
    /// Show the current session state.
    Status,
    /// Force a token refresh.
    Refresh,
    /// Show the logged-in user's profile.
    Whoami,
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// List categories as a nested tree.
    Categories {
        /// Print a flat, depth-indented list instead of the tree.
        #[arg(long)]
        flat: bool,
    },
    /// List products.
    Products,
    /// Show one product with its variants and breadcrumbs.
    Product { slug: String },
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Manage categories.
    Categories {
        #[command(subcommand)]
        command: AdminCategoryCommands,
    },
}

#[derive(Subcommand)]
pub enum AdminCategoryCommands {
    /// List all categories, depth-indented.
    List,
    /// Create a category.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        slug: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        parent_id: Option<Uuid>,
    },
    /// Update a category.
    Update {
        id: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        slug: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        parent_id: Option<Uuid>,
    },
    /// Delete a category.
    Delete { id: Uuid },
}

/// Build a session over the persisted credential slot and hydrate it.
async fn open_session() -> Result<SessionManager> {
    let config = ClientConfig::from_env()?;
    let store = FileTokenStore::new(config.token_path.clone());
    let session = SessionManager::new(config, Box::new(store))?;
    session.hydrate().await;
    Ok(session)
}

pub async fn auth(command: &AuthCommands) -> Result<()> {
    let session = open_session().await?;
    match command {
        AuthCommands::Login { email, password } => {
            let user = auth::login(&session, email, password).await?;
            println!("Logged in as {} <{}>", user.full_name, user.email);
        }
        AuthCommands::Register {
            full_name,
            email,
            password,
        } => {
            auth::register(&session, full_name, email, password).await?;
            println!("Account created for {email}");
        }
        AuthCommands::Logout => {
            session.logout().await;
            println!("Logged out");
        }
        AuthCommands::Status => {
            let state = session.state();
            match state.phase {
                SessionPhase::Authenticated if state.is_admin() => {
                    println!("Authenticated (admin)");
                }
                SessionPhase::Authenticated => println!("Authenticated"),
                _ => println!("Anonymous"),
            }
        }
        AuthCommands::Refresh => match session.refresh().await {
            Some(token) => println!("Token refreshed, expires at {}", token.expires_at()),
            None => return Err(Error::Custom("token refresh failed".to_string())),
        },
        AuthCommands::Whoami => {
            let user = auth::account(&session).await?;
            println!("{} <{}>", user.full_name, user.email);
            println!("id: {}", user.id);
            println!("admin: {}", user.is_admin);
        }
    }
    Ok(())
}

pub async fn catalog(command: &CatalogCommands) -> Result<()> {
    let session = open_session().await?;
    match command {
        CatalogCommands::Categories { flat } => {
            let tree = catalog::category_tree(&session).await?;
            if *flat {
                for entry in bzc_core::catalog::flatten_tree(tree) {
                    println!(
                        "{}{} ({})",
                        "  ".repeat(entry.depth),
                        entry.record.name,
                        entry.record.slug
                    );
                }
            } else {
                print_tree(&tree, 0);
            }
        }
        CatalogCommands::Products => {
            for product in catalog::list_products(&session).await? {
                println!("{} ({})", product.name, product.slug);
            }
        }
        CatalogCommands::Product { slug } => {
            let response = catalog::get_product(&session, slug).await?;
            let trail: Vec<&str> = response
                .breadcrumbs
                .iter()
                .map(|b| b.name.as_str())
                .collect();
            if !trail.is_empty() {
                println!("{}", trail.join(" > "));
            }
            println!("{} ({})", response.product.name, response.product.slug);
            if let Some(description) = &response.product.description {
                println!("{description}");
            }
            for variant in &response.product.variants {
                println!(
                    "  {}: {:.2} ({} in stock)",
                    variant.variant_name, variant.price, variant.stock_quantity
                );
            }
        }
    }
    Ok(())
}

pub async fn admin(command: &AdminCommands) -> Result<()> {
    let session = open_session().await?;
    match command {
        AdminCommands::Categories { command } => match command {
            AdminCategoryCommands::List => {
                for entry in admin::category_options(&session).await? {
                    println!(
                        "{}{} ({}) [{}]",
                        "  ".repeat(entry.depth),
                        entry.record.name,
                        entry.record.slug,
                        entry.record.id
                    );
                }
            }
            AdminCategoryCommands::Create {
                name,
                slug,
                description,
                parent_id,
            } => {
                admin::create_category(
                    &session,
                    &admin::CategoryInput {
                        name: name.clone(),
                        slug: slug.clone(),
                        description: description.clone(),
                        parent_id: *parent_id,
                    },
                )
                .await?;
                println!("Created category {slug}");
            }
            AdminCategoryCommands::Update {
                id,
                name,
                slug,
                description,
                parent_id,
            } => {
                admin::update_category(
                    &session,
                    *id,
                    &admin::CategoryInput {
                        name: name.clone(),
                        slug: slug.clone(),
                        description: description.clone(),
                        parent_id: *parent_id,
                    },
                )
                .await?;
                println!("Updated category {id}");
            }
            AdminCategoryCommands::Delete { id } => {
                admin::delete_category(&session, *id).await?;
                println!("Deleted category {id}");
            }
        },
    }
    Ok(())
}

fn print_tree(nodes: &[TreeNode<Category>], depth: usize) {
    for node in nodes {
        println!(
            "{}{} ({})",
            "  ".repeat(depth),
            node.record.name,
            node.record.slug
        );
        print_tree(&node.children, depth + 1);
    }
}

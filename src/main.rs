//! PromptShare Sync - command line client
//!
//! Drives the comment store, the notification feed and the video job engine
//! against a live backend.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use promptshare_sync::social::{CommentId, SubjectKind, Viewer};
use promptshare_sync::{Config, Services};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "promptshare-sync")]
#[command(about = "PromptShare comments, likes and video jobs")]
struct Cli {
    /// Path to the YAML config file (default: ./config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Session token of the signed-in user
    #[arg(long, env = "BACKEND_ACCESS_TOKEN", global = true, hide_env_values = true)]
    access_token: Option<String>,

    /// Id of the signed-in user; required for mutations
    #[arg(long, env = "VIEWER_ID", global = true)]
    viewer_id: Option<Uuid>,

    /// Display name used for optimistic comments
    #[arg(long, default_value = "You", global = true)]
    viewer_name: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the comments of a post, most recent first
    Comments { post_id: Uuid },

    /// Post a comment or a reply
    Comment {
        post_id: Uuid,
        content: String,
        /// Reply to this comment
        #[arg(long)]
        parent: Option<Uuid>,
    },

    /// Delete one of your comments
    DeleteComment { post_id: Uuid, comment_id: Uuid },

    /// Toggle your like on a post, or on one of its comments
    Like {
        post_id: Uuid,
        /// Like this comment of the post instead of the post itself
        #[arg(long)]
        comment: Option<Uuid>,
        /// The post is currently liked (post likes only; prints membership, not a count)
        #[arg(long)]
        unlike: bool,
    },

    /// Generate a video from a script and wait for it
    Generate {
        script: String,
        /// Replica (avatar/voice) id; defaults to the configured one
        #[arg(long)]
        replica: Option<String>,
    },

    /// Show your notifications
    Notifications,
}

/// Outcome of a post like toggle; the counter is owned by the feed
#[derive(Serialize)]
struct PostMembership {
    post_id: Uuid,
    liked: bool,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,promptshare_sync=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::from_yaml_and_env(cli.config.as_deref())?;
    let services = Services::new(config, cli.access_token)?;
    let viewer = cli.viewer_id.map(|id| Viewer::new(id, cli.viewer_name));

    match cli.command {
        Commands::Comments { post_id } => {
            let store = services.comment_store(viewer);
            let comments = store.list_comments(post_id).await?;
            print_json(&comments)
        }
        Commands::Comment {
            post_id,
            content,
            parent,
        } => {
            let store = services.comment_store(viewer);
            store.list_comments(post_id).await?;
            let comment = store.add_comment(&content, parent).await?;
            print_json(&comment)
        }
        Commands::DeleteComment {
            post_id,
            comment_id,
        } => {
            let store = services.comment_store(viewer);
            store.list_comments(post_id).await?;
            store.delete_comment(CommentId::Server(comment_id)).await?;
            tracing::info!("Deleted comment {}", comment_id);
            Ok(())
        }
        Commands::Like {
            post_id,
            comment,
            unlike,
        } => {
            let store = services.comment_store(viewer);
            match comment {
                Some(comment_id) => {
                    store.list_comments(post_id).await?;
                    let state = store.toggle_like(comment_id, SubjectKind::Comment).await?;
                    print_json(&state)
                }
                None => {
                    // The post counter is not known here; report membership only
                    store.seed_post_like(post_id, u32::from(unlike), unlike);
                    let state = store.toggle_like(post_id, SubjectKind::Post).await?;
                    print_json(&PostMembership {
                        post_id,
                        liked: state.liked,
                    })
                }
            }
        }
        Commands::Generate { script, replica } => run_generate(&services, &script, replica).await,
        Commands::Notifications => {
            let feed = services.notification_feed();
            let items = feed.refresh().await?;
            print_json(&items)
        }
    }
}

async fn run_generate(services: &Services, script: &str, replica: Option<String>) -> Result<()> {
    let Some(replica) = replica.or_else(|| services.config.video_replica_id.clone()) else {
        bail!("No replica id: pass --replica or set VIDEO_REPLICA_ID");
    };

    let mut engine = services.job_engine();
    let job = engine
        .create_job(script, &replica)
        .await
        .context("Failed to start video generation")?;
    tracing::info!("Job {} created ({:?} mode)", job.id, job.mode);

    let scheduler = services.poll_scheduler();
    let token = scheduler.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let job = scheduler
        .drive(&mut engine, |job| {
            tracing::info!("Job {} is {} (attempt {})", job.id, job.status, job.attempts);
        })
        .await?;
    print_json(&job)
}

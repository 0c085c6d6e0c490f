use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing::info;

use aws_config::SdkConfig;
use lostfound::config::Config;
use lostfound::identity::cognito::CognitoClient;
use lostfound::identity::profiles::DynamoProfileStore;
use lostfound::identity::{IdentityProvider, ProfileStore};
use lostfound::items::stream::StreamEvent;
use lostfound::pipeline::admin::GroupAdmin;
use lostfound::pipeline::change_feed::{ChangeEventRouter, DeliveryMode};
use lostfound::pipeline::confirmation::{GroupAssignmentTrigger, PostConfirmationEvent};
use lostfound::pipeline::subscribe::SubscriptionManager;
use lostfound::pubsub::sns::SnsClient;
use lostfound::pubsub::{FilterPolicy, PubSubTransport};
use lostfound::runtime::handlers::{
    ConfirmationHandler, PromoteHandler, StreamHandler, SubscribeHandler,
};
use lostfound::runtime::{self, InvocationHandler};

/// Lost & Found notifications: subscriptions, new-item fan-out and
/// account provisioning.
#[derive(Parser)]
#[command(name = "lostfound", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve one handler inside the Lambda runtime
    Lambda {
        #[arg(value_enum)]
        handler: HandlerKind,
    },

    /// Subscribe an email to new-item notifications
    Subscribe {
        #[arg(long)]
        email: String,

        /// Category to receive (empty: all categories)
        #[arg(long, default_value = "")]
        category: String,
    },

    /// Feed a change-feed batch (JSON file) through the router
    Replay {
        file: PathBuf,

        #[arg(long, value_enum, default_value = "filter")]
        mode: ModeArg,
    },

    /// Run the account-confirmation trigger on an event (JSON file)
    Confirm { file: PathBuf },

    /// Add a user to a group (default: the admin group)
    Promote {
        #[arg(long)]
        user: String,

        #[arg(long)]
        group: Option<String>,
    },

    /// Print the filter policy a subscription for this category would store
    Policy {
        #[arg(long, default_value = "")]
        category: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum HandlerKind {
    Stream,
    CategoryStream,
    Subscribe,
    PostConfirmation,
    AddUserToGroup,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Topic-side filter policies (current)
    Filter,
    /// Local scan of subscriber policies (legacy)
    Scan,
    /// Single fixed category to the category topic (legacy)
    Fixed,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Lambda stamps its own timestamps and does not render ANSI
    let in_lambda = std::env::var("AWS_LAMBDA_RUNTIME_API").is_ok();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("lostfound=info"));
    if in_lambda {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .without_time()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let cli = Cli::parse();
    let config = Config::load()?;
    let sdk = lostfound::aws::load_config(&config.region).await;

    match cli.command {
        Commands::Lambda { handler } => {
            let handler = build_handler(&config, &sdk, handler)?;
            runtime::serve(handler).await?;
        }

        Commands::Subscribe { email, category } => {
            let topic = config.require_topic()?;
            let manager = SubscriptionManager::new(sns(&sdk), topic);
            match manager.subscribe(&email, &category).await {
                Ok(outcome) => println!("{}", outcome.user_message().green()),
                Err(e) => {
                    eprintln!("{}", "Failed to subscribe. Please try again later.".red());
                    return Err(e.into());
                }
            }
        }

        Commands::Replay { file, mode } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let event: StreamEvent = serde_json::from_str(&json)
                .with_context(|| format!("{} is not a change-feed batch", file.display()))?;

            let router = build_router(&config, &sdk, mode)?;
            info!(records = event.records.len(), mode = ?router.mode(), "Replaying batch");
            let outcome = router.handle_batch(&event).await;

            println!("Records:   {}", outcome.received);
            println!("Inserts:   {}", outcome.inserts);
            println!("Published: {}", outcome.published.to_string().green());
            println!("Filtered:  {}", outcome.filtered);
            if outcome.failed > 0 {
                println!("Failed:    {}", outcome.failed.to_string().red());
            }
        }

        Commands::Confirm { file } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let event: PostConfirmationEvent = serde_json::from_str(&json)
                .with_context(|| format!("{} is not a confirmation event", file.display()))?;

            let trigger = build_trigger(&config, &sdk)?;
            let outcome = trigger.on_confirmed(&event).await;
            println!("Group assigned:  {}", yes_no(outcome.group_assigned));
            println!("Profile created: {}", yes_no(outcome.profile_created));
        }

        Commands::Promote { user, group } => {
            let group = group.unwrap_or_else(|| config.admin_group.clone());
            let admin = build_admin(&config, &sdk)?;
            admin.promote(&user, &group).await?;
            println!("User {} has been added to the {} group.", user.bold(), group);
        }

        Commands::Policy { category } => {
            println!("{}", FilterPolicy::for_category(&category).to_json());
        }
    }

    Ok(())
}

fn yes_no(ok: bool) -> colored::ColoredString {
    if ok {
        "yes".green()
    } else {
        "no".red()
    }
}

fn sns(sdk: &SdkConfig) -> Arc<dyn PubSubTransport> {
    Arc::new(SnsClient::new(aws_sdk_sns::Client::new(sdk)))
}

fn cognito(sdk: &SdkConfig) -> Arc<dyn IdentityProvider> {
    Arc::new(CognitoClient::new(
        aws_sdk_cognitoidentityprovider::Client::new(sdk),
    ))
}

fn profiles(config: &Config, sdk: &SdkConfig) -> Result<Arc<dyn ProfileStore>> {
    let table = config.require_profile_table()?;
    Ok(Arc::new(DynamoProfileStore::new(
        aws_sdk_dynamodb::Client::new(sdk),
        table,
    )))
}

fn build_router(config: &Config, sdk: &SdkConfig, mode: ModeArg) -> Result<ChangeEventRouter> {
    let transport = sns(sdk);
    let router = match mode {
        ModeArg::Filter => {
            ChangeEventRouter::new(transport, config.require_topic()?, DeliveryMode::FilterPolicy)
        }
        ModeArg::Scan => ChangeEventRouter::new(
            transport,
            config.require_topic()?,
            DeliveryMode::SubscriberScan,
        ),
        ModeArg::Fixed => ChangeEventRouter::new(
            transport,
            config.require_category_topic()?,
            DeliveryMode::FixedCategory(config.specified_category.clone()),
        ),
    };
    Ok(router)
}

fn build_trigger(config: &Config, sdk: &SdkConfig) -> Result<GroupAssignmentTrigger> {
    Ok(GroupAssignmentTrigger::new(
        cognito(sdk),
        profiles(config, sdk)?,
        &config.default_group,
    ))
}

fn build_admin(config: &Config, sdk: &SdkConfig) -> Result<GroupAdmin> {
    Ok(GroupAdmin::new(
        cognito(sdk),
        config.require_user_pool()?,
        config.assignable_groups(),
    ))
}

fn build_handler(
    config: &Config,
    sdk: &SdkConfig,
    kind: HandlerKind,
) -> Result<Arc<dyn InvocationHandler>> {
    let handler: Arc<dyn InvocationHandler> = match kind {
        HandlerKind::Stream => Arc::new(StreamHandler {
            router: build_router(config, sdk, ModeArg::Filter)?,
        }),
        HandlerKind::CategoryStream => Arc::new(StreamHandler {
            router: build_router(config, sdk, ModeArg::Fixed)?,
        }),
        HandlerKind::Subscribe => Arc::new(SubscribeHandler {
            manager: SubscriptionManager::new(sns(sdk), config.require_topic()?),
        }),
        HandlerKind::PostConfirmation => Arc::new(ConfirmationHandler {
            trigger: build_trigger(config, sdk)?,
        }),
        HandlerKind::AddUserToGroup => Arc::new(PromoteHandler {
            admin: build_admin(config, sdk)?,
        }),
    };
    Ok(handler)
}

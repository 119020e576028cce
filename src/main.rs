use clap::Parser;
use rank_engine::{
    args::Args,
    database::db::DbClient,
    leaderboard,
    model::ranking_engine::RankingEngine,
    simulation::RatingSimulator,
    utils::progress_utils::progress_style
};
use std::process;
use tracing::{error, info, info_span, warn, Instrument, Span};
use tracing_indicatif::{span_ext::IndicatifSpanExt, IndicatifLayer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Log lines go through the layer's writer so they print above active bars
    let indicatif_layer = IndicatifLayer::new();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(indicatif_layer.get_stderr_writer()))
        .with(indicatif_layer)
        .with(EnvFilter::new(&args.log_level))
        .init();

    let client = match DbClient::connect(&args.connection_string).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            error!("Application cannot start without a valid database connection");
            process::exit(1);
        }
    };

    // The engine must be fully built before anything reads from it
    let engine = match RankingEngine::initialize(&client).await {
        Ok(engine) => engine,
        Err(e) => {
            error!("{}", e);
            error!("Application cannot start without an initialized ranking engine");
            process::exit(1);
        }
    };

    let stats = engine.get_stats();
    info!(
        total_users = stats.total_users,
        unique_ratings = stats.unique_ratings,
        min_rating = ?stats.min_rating_with_users,
        max_rating = ?stats.max_rating_with_users,
        "Ranking engine ready"
    );

    if args.simulate_rounds > 0 {
        simulate(&engine, &client, &args).await;
    }

    let page = match leaderboard::leaderboard_page(&engine, &client, 1, args.page_size).await {
        Ok(page) => page,
        Err(e) => {
            error!("Failed to load leaderboard: {}", e);
            process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&page) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Failed to serialize leaderboard: {}", e);
            process::exit(1);
        }
    }
}

async fn simulate(engine: &RankingEngine, client: &DbClient, args: &Args) {
    let mut simulator = RatingSimulator::new(args.seed, args.max_delta);

    let span = info_span!("simulate");
    span.pb_set_style(&progress_style());
    span.pb_set_length(args.simulate_rounds as u64);
    span.pb_set_message("Simulating rating changes");

    let (applied, failed_rounds) = async {
        let mut applied = 0;
        let mut failed_rounds = 0;

        for round in 1..=args.simulate_rounds {
            let users = match client.sample_users(args.batch_size).await {
                Ok(users) => users,
                Err(e) => {
                    warn!("Round {}: failed to sample users: {}", round, e);
                    failed_rounds += 1;
                    Span::current().pb_inc(1);
                    continue;
                }
            };

            let changes = simulator.generate_changes(&users);
            match leaderboard::apply_rating_changes(engine, client, &changes).await {
                Ok(_) => applied += changes.len(),
                Err(e) => {
                    warn!("Round {}: {}", round, e);
                    failed_rounds += 1;
                }
            }

            Span::current().pb_inc(1);
        }

        (applied, failed_rounds)
    }
    .instrument(span)
    .await;

    info!(
        "Simulated {} rounds: {} rating changes applied, {} rounds failed",
        args.simulate_rounds, applied, failed_rounds
    );
}

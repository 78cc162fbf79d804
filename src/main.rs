use diesel::sqlite::SqliteConnection;
use std::env;
use std::error::Error;
use std::time::Duration;

use spegulo::api::ApiClient;
use spegulo::models::submission::SolveSummary;
use spegulo::query::Query;
use spegulo::recommend::PointRange;
use spegulo::{predict, recache, recommend, setup, throttle};

fn fetch_interval() -> Duration {
    let seconds = env::var("FETCH_INTERVAL_SECONDS")
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(30);
    Duration::from_secs(seconds.max(1))
}

fn usage() {
    eprintln!("usage: spegulo <command>");
    eprintln!();
    eprintln!("  cache-problems                        cache all new problems");
    eprintln!("  update-problems                       drop and refetch every problem");
    eprintln!("  cache-contests                        cache every contest snapshot");
    eprintln!("  cache-metadata                        cache organizations, languages, judges");
    eprintln!("  update-submissions                    refetch submissions of every known user");
    eprintln!("  force problem <code>                  recache one problem");
    eprintln!("  force contest <key>                   recache one contest");
    eprintln!("  user <username>                       show a cached or fetched profile");
    eprintln!("  recommend <username> [points] [tags]  suggest an unsolved problem");
    eprintln!("  predict <username> <points...>        project score after extra solves");
}

async fn run(
    connection: &SqliteConnection,
    api: &ApiClient,
    args: &[&str],
) -> Result<(), Box<dyn Error>> {
    match args {
        ["cache-problems"] => {
            let cached = recache::recache_problems(connection, api, false).await?;
            println!("Cached {} problems", cached);
        }
        ["update-problems"] => {
            let cached = recache::recache_problems(connection, api, true).await?;
            println!("Updated {} problems", cached);
        }
        ["cache-contests"] => {
            let cached = recache::recache_contests(connection, api).await?;
            println!("Cached {} contests", cached);
        }
        ["cache-metadata"] => {
            let counts = recache::recache_metadata(connection, api).await?;
            println!(
                "Cached {} organizations, {} languages, {} judges",
                counts.organizations, counts.languages, counts.judges
            );
        }
        ["update-submissions"] => {
            let (mut ticker, cancel) = throttle::ticker(fetch_interval());
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            });
            let users = recache::recache_submissions(connection, api, &mut ticker).await?;
            println!("Recached submissions for {} users", users);
        }
        ["force", "problem", code] => {
            let fetched = recache::force_problem(connection, api, code).await?;
            println!("Recached problem {}", fetched.code);
        }
        ["force", "contest", key] => {
            let fetched = recache::force_contest(connection, api, key).await?;
            println!("Recached contest {}", fetched.key);
        }
        ["user", username] => {
            let query = Query::new(connection, api).with_fetch_interval(fetch_interval());
            let user = query.get_user(username).await?;
            println!("{}", user.username);
            println!("Calculated points: {:.2}", user.performance_points);
            println!("Problems solved: {}", user.problem_count);
            match user.rating {
                Some(rating) => println!("Rating: {}", rating),
                None => println!("Rating: unrated"),
            }
            println!("Contests written: {}", user.participations().len());
        }
        ["recommend", username, rest @ ..] => {
            let query = Query::new(connection, api).with_fetch_interval(fetch_interval());
            let user = query.get_user(username).await?;
            query.get_submissions(&user.username).await?;

            let mut range = PointRange::default();
            let mut filters = rest;
            if let Some(parsed) = rest.first().and_then(|raw| recommend::parse_point_range(raw)) {
                range = parsed;
                filters = &rest[1..];
            }
            let filters: Vec<String> = filters.iter().map(|raw| raw.to_string()).collect();
            let tags = recommend::expand_tag_aliases(&filters);

            let picked = recommend::recommend(connection, &user.username, range, &tags)?;
            let mut points = format!("{}", picked.points);
            if picked.partial {
                points.push('p');
            }
            println!("{} ({})", picked.name, picked.code);
            println!("Points: {}", points);
            println!("Problem types: {}", picked.tags().join(", "));
            println!("Group: {}", picked.group);
            println!("Time limit: {}s", picked.time_limit);
            println!("Memory limit: {}K", picked.memory_limit);
        }
        ["predict", username, rest @ ..] => {
            let values: Vec<f64> = rest.iter().filter_map(|raw| raw.parse().ok()).collect();
            if values.is_empty() {
                eprintln!("No points given");
                return Ok(());
            }
            let query = Query::new(connection, api).with_fetch_interval(fetch_interval());
            let user = query.get_user(username).await?;
            let submissions = query.get_submissions(&user.username).await?;

            let summary = SolveSummary::from_submissions(&submissions);
            let prediction = predict::predict(&summary, &values);
            println!("Point prediction for {}", user.username);
            println!("Current points: {:.2}p", prediction.current);
            for projection in &prediction.projections {
                println!(
                    "Solve another {}p: total {:.2}p",
                    projection.value, projection.total
                );
            }
        }
        _ => usage(),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    setup::setup_dotenv();
    env_logger::init();

    let pool = setup::establish_pool();
    let connection = pool.get().expect("Couldn't check out a connection");
    setup::create_schema(&connection).expect("Couldn't create the schema");
    let api = ApiClient::from_env();

    let args: Vec<String> = env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    if let Err(error) = run(&connection, &api, &args).await {
        eprintln!("{}", error);
        std::process::exit(1);
    }
}

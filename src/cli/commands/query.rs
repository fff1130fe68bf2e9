//! One-shot search from the terminal.

use crate::config::Config;
use crate::domain::{FilterCriteria, Restaurant};
use crate::services::SearchError;
use crate::state::SharedState;

pub struct QueryArgs {
    pub postcode: String,
    pub distance: Option<u32>,
    pub cuisines: Option<String>,
    pub min_rating: Option<u32>,
    pub json: bool,
}

pub async fn cmd_query(config: Config, args: QueryArgs) -> anyhow::Result<()> {
    let criteria = FilterCriteria::from_request(
        args.distance,
        args.cuisines.as_deref(),
        args.min_rating,
        config.search.default_distance_miles,
        config.search.default_min_rating,
    )?;

    let state = SharedState::new(config)?;

    let restaurants = match state.search.search(&args.postcode, &criteria).await {
        Ok(restaurants) => restaurants,
        Err(SearchError::LocationNotFound(postcode)) => {
            println!("Could not find a location for '{postcode}'");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&restaurants)?);
        return Ok(());
    }

    print_table(&args.postcode, &criteria, &restaurants);
    Ok(())
}

fn print_table(postcode: &str, criteria: &FilterCriteria, restaurants: &[Restaurant]) {
    if restaurants.is_empty() {
        println!(
            "No restaurants within {} miles of {postcode} match.",
            criteria.max_distance_miles
        );
        return;
    }

    println!(
        "Restaurants within {} miles of {postcode} ({} found)",
        criteria.max_distance_miles,
        restaurants.len()
    );
    println!("{:-<70}", "");

    for restaurant in restaurants {
        let cuisines = restaurant
            .cuisines
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        println!(
            "• {} ({:.1}★, {} reviews)",
            restaurant.name, restaurant.rating.star_rating, restaurant.rating.count
        );
        println!(
            "  {}, {} {}",
            restaurant.address.first_line, restaurant.address.city, restaurant.address.postal_code
        );
        if !cuisines.is_empty() {
            println!("  {cuisines}");
        }
    }
}

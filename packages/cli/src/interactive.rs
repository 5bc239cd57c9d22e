//! Prompt-driven session.
//!
//! Asks for the dataset, renders it, opens the result, and offers to run
//! again. Invalid answers are rejected inline by `dialoguer` and asked
//! again until a valid one is given.

use std::path::Path;

use chrono::Utc;
use covid_map_cli_utils::MultiProgress;
use covid_map_config::Settings;
use covid_map_dataset::DatasetError;
use covid_map_dataset_models::DatasetKind;
use covid_map_render::RenderError;
use covid_map_selector::{
    DatasetSelection, DateRules, parse_kind_choice, parse_region_choice, parse_yes_no,
};
use dialoguer::Input;

use crate::{display, pipeline};

const BANNER: &str = r"
                     -----------------------------------------
                     |      ITALY'S COVID-19 INFECTIONS      |
                     |        GRAPHICAL REPRESENTATION       |
                     -----------------------------------------
";

const SEPARATOR: &str =
    "===========================================================================================";

/// Runs the interactive loop until the user declines another run.
///
/// A failed run is reported and does not end the session.
///
/// # Errors
///
/// Returns an error only if the terminal prompts themselves fail.
#[allow(clippy::future_not_send)]
pub async fn run(
    settings: &Settings,
    client: &reqwest::Client,
    output: &Path,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    print_intro();

    loop {
        println!();
        println!("{SEPARATOR}");
        println!();

        let selection = prompt_selection(&settings.date_rules)?;
        println!();

        match pipeline::run(settings, client, selection, output, multi).await {
            Ok(path) => {
                println!();
                println!("The map has been saved to {}", path.display());
                display::open_in_viewer(&path);
            }
            Err(e) => {
                log::error!("Run failed: {e}");
                if is_network_failure(e.as_ref()) {
                    println!("The data could not be downloaded. Check your connection and try again.");
                }
            }
        }

        println!();
        if !prompt_until("Would you like to run the program again? (y/n)", parse_yes_no)? {
            break;
        }
    }

    println!("Thanks for using this program! See you next time.");
    Ok(())
}

fn is_network_failure(error: &(dyn std::error::Error + 'static)) -> bool {
    if let Some(e) = error.downcast_ref::<DatasetError>() {
        return e.is_network_failure();
    }
    error
        .downcast_ref::<RenderError>()
        .is_some_and(RenderError::is_network_failure)
}

fn print_intro() {
    println!("{BANNER}");
    println!(
        "Welcome, this program allows to create graphical representations of the Covid-19 cases in Italy."
    );
    println!(
        "The selected dataset will be printed here and then represented graphically over a pre-existing map of the country."
    );
}

fn prompt_selection(rules: &DateRules) -> Result<DatasetSelection, dialoguer::Error> {
    let kind = prompt_until(
        "Type 'p' to see the report sub-divided by province, type 'r' to see it divided by region",
        parse_kind_choice,
    )?;

    match kind {
        DatasetKind::Province => {
            println!();
            println!("You chose to see the data divided by province, here is the complete list:");
            Ok(DatasetSelection::Province)
        }
        DatasetKind::Region => {
            println!();
            println!("You chose to see the data divided by region.");
            println!(
                "Would you like to see the daily increase for a specific day or the latest update of the total?"
            );
            let prompt = format!(
                "Enter 'total' or a date in the format 'YYYYMMDD' between {} and today",
                rules.earliest.format("%Y%m%d")
            );
            prompt_until(&prompt, |input| {
                let now = Utc::now().with_timezone(&rules.timezone);
                parse_region_choice(input, rules, now)
            })
        }
    }
}

/// Prompts until `parse` accepts the answer. The parser's error message is
/// shown under the prompt on each rejection.
fn prompt_until<T, E, F>(prompt: &str, parse: F) -> Result<T, dialoguer::Error>
where
    E: std::fmt::Display,
    F: Fn(&str) -> Result<T, E>,
{
    loop {
        let input: String = Input::new()
            .with_prompt(prompt)
            .validate_with(|input: &String| parse(input.as_str()).map(|_| ()).map_err(|e| e.to_string()))
            .interact_text()?;

        if let Ok(value) = parse(input.as_str()) {
            return Ok(value);
        }
    }
}

use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use client::{
    api::HttpApi,
    form::{PredictionForm, format_price},
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the estimator server
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the selectable values
    Options {
        /// Also list the models of this company
        #[arg(long)]
        company: Option<String>,
    },

    /// Estimate the price of a car
    Predict {
        #[arg(long)]
        company: String,

        #[arg(long)]
        model: String,

        #[arg(long)]
        year: String,

        #[arg(long)]
        fuel_type: String,

        #[arg(long)]
        kilometers: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut form = PredictionForm::new(HttpApi::new(&args.server));
    form.load_dropdowns().await?;

    match args.command {
        Command::Options { company } => {
            let dropdowns = form.dropdowns();
            println!("Companies: {}", dropdowns.companies.join(", "));
            println!("Years: {}", join(&dropdowns.years));
            println!("Fuel Types: {}", dropdowns.fuel_types.join(", "));

            if let Some(company) = company {
                form.select_company(&company).await?;
                println!("Models ({company}): {}", form.dropdowns().models.join(", "));
            }
        }
        Command::Predict {
            company,
            model,
            year,
            fuel_type,
            kilometers,
        } => {
            form.select_company(&company).await?;
            form.set_model(model);
            form.set_year(year);
            form.set_fuel_type(fuel_type);
            form.set_kilometers(kilometers);

            let pb = ProgressBar::new_spinner();
            pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
            pb.set_message("Predicting...");
            pb.enable_steady_tick(Duration::from_millis(100));

            let outcome = form.submit().await;
            pb.finish_and_clear();

            match outcome {
                Ok(prediction) => {
                    println!("Predicted Price: {}", format_price(prediction.predicted_price));

                    if let Some(warning) = prediction.warning {
                        eprintln!("Warning: {warning}");
                    }
                }
                Err(e) => bail!("{}", form.submit_error(&e)),
            }
        }
    }

    Ok(())
}

fn join(values: &[i32]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

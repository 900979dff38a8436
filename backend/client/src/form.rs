use tracing::{debug, error};

use crate::{
    ClientError,
    api::{CarApi, Prediction, PredictionInput},
};

pub const COMPANY_PLACEHOLDER: &str = "Select Company";

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    LoadingDropdowns,
    Ready,
    Submitting,
    Success { price: f64, warning: Option<String> },
    Error(String),
}

/// Raw field values as typed or selected.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormData {
    pub company: String,
    pub model: String,
    pub year: String,
    pub fuel_type: String,
    pub kilometers: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dropdowns {
    pub companies: Vec<String>,
    pub models: Vec<String>,
    pub years: Vec<i32>,
    pub fuel_types: Vec<String>,
}

pub struct PredictionForm<A> {
    api: A,
    data: FormData,
    dropdowns: Dropdowns,
    phase: Phase,
    dropdowns_failed: bool,
}

impl<A: CarApi> PredictionForm<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            data: FormData::default(),
            dropdowns: Dropdowns::default(),
            phase: Phase::Idle,
            dropdowns_failed: false,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn data(&self) -> &FormData {
        &self.data
    }

    pub fn dropdowns(&self) -> &Dropdowns {
        &self.dropdowns
    }

    pub fn can_submit(&self) -> bool {
        !self.dropdowns_failed
            && matches!(
                self.phase,
                Phase::Ready | Phase::Success { .. } | Phase::Error(_)
            )
    }

    /// Fetches companies, years and fuel types together. Any failure leaves all three empty.
    pub async fn load_dropdowns(&mut self) -> Result<(), ClientError> {
        self.phase = Phase::LoadingDropdowns;

        let loaded = tokio::try_join!(
            self.api.companies(),
            self.api.years(),
            self.api.fuel_types()
        );

        match loaded {
            Ok((companies, years, fuel_types)) => {
                debug!(
                    "Loaded {} companies, {} years, {} fuel types",
                    companies.len(),
                    years.len(),
                    fuel_types.len()
                );

                self.dropdowns.companies = companies;
                self.dropdowns.years = years;
                self.dropdowns.fuel_types = fuel_types;
                self.dropdowns_failed = false;
                self.phase = Phase::Ready;

                Ok(())
            }
            Err(e) => {
                error!("Error fetching dropdown data: {e}");

                self.dropdowns = Dropdowns::default();
                self.dropdowns_failed = true;
                self.phase = Phase::Error(format!("Failed to load dropdown data: {e}"));

                Err(e)
            }
        }
    }

    pub async fn select_company(&mut self, company: &str) -> Result<(), ClientError> {
        self.data.company = company.to_string();
        self.data.model.clear();
        self.dropdowns.models.clear();
        self.touch();

        if is_unselected(company) {
            return Ok(());
        }

        match self.api.models(company).await {
            Ok(models) => {
                self.dropdowns.models = models;
                Ok(())
            }
            Err(e) => {
                error!("Error fetching car models: {e}");
                self.phase = Phase::Error("Failed to load car models".to_string());
                Err(e)
            }
        }
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.data.model = model.into();
        self.touch();
    }

    pub fn set_year(&mut self, year: impl Into<String>) {
        self.data.year = year.into();
        self.touch();
    }

    pub fn set_fuel_type(&mut self, fuel_type: impl Into<String>) {
        self.data.fuel_type = fuel_type.into();
        self.touch();
    }

    pub fn set_kilometers(&mut self, kilometers: impl Into<String>) {
        self.data.kilometers = kilometers.into();
        self.touch();
    }

    // editing after a result re-arms the form
    fn touch(&mut self) {
        if !self.dropdowns_failed && matches!(self.phase, Phase::Success { .. } | Phase::Error(_)) {
            self.phase = Phase::Ready;
        }
    }

    pub fn validate(&self) -> Result<PredictionInput, ClientError> {
        let data = &self.data;

        let missing: Vec<&str> = [
            ("company", is_unselected(&data.company)),
            ("model", data.model.trim().is_empty()),
            ("year", data.year.trim().is_empty()),
            ("fuel type", data.fuel_type.trim().is_empty()),
            ("kilometers", data.kilometers.trim().is_empty()),
        ]
        .into_iter()
        .filter_map(|(name, empty)| empty.then_some(name))
        .collect();

        if !missing.is_empty() {
            return Err(ClientError::Validation(format!(
                "Please fill in all fields: {}",
                missing.join(", ")
            )));
        }

        let year = data.year.trim().parse().map_err(|_| {
            ClientError::Validation("Year must be a whole number".to_string())
        })?;

        let kilometers = data.kilometers.trim().parse().map_err(|_| {
            ClientError::Validation("Kilometers must be a non-negative whole number".to_string())
        })?;

        Ok(PredictionInput {
            company: data.company.clone(),
            model: data.model.clone(),
            year,
            fuel_type: data.fuel_type.clone(),
            kilometers,
        })
    }

    /// Validation failures stay local, the api is only called for a complete form.
    pub async fn submit(&mut self) -> Result<Prediction, ClientError> {
        if !self.can_submit() {
            return Err(ClientError::NotReady);
        }

        let input = match self.validate() {
            Ok(input) => input,
            Err(e) => {
                self.phase = Phase::Error(e.to_string());
                return Err(e);
            }
        };

        self.phase = Phase::Submitting;

        match self.api.predict(&input).await {
            Ok(prediction) => {
                self.phase = Phase::Success {
                    price: prediction.predicted_price,
                    warning: prediction.warning.clone(),
                };
                Ok(prediction)
            }
            Err(e) => {
                error!("Error predicting price: {e}");
                self.phase = Phase::Error(match &e {
                    ClientError::Server { message, .. } => message.clone(),
                    _ => "Error predicting price".to_string(),
                });
                Err(e)
            }
        }
    }

    /// Text to show for a failed [`submit`](Self::submit). A refused submission
    /// never touched the phase, so an older error message would be stale.
    pub fn submit_error(&self, error: &ClientError) -> String {
        match (error, &self.phase) {
            (ClientError::NotReady, _) => error.to_string(),
            (_, Phase::Error(message)) => message.clone(),
            _ => error.to_string(),
        }
    }
}

fn is_unselected(company: &str) -> bool {
    let company = company.trim();

    company.is_empty() || company == COMPANY_PLACEHOLDER
}

/// Rupee amount with Indian digit grouping, e.g. `₹1,23,456.78`. Whole amounts drop the paise.
pub fn format_price(price: f64) -> String {
    let rounded = format!("{:.2}", price.abs());
    let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let sign = if price < 0.0 && rounded != "0.00" { "-" } else { "" };
    let grouped = group_indian(whole);

    if fraction == "00" {
        format!("{sign}₹{grouped}")
    } else {
        format!("{sign}₹{grouped}.{fraction}")
    }
}

// last three digits, then pairs
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (mut head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();

    while head.len() > 2 {
        let (rest, pair) = head.split_at(head.len() - 2);
        groups.push(pair);
        head = rest;
    }
    groups.push(head);
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}

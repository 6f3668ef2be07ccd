use anyhow::{Result, bail};
use chrono::Datelike;
use clap::Parser;
use quote_flow::{
    AutoData, FieldError, HttpQuoteClient, LocalQuoteClient, OfferView, PricingEngine,
    ProductData, ProductType, PropertyType, QuoteClient, QuoteRunner, ResidentialData, Step,
    WizardError, WizardState, catalog,
    format::{
        format_cpf, format_currency, format_date, format_phone, format_plate, format_postal_code,
    },
    product::parse_flag,
    validation,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quote-wizard", about = "Quote auto or residential insurance from the terminal")]
struct Args {
    /// Base URL of the quote service
    #[arg(long, default_value = "http://localhost:3002")]
    api_url: String,

    /// Price quotes in-process instead of calling the service
    #[arg(long)]
    offline: bool,
}

/// What the user asked for at a navigation prompt.
enum Nav {
    Next,
    Back,
    Quit,
}

struct Terminal<R> {
    input: R,
}

impl<R: BufRead> Terminal<R> {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        print!("{prompt}: ");
        io::stdout().flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            bail!("input closed");
        }
        Ok(line.trim().to_string())
    }

    /// Prompts until `validate` accepts the masked answer.
    fn ask_field<M, V>(&mut self, label: &str, mask: M, validate: V) -> Result<String>
    where
        M: Fn(&str) -> String,
        V: Fn(&str) -> Result<(), FieldError>,
    {
        loop {
            let value = mask(&self.ask(label)?);
            match validate(&value) {
                Ok(()) => return Ok(value),
                Err(e) => println!("  ✗ {}", e.message),
            }
        }
    }

    fn ask_choice<T>(&mut self, label: &str, parse: impl Fn(&str) -> Option<T>) -> Result<T> {
        loop {
            if let Some(choice) = parse(&self.ask(label)?) {
                return Ok(choice);
            }
            println!("  ✗ Select one of the listed options");
        }
    }

    fn ask_nav(&mut self, prompt: &str) -> Result<Nav> {
        Ok(match self.ask(prompt)?.to_lowercase().as_str() {
            "b" | "back" => Nav::Back,
            "q" | "quit" => Nav::Quit,
            _ => Nav::Next,
        })
    }
}

fn parse_product_type(answer: &str) -> Option<ProductType> {
    match answer.trim().to_lowercase().as_str() {
        "1" | "auto" => Some(ProductType::Auto),
        "2" | "residencial" | "residential" => Some(ProductType::Residential),
        _ => None,
    }
}

fn keep(value: &str) -> String {
    value.trim().to_string()
}

fn collect_auto<R: BufRead>(term: &mut Terminal<R>, current_year: i32) -> Result<AutoData> {
    let full_name = term.ask_field("Full name", keep, validation::validate_full_name)?;
    let email = term.ask_field("Email", keep, validation::validate_email)?;
    let phone = term.ask_field("Phone", format_phone, validation::validate_phone)?;
    let birth_date = term.ask_field("Birth date (DD/MM/YYYY)", format_date, validation::validate_birth_date)?;
    let cnh = term.ask_field("Driver licence (CNH)", keep, validation::validate_cnh)?;
    let plate = term.ask_field("Plate", format_plate, validation::validate_plate)?;

    println!("  Brands: {}", catalog::brands().collect::<Vec<_>>().join(", "));
    let brand = term.ask_field("Brand", keep, |v| {
        if v.is_empty() {
            Err(FieldError::new(
                "brand",
                validation::FieldErrorKind::Required,
                "Brand is required",
            ))
        } else {
            Ok(())
        }
    })?;

    let models = catalog::models_for(&brand);
    if !models.is_empty() {
        println!("  Models: {}", models.join(", "));
    }
    let model = term.ask_field("Model", keep, |v| {
        if v.is_empty() {
            Err(FieldError::new(
                "model",
                validation::FieldErrorKind::Required,
                "Model is required",
            ))
        } else {
            Ok(())
        }
    })?;

    let year = term.ask_field("Year", keep, |v| validation::validate_year(v, current_year))?;
    let has_tracker = term.ask_choice("Tracker installed? (sim/nao)", parse_flag)?;

    Ok(AutoData {
        full_name,
        email,
        phone,
        birth_date,
        cnh,
        plate,
        brand,
        model,
        year,
        has_tracker: Some(has_tracker),
    })
}

fn collect_residential<R: BufRead>(term: &mut Terminal<R>) -> Result<ResidentialData> {
    let full_name = term.ask_field("Full name", keep, validation::validate_full_name)?;
    let email = term.ask_field("Email", keep, validation::validate_email)?;
    let phone = term.ask_field("Phone", format_phone, validation::validate_phone)?;
    let birth_date = term.ask_field("Birth date (DD/MM/YYYY)", format_date, validation::validate_birth_date)?;
    let postal_code = term.ask_field("Postal code (CEP)", format_postal_code, validation::validate_postal_code)?;
    let property_type = term.ask_choice("Property type (casa/apartamento)", PropertyType::parse)?;
    let total_area = term.ask_field("Total area (m²)", keep, validation::validate_total_area)?;
    let has_alarm = term.ask_choice("Monitored alarm? (sim/nao)", parse_flag)?;

    Ok(ResidentialData {
        full_name,
        email,
        phone,
        birth_date,
        postal_code,
        property_type: Some(property_type),
        total_area,
        has_alarm: Some(has_alarm),
    })
}

fn print_offers(wizard: &WizardState) {
    let OfferView::Available(offers) = wizard.offer_view() else {
        return;
    };
    for (index, offer) in offers.iter().enumerate() {
        println!(
            "  [{}] {} - {} / year (12x {})",
            index + 1,
            offer.insurer_name,
            format_currency(offer.premium),
            format_currency(offer.monthly_payment)
        );
        for coverage in &offer.coverages {
            println!("        {}: {}", coverage.name, format_currency(coverage.value));
        }
        for discount in offer.discounts.iter().flatten() {
            println!("        discount {}: {}%", discount.name, discount.percentage);
        }
    }
}

fn print_summary(wizard: &WizardState) {
    let Some(summary) = wizard.summary() else {
        return;
    };
    println!("\n== Summary ==");
    println!("CPF: {}", summary.identity);
    println!("Product: {}", summary.product_type);
    if let Some(data) = summary.product_data {
        if let Ok(json) = serde_json::to_string_pretty(data) {
            println!("Details: {json}");
        }
    }
    println!(
        "Chosen offer: {} - {} (12x {})",
        summary.offer.insurer_name,
        format_currency(summary.offer.premium),
        format_currency(summary.offer.monthly_payment)
    );
}

async fn run<R: BufRead>(runner: &QuoteRunner, term: &mut Terminal<R>) -> Result<()> {
    let current_year = chrono::Local::now().year();
    let mut wizard = WizardState::new();

    loop {
        println!("\n-- Step {}/{}: {} --", wizard.current_step().number(), Step::COUNT, wizard.current_step());

        match wizard.current_step() {
            Step::Intake => {
                let identity = term.ask_field("CPF", format_cpf, validation::validate_identity)?;
                wizard.set_identity(identity);
                let product_type = term.ask_choice("Insurance [1] auto [2] residencial", parse_product_type)?;
                wizard.set_product_type(product_type);
                runner.advance(&mut wizard).await;
            }
            Step::ProductDetails => {
                match term.ask_nav("Enter to fill in the details, 'b' to go back, 'q' to quit")? {
                    Nav::Back => {
                        wizard.retreat();
                        continue;
                    }
                    Nav::Quit => return Ok(()),
                    Nav::Next => {}
                }

                let data: ProductData = match wizard.product_type() {
                    Some(ProductType::Auto) => collect_auto(term, current_year)?.into(),
                    Some(ProductType::Residential) => collect_residential(term)?.into(),
                    None => {
                        wizard.retreat();
                        continue;
                    }
                };
                match wizard.submit_product_form(data, current_year) {
                    Ok(()) => {
                        println!("Looking for the best offers...");
                        runner.advance(&mut wizard).await;
                    }
                    Err(WizardError::Validation(errors)) => {
                        for error in errors {
                            println!("  ✗ {error}");
                        }
                    }
                    Err(e) => println!("  ✗ {e}"),
                }
            }
            Step::OfferSelection => match wizard.offer_view() {
                OfferView::Idle | OfferView::Loading => {
                    runner.load_offers(&mut wizard).await.ok();
                }
                OfferView::Failed(message) => {
                    println!("Could not load offers: {message}");
                    match term.ask_nav("Enter to try again, 'b' to go back, 'q' to quit")? {
                        Nav::Next => {
                            runner.load_offers(&mut wizard).await.ok();
                        }
                        Nav::Back => {
                            wizard.retreat();
                        }
                        Nav::Quit => return Ok(()),
                    }
                }
                OfferView::Empty => {
                    println!("No offers available right now");
                    wizard.retreat();
                }
                OfferView::Available(_) => {
                    print_offers(&wizard);
                    let answer = term.ask("Choose an offer number, 'b' to go back")?;
                    if answer.eq_ignore_ascii_case("b") {
                        wizard.retreat();
                        continue;
                    }
                    let chosen = answer
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|index| wizard.offers().get(index).cloned());
                    match chosen {
                        Some(offer) => {
                            wizard.select_offer(&offer)?;
                            runner.advance(&mut wizard).await;
                        }
                        None => println!("  ✗ Select one of the listed offers"),
                    }
                }
            },
            Step::Summary => {
                print_summary(&wizard);
                match term.ask_nav("Enter to start a new quote, 'b' to go back, 'q' to quit")? {
                    Nav::Next => wizard.reset(),
                    Nav::Back => {
                        wizard.retreat();
                    }
                    Nav::Quit => return Ok(()),
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let args = Args::parse();
    info!(offline = args.offline, api_url = %args.api_url, "Starting quote wizard");
    let client: Arc<dyn QuoteClient> = if args.offline {
        Arc::new(LocalQuoteClient::new(PricingEngine::current()))
    } else {
        Arc::new(HttpQuoteClient::new(args.api_url))
    };
    let runner = QuoteRunner::new(client);

    let stdin = io::stdin();
    let mut term = Terminal { input: stdin.lock() };
    run(&runner, &mut term).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_product_type() {
        assert_eq!(parse_product_type("1"), Some(ProductType::Auto));
        assert_eq!(parse_product_type(" Residencial "), Some(ProductType::Residential));
        assert_eq!(parse_product_type("3"), None);
    }

    #[test]
    fn test_ask_field_repeats_until_valid() {
        let mut term = Terminal {
            input: Cursor::new("123\n12345678901\n"),
        };
        let cpf = term
            .ask_field("CPF", format_cpf, validation::validate_identity)
            .unwrap();
        assert_eq!(cpf, "123.456.789-01");
    }

    #[tokio::test]
    async fn test_offline_session_reaches_summary() {
        let input = [
            "12345678901",
            "2",
            "",
            "João Souza",
            "joao@example.com",
            "1134567890",
            "15081980",
            "01310100",
            "casa",
            "250",
            "nao",
            "2",
            "q",
        ]
        .join("\n");
        let mut term = Terminal {
            input: Cursor::new(input),
        };
        let runner = QuoteRunner::new(Arc::new(LocalQuoteClient::new(PricingEngine::for_year(2024))));

        run(&runner, &mut term).await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_input_ends_session_with_error() {
        let mut term = Terminal {
            input: Cursor::new(""),
        };
        let runner = QuoteRunner::new(Arc::new(LocalQuoteClient::default()));
        assert!(run(&runner, &mut term).await.is_err());
    }
}

//! Field-level validation for the wizard forms.
//!
//! Each validator checks one field and reports the first rule it breaks, so
//! every field can be corrected independently of the others.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use crate::pricing::parse_float_prefix;
use crate::product::{AutoData, ProductData, ResidentialData};

static IDENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}\.\d{3}\.\d{3}-\d{2}$|^\d{11}$").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\d{2}\)\s\d{4,5}-\d{4}$").unwrap());
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{2}/\d{2}/\d{4}$").unwrap());
static CNH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{11}$").unwrap());
static PLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}-?\d[A-Z0-9]\d{2}$").unwrap());
static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").unwrap());
static POSTAL_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}-\d{3}$").unwrap());

pub const MAX_TOTAL_AREA: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    Required,
    TooShort,
    TooLong,
    InvalidFormat,
    OutOfRange,
    NotSelected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

type FieldResult = Result<(), FieldError>;

fn required(field: &str, value: &str, label: &str) -> FieldResult {
    if value.trim().is_empty() {
        return Err(FieldError::new(
            field,
            FieldErrorKind::Required,
            format!("{label} is required"),
        ));
    }
    Ok(())
}

fn matches(field: &str, value: &str, re: &Regex, hint: &str) -> FieldResult {
    if !re.is_match(value) {
        return Err(FieldError::new(
            field,
            FieldErrorKind::InvalidFormat,
            format!("Expected format: {hint}"),
        ));
    }
    Ok(())
}

fn selected<T>(field: &str, value: Option<T>, label: &str) -> FieldResult {
    if value.is_none() {
        return Err(FieldError::new(
            field,
            FieldErrorKind::NotSelected,
            format!("Select {label}"),
        ));
    }
    Ok(())
}

/// Tax id (CPF), either masked or as 11 bare digits.
pub fn validate_identity(value: &str) -> FieldResult {
    required("identity", value, "CPF")?;
    if value.chars().count() < 11 {
        return Err(FieldError::new(
            "identity",
            FieldErrorKind::TooShort,
            "CPF must have at least 11 characters",
        ));
    }
    matches("identity", value, &IDENTITY_RE, "000.000.000-00")
}

pub fn validate_full_name(value: &str) -> FieldResult {
    required("fullName", value, "Full name")?;
    let len = value.chars().count();
    if len < 3 {
        return Err(FieldError::new(
            "fullName",
            FieldErrorKind::TooShort,
            "Name must have at least 3 characters",
        ));
    }
    if len > 100 {
        return Err(FieldError::new(
            "fullName",
            FieldErrorKind::TooLong,
            "Name must have at most 100 characters",
        ));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> FieldResult {
    required("email", value, "Email")?;
    if !EMAIL_RE.is_match(value) {
        return Err(FieldError::new(
            "email",
            FieldErrorKind::InvalidFormat,
            "Invalid email",
        ));
    }
    Ok(())
}

pub fn validate_phone(value: &str) -> FieldResult {
    required("phone", value, "Phone")?;
    if value.chars().count() < 14 {
        return Err(FieldError::new(
            "phone",
            FieldErrorKind::TooShort,
            "Invalid phone",
        ));
    }
    matches("phone", value, &PHONE_RE, "(11) 98765-4321")
}

pub fn validate_birth_date(value: &str) -> FieldResult {
    required("birthDate", value, "Birth date")?;
    matches("birthDate", value, &DATE_RE, "DD/MM/YYYY")
}

/// Driver licence: exactly eleven digits.
pub fn validate_cnh(value: &str) -> FieldResult {
    required("cnh", value, "Driver licence")?;
    let len = value.chars().count();
    if len < 11 {
        return Err(FieldError::new(
            "cnh",
            FieldErrorKind::TooShort,
            "Driver licence must have 11 digits",
        ));
    }
    if len > 11 {
        return Err(FieldError::new(
            "cnh",
            FieldErrorKind::TooLong,
            "Driver licence must have 11 digits",
        ));
    }
    if !CNH_RE.is_match(value) {
        return Err(FieldError::new(
            "cnh",
            FieldErrorKind::InvalidFormat,
            "Driver licence must contain only digits",
        ));
    }
    Ok(())
}

/// Old (`ABC-1234`) and Mercosul (`ABC1D34`) plates.
pub fn validate_plate(value: &str) -> FieldResult {
    required("plate", value, "Plate")?;
    let len = value.chars().count();
    if len < 7 {
        return Err(FieldError::new(
            "plate",
            FieldErrorKind::TooShort,
            "Invalid plate",
        ));
    }
    if len > 8 {
        return Err(FieldError::new(
            "plate",
            FieldErrorKind::TooLong,
            "Invalid plate",
        ));
    }
    matches("plate", value, &PLATE_RE, "ABC-1234 or ABC1D34")
}

pub fn validate_year(value: &str, current_year: i32) -> FieldResult {
    required("year", value, "Year")?;
    matches("year", value, &YEAR_RE, "YYYY")?;

    let year: i32 = value.parse().map_err(|_| {
        FieldError::new("year", FieldErrorKind::InvalidFormat, "Invalid year")
    })?;
    if !(1900..=current_year + 1).contains(&year) {
        return Err(FieldError::new(
            "year",
            FieldErrorKind::OutOfRange,
            format!("Year must be between 1900 and {}", current_year + 1),
        ));
    }
    Ok(())
}

pub fn validate_postal_code(value: &str) -> FieldResult {
    required("postalCode", value, "Postal code")?;
    if value.chars().count() < 9 {
        return Err(FieldError::new(
            "postalCode",
            FieldErrorKind::TooShort,
            "Invalid postal code",
        ));
    }
    matches("postalCode", value, &POSTAL_CODE_RE, "01310-100")
}

pub fn validate_total_area(value: &str) -> FieldResult {
    required("totalArea", value, "Total area")?;
    match parse_float_prefix(value) {
        Some(area) if area > 0.0 && area <= MAX_TOTAL_AREA => Ok(()),
        Some(_) => Err(FieldError::new(
            "totalArea",
            FieldErrorKind::OutOfRange,
            "Area must be between 1 and 10,000 m²",
        )),
        None => Err(FieldError::new(
            "totalArea",
            FieldErrorKind::InvalidFormat,
            "Area must be a number",
        )),
    }
}

fn collect(results: impl IntoIterator<Item = FieldResult>) -> Result<(), Vec<FieldError>> {
    let errors: Vec<FieldError> = results.into_iter().filter_map(Result::err).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

pub fn validate_auto(data: &AutoData, current_year: i32) -> Result<(), Vec<FieldError>> {
    collect([
        validate_full_name(&data.full_name),
        validate_email(&data.email),
        validate_phone(&data.phone),
        validate_birth_date(&data.birth_date),
        validate_cnh(&data.cnh),
        validate_plate(&data.plate),
        required("brand", &data.brand, "Brand"),
        required("model", &data.model, "Model"),
        validate_year(&data.year, current_year),
        selected("hasTracker", data.has_tracker, "whether the vehicle has a tracker"),
    ])
}

pub fn validate_residential(data: &ResidentialData) -> Result<(), Vec<FieldError>> {
    collect([
        validate_full_name(&data.full_name),
        validate_email(&data.email),
        validate_phone(&data.phone),
        validate_birth_date(&data.birth_date),
        validate_postal_code(&data.postal_code),
        selected("propertyType", data.property_type, "the property type"),
        validate_total_area(&data.total_area),
        selected("hasAlarm", data.has_alarm, "whether the property has an alarm"),
    ])
}

pub fn validate_product(data: &ProductData, current_year: i32) -> Result<(), Vec<FieldError>> {
    match data {
        ProductData::Auto(auto) => validate_auto(auto, current_year),
        ProductData::Residential(home) => validate_residential(home),
    }
}

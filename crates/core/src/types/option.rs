//! Catalog option records and the admin form that produces them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::OptionId;
use super::price::{Price, PriceParseError, mask_typed_digits, parse_display};

/// A purchasable add-on as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonOption {
    /// Store-assigned identifier.
    pub id: OptionId,
    pub name: String,
    pub description: String,
    /// Additional cost when selected. Never negative.
    pub price: Price,
    /// Set by the store on insert.
    pub created_at: DateTime<Utc>,
    /// Set by the store on every write.
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by an admin when creating an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOption {
    pub name: String,
    pub description: String,
    pub price: Price,
}

/// Partial field replacement for an existing option.
///
/// `None` fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
}

impl OptionPatch {
    /// Patch that changes only the price.
    #[must_use]
    pub fn price(price: Price) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }

    /// Build the patch that turns `current` into `edited`, carrying only the
    /// fields that differ.
    #[must_use]
    pub fn between(current: &AddonOption, edited: &NewOption) -> Self {
        Self {
            name: (current.name != edited.name).then(|| edited.name.clone()),
            description: (current.description != edited.description)
                .then(|| edited.description.clone()),
            price: (current.price != edited.price).then_some(edited.price),
        }
    }

    /// Whether the patch changes no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.price.is_none()
    }

    /// Apply the supplied fields to `option` and stamp `updated_at`.
    pub fn apply(&self, option: &mut AddonOption, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            option.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            option.description.clone_from(description);
        }
        if let Some(price) = self.price {
            option.price = price;
        }
        option.updated_at = now;
    }
}

impl From<NewOption> for OptionPatch {
    fn from(fields: NewOption) -> Self {
        Self {
            name: Some(fields.name),
            description: Some(fields.description),
            price: Some(fields.price),
        }
    }
}

/// Local, pre-submission validation failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// At least one form field was left blank.
    #[error("all fields are required (missing {0})")]
    MissingField(&'static str),
    /// The price field could not be read as a number.
    #[error("{0}")]
    InvalidPrice(#[from] PriceParseError),
    /// The price parsed but is below zero.
    #[error("price cannot be negative")]
    NegativePrice,
    /// The price has a fraction of a centavo.
    #[error("price has more than two decimal places")]
    FractionalCents,
}

impl ValidationError {
    /// Message shown to the admin next to the form.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "Preencha todos os campos",
            Self::InvalidPrice(_) => "Preço inválido",
            Self::NegativePrice => "O preço não pode ser negativo",
            Self::FractionalCents => "O preço deve ter no máximo duas casas decimais",
        }
    }
}

/// Raw admin form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Display-form price (`R$ 150,00`) or raw digits.
    #[serde(default)]
    pub price: String,
}

impl OptionForm {
    /// Prefill the form from an existing option.
    #[must_use]
    pub fn from_option(option: &AddonOption) -> Self {
        Self {
            name: option.name.clone(),
            description: option.description.clone(),
            price: option.price.to_string(),
        }
    }

    /// Run a bare-digits price through the input mask (`15000` becomes
    /// `R$ 150,00`). Already formatted prices are left alone.
    #[must_use]
    pub fn with_masked_price(mut self) -> Self {
        let raw = self.price.trim();
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            self.price = mask_typed_digits(raw);
        }
        self
    }

    /// Check every field and convert to store input.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for blank fields,
    /// [`ValidationError::InvalidPrice`] if the price does not parse,
    /// [`ValidationError::NegativePrice`] if it is below zero and
    /// [`ValidationError::FractionalCents`] if it is not a whole centavo
    /// amount.
    pub fn validate(&self) -> Result<NewOption, ValidationError> {
        let name = self.name.trim();
        let description = self.description.trim();
        let price = self.price.trim();

        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if description.is_empty() {
            return Err(ValidationError::MissingField("description"));
        }
        if price.is_empty() {
            return Err(ValidationError::MissingField("price"));
        }

        let price = parse_display(price)?;
        if price.is_negative() {
            return Err(ValidationError::NegativePrice);
        }
        if !price.is_whole_cents() {
            return Err(ValidationError::FractionalCents);
        }

        Ok(NewOption {
            name: name.to_owned(),
            description: description.to_owned(),
            price,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn option() -> AddonOption {
        let at = Utc.with_ymd_and_hms(2026, 1, 10, 12, 0, 0).unwrap();
        AddonOption {
            id: OptionId::new("a"),
            name: "Capa Básica".to_owned(),
            description: "Capa simples em material resistente".to_owned(),
            price: Price::from_cents(15000),
            created_at: at,
            updated_at: at,
        }
    }

    fn form(name: &str, description: &str, price: &str) -> OptionForm {
        OptionForm {
            name: name.to_owned(),
            description: description.to_owned(),
            price: price.to_owned(),
        }
    }

    #[test]
    fn test_validate_accepts_display_price() {
        let fields = form("Relevo", "Textura em relevo", "R$ 110,00")
            .validate()
            .unwrap();
        assert_eq!(fields.name, "Relevo");
        assert_eq!(fields.price, Price::from_cents(11000));
    }

    #[test]
    fn test_validate_requires_every_field() {
        assert_eq!(
            form("", "x", "R$ 1,00").validate(),
            Err(ValidationError::MissingField("name"))
        );
        assert_eq!(
            form("x", "  ", "R$ 1,00").validate(),
            Err(ValidationError::MissingField("description"))
        );
        assert_eq!(
            form("x", "y", "").validate(),
            Err(ValidationError::MissingField("price"))
        );
    }

    #[test]
    fn test_validate_rejects_bad_prices() {
        assert!(matches!(
            form("x", "y", "R$ dez").validate(),
            Err(ValidationError::InvalidPrice(_))
        ));
        assert_eq!(
            form("x", "y", "-R$ 5,00").validate(),
            Err(ValidationError::NegativePrice)
        );
        assert_eq!(
            ValidationError::NegativePrice.user_message(),
            "O preço não pode ser negativo"
        );
    }

    #[test]
    fn test_validate_rejects_fractional_cents() {
        assert_eq!(
            form("x", "y", "1,005").validate(),
            Err(ValidationError::FractionalCents)
        );
        assert_eq!(
            form("x", "y", "R$ 1,50").validate().unwrap().price,
            Price::from_cents(150)
        );
    }

    #[test]
    fn test_patch_between_carries_only_changes() {
        let current = option();
        let edited = NewOption {
            name: current.name.clone(),
            description: current.description.clone(),
            price: Price::from_cents(17500),
        };

        let patch = OptionPatch::between(&current, &edited);
        assert_eq!(patch, OptionPatch::price(Price::from_cents(17500)));
    }

    #[test]
    fn test_patch_apply_stamps_updated_at() {
        let mut current = option();
        let later = current.updated_at + Duration::minutes(5);

        OptionPatch::default().apply(&mut current, later);
        assert_eq!(current.updated_at, later);
        assert_eq!(current.name, "Capa Básica");

        OptionPatch {
            name: Some("Capa Dura".to_owned()),
            ..OptionPatch::default()
        }
        .apply(&mut current, later);
        assert_eq!(current.name, "Capa Dura");
        assert_eq!(current.price, Price::from_cents(15000));
    }

    #[test]
    fn test_masked_price_reads_digits_as_centavos() {
        let masked = form("Capa Básica", "Capa simples", "15000").with_masked_price();
        assert_eq!(masked.price, "R$ 150,00");
        assert_eq!(masked.validate().unwrap().price, Price::from_cents(15000));

        let untouched = form("x", "y", "150,00").with_masked_price();
        assert_eq!(untouched.price, "150,00");
        assert_eq!(form("x", "y", "").with_masked_price().price, "");
    }

    #[test]
    fn test_form_prefill_round_trips() {
        let current = option();
        let fields = OptionForm::from_option(&current).validate().unwrap();
        assert!(OptionPatch::between(&current, &fields).is_empty());
    }
}

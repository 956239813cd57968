//! Built-in starter catalog.
//!
//! Inserted by `cfg-cli seed options` when no file is given, and loaded into
//! the in-memory store for local development.

use crate::types::{NewOption, Price};

/// `(name, description, price in centavos)` of the starter options.
const DEFAULT_OPTIONS: &[(&str, &str, i64)] = &[
    ("Capa Básica", "Capa simples em material resistente", 15000),
    ("Capa Premium", "Capa de alta qualidade com acabamento especial", 35000),
    ("Laminação Fosca", "Acabamento fosco elegante e sofisticado", 8000),
    ("Laminação com Brilho", "Acabamento brilhante que destaca as cores", 8000),
    ("Hot Stamping", "Aplicação de detalhes em dourado ou prateado", 12000),
    ("Verniz Localizado", "Verniz em áreas específicas para destaque", 9500),
    ("Relevo", "Textura em relevo para um efeito tátil", 11000),
    ("Corte Especial", "Corte personalizado não-retangular", 7500),
    ("Material Reciclado", "Opção sustentável com material reciclado", 5000),
    ("Impressão UV", "Impressão com tinta UV de alta durabilidade", 14000),
];

/// The starter catalog as store input.
#[must_use]
pub fn default_options() -> Vec<NewOption> {
    DEFAULT_OPTIONS
        .iter()
        .map(|&(name, description, cents)| NewOption {
            name: name.to_owned(),
            description: description.to_owned(),
            price: Price::from_cents(cents),
        })
        .collect()
}

//! Generated record types.
//!
//! Field order is significant: CSV export writes columns in declaration
//! order, and the serde names match the canonical seed column names consumed
//! by the warehouse.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Country recorded on every generated address.
pub const COUNTRY: &str = "Brasil";

/// Domain used for emails derived from the national id.
pub const EMAIL_DOMAIN: &str = "exemplo.com.br";

/// CSV header of the registrations table, in field declaration order.
pub const REGISTRATION_COLUMNS: [&str; 12] = [
    "id",
    "nome",
    "data_nascimento",
    "cpf",
    "cep",
    "cidade",
    "estado",
    "pais",
    "genero",
    "telefone",
    "email",
    "data_cadastro",
];

/// CSV header of the orders table, in field declaration order.
pub const ORDER_COLUMNS: [&str; 14] = [
    "id_pedido",
    "cpf",
    "valor_pedido",
    "valor_frete",
    "valor_desconto",
    "cupom",
    "endereco_entrega_logradouro",
    "endereco_entrega_numero",
    "endereco_entrega_bairro",
    "endereco_entrega_cidade",
    "endereco_entrega_estado",
    "endereco_entrega_pais",
    "status_pedido",
    "data_pedido",
];

/// A national id (CPF) in the `###.###.###-##` format.
///
/// The value links orders to registrations. It is compared as an opaque
/// string; no check-digit validation is performed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NationalId(String);

impl NationalId {
    /// Builds a national id from its eleven digits.
    ///
    /// Values above nine are written as `0`.
    ///
    /// # Example
    ///
    /// ```
    /// use seed_data::NationalId;
    ///
    /// let id = NationalId::from_digits([1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 1]);
    /// assert_eq!(id.as_str(), "123.456.789-01");
    /// ```
    #[must_use]
    pub fn from_digits(digits: [u8; 11]) -> Self {
        let mut formatted = String::with_capacity(14);
        for (position, digit) in digits.iter().enumerate() {
            match position {
                3 | 6 => formatted.push('.'),
                9 => formatted.push('-'),
                _ => {}
            }
            formatted.push(char::from_digit(u32::from(*digit), 10).unwrap_or('0'));
        }
        Self(formatted)
    }

    /// Returns the formatted national id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns only the digits, as used for the derived email address.
    #[must_use]
    pub fn digits(&self) -> String {
        self.0.chars().filter(char::is_ascii_digit).collect()
    }

    /// Returns the email address derived from this national id.
    #[must_use]
    pub fn derived_email(&self) -> String {
        format!("{}@{EMAIL_DOMAIN}", self.digits())
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Binary gender marker stored on registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Serialized as `M`.
    #[serde(rename = "M")]
    Male,
    /// Serialized as `F`.
    #[serde(rename = "F")]
    Female,
}

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Awaiting payment (`pendente`).
    #[serde(rename = "pendente")]
    Pending,
    /// Paid (`pago`).
    #[serde(rename = "pago")]
    Paid,
    /// Handed to the carrier (`enviado`).
    #[serde(rename = "enviado")]
    Shipped,
    /// Delivered (`entregue`).
    #[serde(rename = "entregue")]
    Delivered,
    /// Cancelled (`cancelado`).
    #[serde(rename = "cancelado")]
    Cancelled,
}

impl OrderStatus {
    /// Every status, in the order used for uniform selection.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Paid,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];
}

/// A generated customer registration (`cadastros` row).
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use seed_data::{Gender, NationalId, Registration};
/// use uuid::Uuid;
///
/// let national_id = NationalId::from_digits([0; 11]);
/// let registration = Registration {
///     id: Uuid::nil(),
///     name: "Ana Souza".to_owned(),
///     birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid date"),
///     email: national_id.derived_email(),
///     national_id,
///     postal_code: "01001-000".to_owned(),
///     city: "São Paulo".to_owned(),
///     region: "SP".to_owned(),
///     country: "Brasil".to_owned(),
///     gender: Gender::Female,
///     phone: "(11) 91234-5678".to_owned(),
///     registered_on: NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date"),
/// };
///
/// assert_eq!(registration.email, "00000000000@exemplo.com.br");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Unique identifier.
    pub id: Uuid,
    /// Full name.
    #[serde(rename = "nome")]
    pub name: String,
    /// Date of birth.
    #[serde(rename = "data_nascimento")]
    pub birth_date: NaiveDate,
    /// National id, unique within a generation batch.
    #[serde(rename = "cpf")]
    pub national_id: NationalId,
    /// Postal code.
    #[serde(rename = "cep")]
    pub postal_code: String,
    /// City name.
    #[serde(rename = "cidade")]
    pub city: String,
    /// State abbreviation.
    #[serde(rename = "estado")]
    pub region: String,
    /// Country name.
    #[serde(rename = "pais")]
    pub country: String,
    /// Gender marker.
    #[serde(rename = "genero")]
    pub gender: Gender,
    /// Phone number.
    #[serde(rename = "telefone")]
    pub phone: String,
    /// Email derived from the national id.
    pub email: String,
    /// Registration date within the requested period.
    #[serde(rename = "data_cadastro")]
    pub registered_on: NaiveDate,
}

/// A generated order (`pedidos` row).
///
/// `coupon` is present exactly when `discount_value` is positive. Money
/// fields keep two decimal places and serialize as decimal strings
/// (`"1234.50"`) in JSON, so no precision is lost to floats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    #[serde(rename = "id_pedido")]
    pub order_id: Uuid,
    /// National id of the purchasing customer; a weak reference.
    #[serde(rename = "cpf")]
    pub national_id: NationalId,
    /// Order value.
    #[serde(rename = "valor_pedido")]
    pub order_value: Decimal,
    /// Shipping value.
    #[serde(rename = "valor_frete")]
    pub shipping_value: Decimal,
    /// Discount value, zero when no coupon applies.
    #[serde(rename = "valor_desconto")]
    pub discount_value: Decimal,
    /// Coupon code backing the discount.
    #[serde(rename = "cupom")]
    pub coupon: Option<String>,
    /// Delivery street.
    #[serde(rename = "endereco_entrega_logradouro")]
    pub delivery_street: String,
    /// Delivery building number.
    #[serde(rename = "endereco_entrega_numero")]
    pub delivery_number: String,
    /// Delivery district.
    #[serde(rename = "endereco_entrega_bairro")]
    pub delivery_district: String,
    /// Delivery city.
    #[serde(rename = "endereco_entrega_cidade")]
    pub delivery_city: String,
    /// Delivery state abbreviation.
    #[serde(rename = "endereco_entrega_estado")]
    pub delivery_region: String,
    /// Delivery country.
    #[serde(rename = "endereco_entrega_pais")]
    pub delivery_country: String,
    /// Order status.
    #[serde(rename = "status_pedido")]
    pub status: OrderStatus,
    /// Order date within the requested period.
    #[serde(rename = "data_pedido")]
    pub ordered_on: NaiveDate,
}

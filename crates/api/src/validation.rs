//! Request payloads and their validation.
//!
//! Bodies are decoded into `*Request` structs whose fields are all optional,
//! so a missing field is reported with the API's own message rather than a
//! serde error. `validate` turns them into domain inputs.

use std::str::FromStr;

use ecommerce_core::{Email, Quantity};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::models::{NewOrder, NewUser, UserChanges};

pub const NOTHING_TO_UPDATE: &str = "Nessun dato da aggiornare";

/// Decode a JSON body. An empty body or `null` decodes as `T::default()`,
/// i.e. every field absent.
///
/// # Errors
///
/// `Validation` if the body is not JSON of the expected shape.
pub fn parse_body<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice::<Option<T>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| ApiError::validation(format!("JSON non valido: {e}")))
}

/// Parse a mandatory identifier query parameter.
///
/// # Errors
///
/// `Validation(missing)` if absent or blank, `Validation` if not an integer.
pub fn require_id<I: FromStr>(raw: Option<&str>, missing: &str) -> Result<I, ApiError> {
    optional_id(raw)?.ok_or_else(|| ApiError::validation(missing))
}

/// Parse an optional identifier or filter. Blank counts as absent.
///
/// # Errors
///
/// `Validation` if present but not an integer.
pub fn optional_id<I: FromStr>(raw: Option<&str>) -> Result<Option<I>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ApiError::validation(format!("Identificativo non valido: {value}"))),
    }
}

fn non_blank(value: String, field: &str) -> Result<String, ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::validation(format!(
            "Il campo {field} non può essere vuoto"
        )))
    } else {
        Ok(value)
    }
}

fn parse_email(value: &str) -> Result<Email, ApiError> {
    Email::parse(value).map_err(|e| ApiError::validation(format!("Email non valida: {e}")))
}

fn parse_quantity(value: i64) -> Result<Quantity, ApiError> {
    Quantity::new(value).map_err(|e| ApiError::validation(format!("Quantità non valida: {e}")))
}

/// `POST /api/utenti`
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    pub email: Option<String>,
}

impl CreateUserRequest {
    /// # Errors
    ///
    /// `Validation` if `nome` or `email` is missing, blank or malformed.
    pub fn validate(self) -> Result<NewUser, ApiError> {
        let (Some(name), Some(email)) = (self.name, self.email) else {
            return Err(ApiError::validation("Nome e email sono obbligatori"));
        };
        Ok(NewUser {
            name: non_blank(name, "nome")?,
            email: parse_email(&email)?,
        })
    }
}

/// `PUT /api/utenti?id=N`
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(rename = "nome")]
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UpdateUserRequest {
    /// # Errors
    ///
    /// `Validation` if no field is present or a present field is invalid.
    pub fn validate(self) -> Result<UserChanges, ApiError> {
        let changes = UserChanges {
            name: self.name.map(|n| non_blank(n, "nome")).transpose()?,
            email: self.email.as_deref().map(parse_email).transpose()?,
        };
        if changes.is_empty() {
            return Err(ApiError::validation(NOTHING_TO_UPDATE));
        }
        Ok(changes)
    }
}

/// `POST /api/ordini`. `utente` is the owner's email.
#[derive(Debug, Default, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(rename = "utente")]
    pub customer_email: Option<String>,
    #[serde(rename = "prodotto")]
    pub product: Option<String>,
    #[serde(rename = "quantita")]
    pub quantity: Option<i64>,
}

impl CreateOrderRequest {
    /// # Errors
    ///
    /// `Validation` if a field is missing, the product is blank or the
    /// quantity is not positive.
    pub fn validate(self) -> Result<NewOrder, ApiError> {
        let (Some(customer_email), Some(product), Some(quantity)) =
            (self.customer_email, self.product, self.quantity)
        else {
            return Err(ApiError::validation("Dati mancanti"));
        };
        Ok(NewOrder {
            customer_email: customer_email.trim().to_owned(),
            product: non_blank(product, "prodotto")?,
            quantity: parse_quantity(quantity)?,
        })
    }
}

/// `PUT /api/ordini?id=N`
#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    #[serde(rename = "utente")]
    pub customer_email: Option<String>,
    #[serde(rename = "prodotto")]
    pub product: Option<String>,
    #[serde(rename = "quantita")]
    pub quantity: Option<i64>,
}

/// A checked order update whose new owner (if any) is still an email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderUpdate {
    pub customer_email: Option<String>,
    pub product: Option<String>,
    pub quantity: Option<Quantity>,
}

impl UpdateOrderRequest {
    /// # Errors
    ///
    /// `Validation` if no field is present or a present field is invalid.
    pub fn validate(self) -> Result<OrderUpdate, ApiError> {
        let update = OrderUpdate {
            customer_email: self.customer_email.map(|e| e.trim().to_owned()),
            product: self.product.map(|p| non_blank(p, "prodotto")).transpose()?,
            quantity: self.quantity.map(parse_quantity).transpose()?,
        };
        if update.customer_email.is_none() && update.product.is_none() && update.quantity.is_none()
        {
            return Err(ApiError::validation(NOTHING_TO_UPDATE));
        }
        Ok(update)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ecommerce_core::UserId;

    use super::*;

    fn message(err: ApiError) -> String {
        match err {
            ApiError::Validation(m) => m,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_body_empty_and_null() {
        let empty: CreateUserRequest = parse_body(b"").unwrap();
        assert!(empty.name.is_none());

        let null: CreateUserRequest = parse_body(b" null ").unwrap();
        assert!(null.email.is_none());
    }

    #[test]
    fn test_parse_body_rejects_bad_json() {
        let err = parse_body::<CreateUserRequest>(b"{nome:").unwrap_err();
        assert!(message(err).starts_with("JSON non valido"));

        let wrong_type = parse_body::<CreateOrderRequest>(br#"{"quantita": "tre"}"#);
        assert!(wrong_type.is_err());
    }

    #[test]
    fn test_ids() {
        assert_eq!(
            require_id::<UserId>(Some("4"), "ID utente mancante").unwrap(),
            UserId::new(4)
        );
        assert_eq!(
            message(require_id::<UserId>(None, "ID utente mancante").unwrap_err()),
            "ID utente mancante"
        );
        assert_eq!(
            message(require_id::<UserId>(Some(" "), "ID utente mancante").unwrap_err()),
            "ID utente mancante"
        );
        assert!(require_id::<UserId>(Some("abc"), "ID utente mancante").is_err());
        assert_eq!(optional_id::<UserId>(Some("")).unwrap(), None);
    }

    #[test]
    fn test_create_user() {
        let req: CreateUserRequest =
            parse_body(br#"{"nome": "Anna", "email": "a@x.com"}"#).unwrap();
        let user = req.validate().unwrap();
        assert_eq!(user.name, "Anna");
        assert_eq!(user.email.as_str(), "a@x.com");

        let missing: CreateUserRequest = parse_body(br#"{"nome": "Anna"}"#).unwrap();
        assert_eq!(
            message(missing.validate().unwrap_err()),
            "Nome e email sono obbligatori"
        );

        let bad: CreateUserRequest = parse_body(br#"{"nome": "Anna", "email": "anna"}"#).unwrap();
        assert!(message(bad.validate().unwrap_err()).starts_with("Email non valida"));
    }

    #[test]
    fn test_update_user_requires_a_field() {
        let none: UpdateUserRequest = parse_body(b"{}").unwrap();
        assert_eq!(message(none.validate().unwrap_err()), NOTHING_TO_UPDATE);

        let only_null: UpdateUserRequest = parse_body(br#"{"nome": null}"#).unwrap();
        assert_eq!(message(only_null.validate().unwrap_err()), NOTHING_TO_UPDATE);

        let one: UpdateUserRequest = parse_body(br#"{"nome": "Anna Maria"}"#).unwrap();
        let changes = one.validate().unwrap();
        assert_eq!(changes.name.as_deref(), Some("Anna Maria"));
        assert!(changes.email.is_none());
    }

    #[test]
    fn test_create_order() {
        let req: CreateOrderRequest =
            parse_body(br#"{"utente": " a@x.com ", "prodotto": "Penna", "quantita": 2}"#).unwrap();
        let order = req.validate().unwrap();
        assert_eq!(order.customer_email, "a@x.com");
        assert_eq!(order.quantity.get(), 2);

        let missing: CreateOrderRequest =
            parse_body(br#"{"utente": "a@x.com", "prodotto": "Penna"}"#).unwrap();
        assert_eq!(message(missing.validate().unwrap_err()), "Dati mancanti");

        let zero: CreateOrderRequest =
            parse_body(br#"{"utente": "a@x.com", "prodotto": "Penna", "quantita": 0}"#).unwrap();
        assert!(message(zero.validate().unwrap_err()).starts_with("Quantità non valida"));
    }

    #[test]
    fn test_update_order() {
        let none: UpdateOrderRequest = parse_body(b"").unwrap();
        assert_eq!(message(none.validate().unwrap_err()), NOTHING_TO_UPDATE);

        let qty: UpdateOrderRequest = parse_body(br#"{"quantita": 5}"#).unwrap();
        let update = qty.validate().unwrap();
        assert_eq!(update.quantity.map(Quantity::get), Some(5));
        assert!(update.customer_email.is_none());
        assert!(update.product.is_none());
    }
}

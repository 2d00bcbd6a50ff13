use serde::{Deserialize, Serialize};

use shopkeep_core::{CustomerId, DomainError, DomainResult, Entity};
use shopkeep_store::{Direction, FilterOp, Query, RemoteStore};

use crate::repo::{self, CatalogError, NewRecord, RemoteEntity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// GST registration number, for business customers.
    #[serde(default)]
    pub gst_id: Option<String>,
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &CustomerId {
        &self.id
    }
}

impl RemoteEntity for Customer {
    const TABLE: &'static str = "customers";
    const DEFAULT_ORDER: Option<(&'static str, Direction)> = Some(("name", Direction::Asc));
}

fn validate_phone(phone: &str) -> DomainResult<()> {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    let allowed = phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '(' | ')'));
    if !allowed || !(7..=15).contains(&digits) {
        return Err(DomainError::validation(format!("invalid phone number {phone:?}")));
    }
    Ok(())
}

fn validate_email(email: Option<&str>) -> DomainResult<()> {
    match email {
        Some(e) if !e.is_empty() => {
            let valid = e
                .split_once('@')
                .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.'));
            if !valid {
                return Err(DomainError::validation(format!("invalid email address {e:?}")));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gst_id: Option<String>,
}

impl NewRecord for NewCustomer {
    type Entity = Customer;

    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("customer name is required"));
        }
        validate_phone(&self.phone)?;
        validate_email(self.email.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gst_id: Option<String>,
}

pub async fn list<S: RemoteStore + ?Sized>(store: &S) -> Result<Vec<Customer>, CatalogError> {
    repo::list(store, Query::all()).await
}

/// Customers whose name contains `text`, case-insensitively.
pub async fn search<S: RemoteStore + ?Sized>(
    store: &S,
    text: &str,
) -> Result<Vec<Customer>, CatalogError> {
    let text = text.trim();
    if text.is_empty() {
        return list(store).await;
    }
    repo::list(store, Query::all().filter("name", FilterOp::IContains, text)).await
}

pub async fn create<S: RemoteStore + ?Sized>(
    store: &S,
    new: &NewCustomer,
) -> Result<Customer, CatalogError> {
    repo::create(store, new).await
}

pub async fn update<S: RemoteStore + ?Sized>(
    store: &S,
    id: CustomerId,
    patch: &CustomerPatch,
) -> Result<Customer, CatalogError> {
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(DomainError::validation("customer name is required").into());
    }
    if let Some(phone) = &patch.phone {
        validate_phone(phone)?;
    }
    validate_email(patch.email.as_deref())?;
    repo::update(store, &id, patch).await
}

pub async fn delete<S: RemoteStore + ?Sized>(
    store: &S,
    id: CustomerId,
) -> Result<(), CatalogError> {
    repo::delete::<Customer, S>(store, &id).await
}

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Customer;
use crate::db::types::CustomerStatus;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CustomerCreate {
    #[validate(length(min = 1, max = 120))]
    pub(crate) name: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub(crate) website: Option<String>,
    #[validate(email)]
    pub(crate) email: String,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub(crate) phone: Option<String>,
    #[validate(length(min = 1))]
    pub(crate) address: String,
    #[serde(default = "default_status")]
    pub(crate) status: CustomerStatus,
    #[serde(default)]
    #[serde(alias = "contractDate")]
    pub(crate) contract_date: Option<String>,
    #[serde(default)]
    #[serde(alias = "renewalDate")]
    pub(crate) renewal_date: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CustomerUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 120))]
    pub(crate) name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub(crate) description: Option<String>,
    #[serde(default)]
    #[validate(url)]
    pub(crate) website: Option<String>,
    #[serde(default)]
    #[validate(email)]
    pub(crate) email: Option<String>,
    #[serde(default)]
    #[validate(length(max = 20))]
    pub(crate) phone: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub(crate) address: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<CustomerStatus>,
    #[serde(default)]
    #[serde(alias = "contractDate")]
    pub(crate) contract_date: Option<String>,
    #[serde(default)]
    #[serde(alias = "renewalDate")]
    pub(crate) renewal_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CustomerResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) website: Option<String>,
    pub(crate) email: String,
    pub(crate) phone: Option<String>,
    pub(crate) address: String,
    pub(crate) status: CustomerStatus,
    pub(crate) photo: String,
    pub(crate) contract_date: Option<String>,
    pub(crate) renewal_date: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl CustomerResponse {
    pub(crate) fn from_db(customer: Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            slug: customer.slug,
            description: customer.description,
            website: customer.website,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
            status: customer.status,
            photo: customer.photo,
            contract_date: customer.contract_date.map(format_primitive),
            renewal_date: customer.renewal_date.map(format_primitive),
            created_at: format_primitive(customer.created_at),
            updated_at: format_primitive(customer.updated_at),
        }
    }
}

fn default_status() -> CustomerStatus {
    CustomerStatus::Contacted
}

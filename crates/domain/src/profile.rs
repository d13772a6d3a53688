use crate::shared::entity::{Entity, ID};

/// Extended profile of a clinic user. Read by the message templates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Profile {
    pub user_id: ID,
    pub full_name: Option<String>,
    pub clinic_name: Option<String>,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_sort_code: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BankDetails<'a> {
    pub bank_name: &'a str,
    pub account_number: &'a str,
    pub sort_code: &'a str,
}

fn non_blank(val: &Option<String>) -> Option<&str> {
    val.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Entity for Profile {
    fn id(&self) -> &ID {
        &self.user_id
    }
}

impl Profile {
    pub fn new(user_id: ID) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }

    /// The name patients know the clinic by
    pub fn display_name(&self) -> Option<&str> {
        non_blank(&self.clinic_name).or_else(|| non_blank(&self.full_name))
    }

    /// Bank details are only usable when all parts are present
    pub fn bank_details(&self) -> Option<BankDetails<'_>> {
        Some(BankDetails {
            bank_name: non_blank(&self.bank_name)?,
            account_number: non_blank(&self.bank_account_number)?,
            sort_code: non_blank(&self.bank_sort_code)?,
        })
    }
}

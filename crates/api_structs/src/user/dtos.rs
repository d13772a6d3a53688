use clinic_domain::Profile;
use serde::{Deserialize, Serialize};

/// The profile fields of a clinic user, absent fields are left out
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDTO {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_sort_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ProfileDTO {
    pub fn new(profile: Profile) -> Self {
        Self {
            full_name: profile.full_name,
            clinic_name: profile.clinic_name,
            bank_name: profile.bank_name,
            bank_account_number: profile.bank_account_number,
            bank_sort_code: profile.bank_sort_code,
            phone: profile.phone,
        }
    }
}

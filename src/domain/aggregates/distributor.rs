//! Distributor applications (reseller lead capture)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplicationStatus { #[default] Pending, Approved, Rejected, Withdrawn }

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self { Self::Pending => "pending", Self::Approved => "approved", Self::Rejected => "rejected", Self::Withdrawn => "withdrawn" };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributorApplication {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl DistributorApplication {
    pub fn is_pending(&self) -> bool { self.status == ApplicationStatus::Pending }

    pub fn ensure_withdrawable(&self) -> Result<(), ApplicationError> {
        if self.is_pending() { Ok(()) } else { Err(ApplicationError::NotPending(self.status)) }
    }

    pub fn ensure_reviewable(&self) -> Result<(), ApplicationError> {
        if self.is_pending() { Ok(()) } else { Err(ApplicationError::NotPending(self.status)) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDraft {
    pub user_id: String,
    #[validate(length(min = 1, message = "company name is required"))]
    pub company_name: String,
    #[validate(length(min = 1, message = "contact name is required"))]
    pub contact_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 7, max = 20, message = "phone number looks wrong"))]
    pub phone: String,
    pub message: Option<String>,
}

/// Admin verdict on a pending application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision { Approve, Reject }

impl Decision {
    pub fn resulting_status(&self) -> ApplicationStatus {
        match self { Self::Approve => ApplicationStatus::Approved, Self::Reject => ApplicationStatus::Rejected }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum ApplicationError { NotPending(ApplicationStatus), AlreadyPending }
impl std::error::Error for ApplicationError {}
impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPending(s) => write!(f, "application is already {}", s),
            Self::AlreadyPending => write!(f, "an application is already awaiting review"),
        }
    }
}

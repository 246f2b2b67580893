//! Product reviews
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,
    pub product_id: String,
    pub user_id: String,
    pub user_name: String,
    #[serde(rename = "reviewValue")]
    pub rating: u8,
    #[serde(rename = "reviewMessage")]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDraft {
    pub product_id: String,
    pub user_id: String,
    pub user_name: String,
    #[serde(rename = "reviewValue")]
    #[validate(range(min = 1, max = 5, message = "pick a rating between 1 and 5"))]
    pub rating: u8,
    #[serde(rename = "reviewMessage")]
    #[validate(custom = "not_blank")]
    pub comment: String,
}

impl ReviewDraft {
    pub fn new(product_id: impl Into<String>, user_id: impl Into<String>, user_name: impl Into<String>, rating: u8, comment: &str) -> Self {
        Self {
            product_id: product_id.into(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            rating,
            comment: comment.trim().to_string(),
        }
    }
}

fn not_blank(comment: &str) -> Result<(), ValidationError> {
    if comment.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("write a comment".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_rating_or_comment() {
        assert!(ReviewDraft::new("P1", "U1", "Ada", 0, "great").validate().is_err());
        assert!(ReviewDraft::new("P1", "U1", "Ada", 4, "   ").validate().is_err());
        assert!(ReviewDraft::new("P1", "U1", "Ada", 6, "great").validate().is_err());
        assert!(ReviewDraft::new("P1", "U1", "Ada", 5, " great ").validate().is_ok());
    }

    #[test]
    fn test_blank_comment_built_directly() {
        let draft = ReviewDraft {
            product_id: "P1".into(), user_id: "U1".into(), user_name: "Ada".into(),
            rating: 4, comment: " \t ".into(),
        };
        assert!(draft.validate().is_err());
    }
}

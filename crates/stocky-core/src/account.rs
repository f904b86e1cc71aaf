//! # Account Input
//!
//! Registration, login and profile payloads, checked before any hashing or
//! database work happens.
//!
//! ```text
//! RegisterRequest ──validate()──► Registration
//!                                   ├── email (trimmed, lowercased)
//!                                   ├── password (length-checked)
//!                                   ├── role (COMPANY_ADMIN | SHOP_OWNER)
//!                                   └── shop (required for SHOP_OWNER)
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::{NewShop, ShopInput};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::Role;
use crate::validation::{validate_email, validate_password};

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub shop: Option<ShopInput>,
}

/// A registration that passed every check.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub role: Role,
    /// Present exactly when `role` is [`Role::ShopOwner`].
    pub shop: Option<NewShop>,
}

impl RegisterRequest {
    /// ## Errors
    /// - `Missing` when email, password or role is missing
    /// - [`CoreError::InvalidRole`] for an unknown role or `SUPER_ADMIN`
    /// - `Missing` for a shop owner without a shop name
    /// - email/password format errors
    pub fn validate(&self) -> CoreResult<Registration> {
        let (Some(email), Some(password), Some(role)) = (
            self.email.as_deref().filter(|e| !e.trim().is_empty()),
            self.password.as_deref().filter(|p| !p.is_empty()),
            self.role.as_deref().filter(|r| !r.trim().is_empty()),
        ) else {
            return Err(ValidationError::missing("email, password, role").into());
        };

        let role: Role = role.trim().parse()?;
        if !role.is_self_registrable() {
            return Err(CoreError::InvalidRole(role.to_string()));
        }

        let email = validate_email(email)?;
        validate_password(password)?;

        let shop = match role {
            Role::ShopOwner => {
                let input = self.shop.as_ref().ok_or_else(shop_name_missing)?;
                Some(input.validate().map_err(|err| match err {
                    ValidationError::Required { .. } => shop_name_missing(),
                    other => other,
                })?)
            }
            _ => None,
        };

        Ok(Registration {
            email,
            password: password.to_string(),
            role,
            shop,
        })
    }
}

fn shop_name_missing() -> ValidationError {
    ValidationError::Missing("shop.name required for SHOP_OWNER".to_string())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Returns the normalised email and the password.
    ///
    /// Only presence is checked; a malformed email simply fails to match.
    pub fn credentials(&self) -> CoreResult<(String, &str)> {
        match (
            self.email.as_deref().map(str::trim).filter(|e| !e.is_empty()),
            self.password.as_deref().filter(|p| !p.is_empty()),
        ) {
            (Some(email), Some(password)) => Ok((email.to_lowercase(), password)),
            _ => Err(ValidationError::missing("email and password").into()),
        }
    }
}

/// `PATCH /auth/me` body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A checked profile change. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidProfileUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl ValidProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.password.is_none()
    }
}

impl ProfileUpdate {
    pub fn validate(&self) -> CoreResult<ValidProfileUpdate> {
        let email = self.email.as_deref().map(validate_email).transpose()?;
        let password = match self.password.as_deref() {
            Some(p) => {
                validate_password(p)?;
                Some(p.to_string())
            }
            None => None,
        };
        Ok(ValidProfileUpdate { email, password })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn register(role: &str) -> RegisterRequest {
        RegisterRequest {
            email: Some(" Owner@Shop.Test ".to_string()),
            password: Some("hunter22".to_string()),
            role: Some(role.to_string()),
            shop: None,
        }
    }

    #[test]
    fn test_company_admin_registration() {
        let reg = register("COMPANY_ADMIN").validate().unwrap();
        assert_eq!(reg.email, "owner@shop.test");
        assert_eq!(reg.role, Role::CompanyAdmin);
        assert!(reg.shop.is_none());
    }

    #[test]
    fn test_shop_owner_needs_shop_name() {
        let err = register("SHOP_OWNER").validate().unwrap_err();
        assert_eq!(err.to_string(), "shop.name required for SHOP_OWNER");

        let mut req = register("SHOP_OWNER");
        req.shop = Some(ShopInput {
            name: Some("  ".to_string()),
            ..Default::default()
        });
        assert_eq!(
            req.validate().unwrap_err().to_string(),
            "shop.name required for SHOP_OWNER"
        );

        req.shop = Some(ShopInput {
            name: Some("Corner Mart".to_string()),
            address: Some("5 High St".to_string()),
            contact: None,
        });
        let reg = req.validate().unwrap();
        assert_eq!(reg.shop.unwrap().name, "Corner Mart");
    }

    #[test]
    fn test_super_admin_cannot_self_register() {
        assert!(matches!(
            register("SUPER_ADMIN").validate(),
            Err(CoreError::InvalidRole(_))
        ));
        assert!(matches!(
            register("JANITOR").validate(),
            Err(CoreError::InvalidRole(_))
        ));
    }

    #[test]
    fn test_missing_fields() {
        let mut req = register("COMPANY_ADMIN");
        req.password = None;
        assert_eq!(
            req.validate().unwrap_err().to_string(),
            "email, password, role required"
        );

        let mut req = register("COMPANY_ADMIN");
        req.password = Some("short".to_string());
        assert!(matches!(
            req.validate(),
            Err(CoreError::Validation(ValidationError::TooShort { .. }))
        ));
    }

    #[test]
    fn test_login_credentials() {
        let req = LoginRequest {
            email: Some(" Admin@Stocky.io".to_string()),
            password: Some("Admin@123".to_string()),
        };
        let (email, password) = req.credentials().unwrap();
        assert_eq!(email, "admin@stocky.io");
        assert_eq!(password, "Admin@123");

        assert_eq!(
            LoginRequest::default().credentials().unwrap_err().to_string(),
            "email and password required"
        );
    }

    #[test]
    fn test_profile_update() {
        let update = ProfileUpdate {
            email: Some("NEW@shop.test".to_string()),
            password: None,
        }
        .validate()
        .unwrap();
        assert_eq!(update.email.as_deref(), Some("new@shop.test"));
        assert!(!update.is_empty());

        assert!(ProfileUpdate::default().validate().unwrap().is_empty());
        assert!(ProfileUpdate {
            email: None,
            password: Some("123".to_string())
        }
        .validate()
        .is_err());
    }
}

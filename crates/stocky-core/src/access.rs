//! # Access Control
//!
//! Who may do what. Every API route names one [`Operation`]; the handler asks
//! the caller's [`Principal`] to authorize it before touching data.
//!
//! ## Permission Table
//! ```text
//! ┌──────────────────────────────┬─────────────┬───────────────┬────────────┐
//! │ Operation                    │ SUPER_ADMIN │ COMPANY_ADMIN │ SHOP_OWNER │
//! ├──────────────────────────────┼─────────────┼───────────────┼────────────┤
//! │ ViewProfile / BrowseCompanies│      ✓      │       ✓       │     ✓      │
//! │ ListAllCompanies             │      ✓      │               │            │
//! │ ChangeCompanyStatus          │      ✓      │               │            │
//! │ ListShops / ChangeShopStatus │      ✓      │               │            │
//! │ CreateCompany / ViewOwnCo.   │             │       ✓       │            │
//! │ ManageProducts               │             │       ✓       │            │
//! │ ListCompanyOrders            │             │       ✓       │            │
//! │ ChangeOrderStatus            │             │       ✓       │            │
//! │ PlaceOrder / PreviewCart     │             │               │     ✓      │
//! │ ListOwnOrders                │             │               │     ✓      │
//! └──────────────────────────────┴─────────────┴───────────────┴────────────┘
//! ```
//!
//! Role checks answer "may this kind of user call this route". Tenant scoping
//! (an admin only sees their own company's orders) is enforced on top of this
//! by resolving the caller's company and filtering every query by it.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::Role;

/// The authenticated caller, as carried in an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: String,
    pub role: Role,
    pub company_id: Option<String>,
    pub shop_id: Option<String>,
}

/// Every role-gated action the API exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ViewProfile,
    BrowseCompanies,
    ListAllCompanies,
    ChangeCompanyStatus,
    ListShops,
    ChangeShopStatus,
    CreateCompany,
    ViewOwnCompany,
    ManageProducts,
    ListCompanyOrders,
    ChangeOrderStatus,
    PlaceOrder,
    PreviewCart,
    ListOwnOrders,
}

const ANY_ROLE: &[Role] = &[Role::SuperAdmin, Role::CompanyAdmin, Role::ShopOwner];
const PLATFORM: &[Role] = &[Role::SuperAdmin];
const COMPANY: &[Role] = &[Role::CompanyAdmin];
const SHOP: &[Role] = &[Role::ShopOwner];

impl Operation {
    /// Roles allowed to perform this operation.
    pub const fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Operation::ViewProfile | Operation::BrowseCompanies => ANY_ROLE,
            Operation::ListAllCompanies
            | Operation::ChangeCompanyStatus
            | Operation::ListShops
            | Operation::ChangeShopStatus => PLATFORM,
            Operation::CreateCompany
            | Operation::ViewOwnCompany
            | Operation::ManageProducts
            | Operation::ListCompanyOrders
            | Operation::ChangeOrderStatus => COMPANY,
            Operation::PlaceOrder | Operation::PreviewCart | Operation::ListOwnOrders => SHOP,
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }
}

impl Principal {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Principal {
            user_id: user_id.into(),
            role,
            company_id: None,
            shop_id: None,
        }
    }

    pub fn with_company(mut self, company_id: Option<String>) -> Self {
        self.company_id = company_id;
        self
    }

    pub fn with_shop(mut self, shop_id: Option<String>) -> Self {
        self.shop_id = shop_id;
        self
    }

    /// Fails with [`CoreError::Forbidden`] unless the role may perform `op`.
    pub fn authorize(&self, op: Operation) -> CoreResult<()> {
        if op.permits(self.role) {
            Ok(())
        } else {
            Err(CoreError::Forbidden)
        }
    }

    /// Fails with [`CoreError::Forbidden`] unless the role is one of `roles`.
    pub fn require_any(&self, roles: &[Role]) -> CoreResult<()> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(CoreError::Forbidden)
        }
    }
}

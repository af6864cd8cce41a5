//! Permission system with type-safe authorization extractors
//!
//! Usage in handlers:
//! ```ignore
//! use crate::middleware::{Authorized, permissions::*};
//!
//! async fn list_orders(
//!     auth: Authorized<OrdersView>,
//!     State(state): State<AppState>,
//! ) -> Result<Json<Vec<order::Model>>> {
//!     // Permission already verified
//! }
//! ```

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::models::role::{CUSTOMER_SERVICE, FINANCE, KASIR, LOKET, MANAGER, OWNER, TEKNISI};
use crate::models::user;

/// Trait for permission marker types
pub trait Permission: Send + Sync + 'static {
    /// The permission string (e.g., "orders.view")
    const NAME: &'static str;
}

/// Creates zero-sized marker types that implement `Permission`
macro_rules! define_permissions {
    ($($(#[$meta:meta])* $name:ident => $perm:expr),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name;

            impl Permission for $name {
                const NAME: &'static str = $perm;
            }
        )*
    };
}

define_permissions! {
    // Businesses
    BusinessesView => "businesses.view",
    BusinessesManage => "businesses.manage",

    // Orders
    OrdersView => "orders.view",
    OrdersCreate => "orders.create",

    // Transactions
    TransactionsView => "transactions.view",
    TransactionsCreate => "transactions.create",
    TransactionsEdit => "transactions.edit",
    TransactionsDelete => "transactions.delete",

    /// Accounting summaries and period reports
    AccountingView => "accounting.view",

    // Daily reports
    ReportsView => "reports.view",
    ReportsCreate => "reports.create",
    ReportsEdit => "reports.edit",
    ReportsDelete => "reports.delete",
    /// Compare daily reports with recorded transactions
    ReportsReconcile => "reports.reconcile",

    // Field technicians
    TeknisiView => "teknisi.view",
    TeknisiUpdate => "teknisi.update",

    // Technical progress
    ProgressView => "progress.view",
    ProgressUpdate => "progress.update",

    // Loyalty and CSR programs
    ProgramsView => "programs.view",
    ProgramsCreate => "programs.create",
    ProgramsUpdate => "programs.update",
    ProgramsDelete => "programs.delete",

    // Users
    UsersView => "users.view",
    /// Edit profiles and roles; managers cannot edit owners
    UsersEdit => "users.edit",
    /// Delete and (de)activate accounts
    UsersManage => "users.manage",

    /// Audit trail
    ActivityView => "activity.view",

    // Settings
    SettingsView => "settings.view",
    SettingsManage => "settings.manage",

    DashboardView => "dashboard.view",

    /// Wipe operational data
    DataReset => "data.reset",
}

const ALL_ROLES: &[i32] = &[OWNER, MANAGER, FINANCE, CUSTOMER_SERVICE, KASIR, LOKET, TEKNISI];
const NON_TEKNISI: &[i32] = &[OWNER, MANAGER, FINANCE, CUSTOMER_SERVICE, KASIR, LOKET];

/// Roles granted each permission
const PERMISSION_MATRIX: &[(&str, &[i32])] = &[
    (BusinessesView::NAME, &[OWNER, MANAGER]),
    (BusinessesManage::NAME, &[OWNER, MANAGER]),
    (OrdersView::NAME, &[OWNER, MANAGER, KASIR, LOKET]),
    (OrdersCreate::NAME, &[OWNER, MANAGER, CUSTOMER_SERVICE, KASIR, LOKET]),
    (TransactionsView::NAME, &[OWNER, MANAGER, FINANCE]),
    (
        TransactionsCreate::NAME,
        &[OWNER, MANAGER, FINANCE, CUSTOMER_SERVICE, KASIR, LOKET],
    ),
    (TransactionsEdit::NAME, &[OWNER, MANAGER, FINANCE, KASIR]),
    (TransactionsDelete::NAME, &[OWNER]),
    (AccountingView::NAME, &[OWNER, MANAGER, FINANCE]),
    (ReportsView::NAME, &[OWNER, MANAGER, FINANCE, KASIR, LOKET]),
    (ReportsCreate::NAME, &[OWNER, MANAGER, FINANCE, KASIR, LOKET]),
    (ReportsEdit::NAME, &[OWNER, MANAGER]),
    (ReportsDelete::NAME, &[OWNER]),
    (ReportsReconcile::NAME, &[OWNER, MANAGER, FINANCE]),
    (TeknisiView::NAME, &[OWNER, MANAGER, KASIR, TEKNISI]),
    (TeknisiUpdate::NAME, &[OWNER, MANAGER, TEKNISI]),
    (
        ProgressView::NAME,
        &[OWNER, MANAGER, CUSTOMER_SERVICE, KASIR, LOKET, TEKNISI],
    ),
    (ProgressUpdate::NAME, &[OWNER, MANAGER, TEKNISI]),
    (ProgramsView::NAME, NON_TEKNISI),
    (ProgramsCreate::NAME, NON_TEKNISI),
    (ProgramsUpdate::NAME, NON_TEKNISI),
    (ProgramsDelete::NAME, &[OWNER, MANAGER]),
    (UsersView::NAME, &[OWNER]),
    (UsersEdit::NAME, &[OWNER, MANAGER]),
    (UsersManage::NAME, &[OWNER]),
    (ActivityView::NAME, &[OWNER, MANAGER]),
    (SettingsView::NAME, ALL_ROLES),
    (SettingsManage::NAME, &[OWNER]),
    (DashboardView::NAME, ALL_ROLES),
    (DataReset::NAME, &[OWNER]),
];

/// Whether a role is granted a permission; unknown permissions are denied
pub fn role_has_permission(role_id: i32, permission: &str) -> bool {
    PERMISSION_MATRIX
        .iter()
        .find(|(name, _)| *name == permission)
        .is_some_and(|(_, roles)| roles.contains(&role_id))
}

/// Every permission a role holds, in matrix order
pub fn permissions_for_role(role_id: i32) -> Vec<&'static str> {
    PERMISSION_MATRIX
        .iter()
        .filter(|(_, roles)| roles.contains(&role_id))
        .map(|(name, _)| *name)
        .collect()
}

/// Extractor that requires a specific permission
///
/// Verifies that the authenticated user holds the permission before the
/// handler runs. Fails with 403 Forbidden otherwise.
#[derive(Debug, Clone)]
pub struct Authorized<P: Permission>(pub user::Model, PhantomData<P>);

impl<P: Permission> Authorized<P> {
    pub fn user(&self) -> &user::Model {
        &self.0
    }

    pub fn user_id(&self) -> &str {
        &self.0.id
    }
}

impl<S, P> FromRequestParts<S> for Authorized<P>
where
    S: Send + Sync,
    P: Permission,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        if !auth_user.has_permission(P::NAME) {
            return Err(AppError::Forbidden(format!(
                "Permission denied: {} required",
                P::NAME
            )));
        }

        Ok(Authorized(auth_user.user.clone(), PhantomData))
    }
}

/// Extractor for any authenticated user (no specific permission required)
#[derive(Debug, Clone)]
pub struct Authenticated(pub user::Model);

impl Authenticated {
    pub fn user(&self) -> &user::Model {
        &self.0
    }

    pub fn user_id(&self) -> &str {
        &self.0.id
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        Ok(Authenticated(auth_user.user.clone()))
    }
}

//! Access Guard
//!
//! Única regla de aislamiento entre tenants: un principal con scope solo ve
//! su garage; el admin de plataforma ve todos. Toda ruta de lectura o
//! escritura pasa por aquí antes de devolver o persistir datos.

use tracing::warn;

use crate::models::auth::{Principal, TenantScope};
use crate::utils::errors::{AppError, AppResult};

/// Resultado de la verificación
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied,
}

pub fn authorize(principal: &Principal, target_garage_id: i64) -> Access {
    match principal.scope {
        TenantScope::AllGarages => Access::Allowed,
        TenantScope::Garage(garage_id) if garage_id == target_garage_id => Access::Allowed,
        TenantScope::Garage(_) => Access::Denied,
    }
}

/// Igual que `authorize` pero convierte la denegación en `Unauthorized`
pub fn ensure(principal: &Principal, target_garage_id: i64, resource: &str) -> AppResult<()> {
    match authorize(principal, target_garage_id) {
        Access::Allowed => Ok(()),
        Access::Denied => {
            warn!(
                "🚫 User {} denied on {} of garage {}",
                principal.user_id, resource, target_garage_id
            );
            Err(AppError::Unauthorized(format!(
                "user {} cannot access {} of garage {}",
                principal.user_id, resource, target_garage_id
            )))
        }
    }
}

/// Operaciones reservadas al admin de plataforma
pub fn ensure_platform_admin(principal: &Principal) -> AppResult<()> {
    if principal.is_platform_admin() {
        Ok(())
    } else {
        Err(AppError::Unauthorized(format!(
            "user {} is not a platform administrator",
            principal.user_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_principal_only_reaches_its_garage() {
        let staff = Principal::scoped(7, 1);
        assert_eq!(authorize(&staff, 1), Access::Allowed);
        assert_eq!(authorize(&staff, 2), Access::Denied);
    }

    #[test]
    fn test_platform_admin_reaches_every_garage() {
        let admin = Principal::platform_admin(1);
        assert_eq!(authorize(&admin, 1), Access::Allowed);
        assert_eq!(authorize(&admin, 999), Access::Allowed);
        assert!(ensure_platform_admin(&admin).is_ok());
    }

    #[test]
    fn test_denial_is_unauthorized() {
        let staff = Principal::scoped(7, 1);
        assert!(matches!(ensure(&staff, 2, "invoice"), Err(AppError::Unauthorized(_))));
        assert!(matches!(ensure_platform_admin(&staff), Err(AppError::Unauthorized(_))));
    }
}

//! Política de acceso por rol
//!
//! Tabla única feature × acción → roles. El servidor la aplica en cada
//! handler protegido y `GET /api/access` la sirve al UI para decidir qué
//! navegación mostrar.

use serde::{Deserialize, Serialize};

use crate::models::user::Role;
use crate::utils::errors::{forbidden_error, AppResult};

/// Áreas funcionales de la aplicación
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feature {
    Dashboard,
    Customers,
    JobCards,
    Mechanics,
    Items,
    Billing,
    Expenses,
    Users,
    GarageProfile,
    Permissions,
    Reminders,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Write,
    Delete,
}

impl Feature {
    pub const ALL: [Feature; 11] = [
        Feature::Dashboard,
        Feature::Customers,
        Feature::JobCards,
        Feature::Mechanics,
        Feature::Items,
        Feature::Billing,
        Feature::Expenses,
        Feature::Users,
        Feature::GarageProfile,
        Feature::Permissions,
        Feature::Reminders,
    ];
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Read, Action::Write, Action::Delete];

    fn verb(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
            Action::Delete => "delete",
        }
    }
}

const EVERYONE: &[Role] = &[Role::Admin, Role::Mechanic, Role::User];
const OFFICE: &[Role] = &[Role::Admin, Role::User];
const ADMIN: &[Role] = &[Role::Admin];
const NOBODY: &[Role] = &[];

/// Roles autorizados para una acción sobre una feature
pub fn allowed_roles(feature: Feature, action: Action) -> &'static [Role] {
    use Action::*;
    use Feature::*;

    match (feature, action) {
        (Dashboard, Read) => EVERYONE,
        (Dashboard, _) => NOBODY,

        (Customers, Read) => EVERYONE,
        (Customers, Write) => OFFICE,
        (Customers, Delete) => ADMIN,

        (JobCards, Read) | (JobCards, Write) => EVERYONE,
        (JobCards, Delete) => ADMIN,

        (Mechanics, Read) => EVERYONE,
        (Mechanics, _) => ADMIN,

        (Items, Read) => EVERYONE,
        (Items, Write) => OFFICE,
        (Items, Delete) => ADMIN,

        (Billing, Read) | (Billing, Write) => OFFICE,
        (Billing, Delete) => ADMIN,

        (Expenses, Read) | (Expenses, Write) => OFFICE,
        (Expenses, Delete) => ADMIN,

        (Users, _) => ADMIN,

        (GarageProfile, Read) => EVERYONE,
        (GarageProfile, _) => ADMIN,

        (Permissions, _) => ADMIN,

        (Reminders, Read) | (Reminders, Write) => ADMIN,
        (Reminders, Delete) => NOBODY,
    }
}

pub fn is_allowed(role: Role, feature: Feature, action: Action) -> bool {
    allowed_roles(feature, action).contains(&role)
}

/// Falla con 403 si el rol no puede realizar la acción
pub fn authorize(role: Role, feature: Feature, action: Action) -> AppResult<()> {
    if is_allowed(role, feature, action) {
        Ok(())
    } else {
        Err(forbidden_error(
            &format!("{} {:?}", action.verb(), feature),
            &format!("role '{}' is not allowed", role),
        ))
    }
}

/// Acciones permitidas sobre una feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureAccess {
    pub feature: Feature,
    pub actions: Vec<Action>,
}

/// Todo lo que un rol puede hacer; features sin acciones se omiten
pub fn allowed_features(role: Role) -> Vec<FeatureAccess> {
    Feature::ALL
        .iter()
        .filter_map(|&feature| {
            let actions: Vec<Action> = Action::ALL
                .iter()
                .copied()
                .filter(|&action| is_allowed(role, feature, action))
                .collect();
            (!actions.is_empty()).then_some(FeatureAccess { feature, actions })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::errors::AppError;

    #[test]
    fn test_admin_can_do_everything_assigned() {
        for feature in Feature::ALL {
            assert!(is_allowed(Role::Admin, feature, Action::Read), "{:?}", feature);
        }
        assert!(is_allowed(Role::Admin, Feature::Users, Action::Delete));
    }

    #[test]
    fn test_mechanic_cannot_manage_users_or_billing() {
        assert!(!is_allowed(Role::Mechanic, Feature::Users, Action::Delete));
        assert!(!is_allowed(Role::Mechanic, Feature::Billing, Action::Read));
        assert!(is_allowed(Role::Mechanic, Feature::JobCards, Action::Write));
        assert!(!is_allowed(Role::Mechanic, Feature::JobCards, Action::Delete));
    }

    #[test]
    fn test_user_role_is_office_staff() {
        assert!(is_allowed(Role::User, Feature::Billing, Action::Write));
        assert!(is_allowed(Role::User, Feature::Expenses, Action::Read));
        assert!(!is_allowed(Role::User, Feature::Expenses, Action::Delete));
        assert!(!is_allowed(Role::User, Feature::Permissions, Action::Read));
    }

    #[test]
    fn test_authorize_returns_forbidden() {
        let result = authorize(Role::Mechanic, Feature::Users, Action::Delete);
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(authorize(Role::Admin, Feature::Users, Action::Delete).is_ok());
    }

    #[test]
    fn test_allowed_features_for_mechanic() {
        let access = allowed_features(Role::Mechanic);
        let features: Vec<Feature> = access.iter().map(|a| a.feature).collect();
        assert!(features.contains(&Feature::JobCards));
        assert!(!features.contains(&Feature::Users));
        assert!(!features.contains(&Feature::Reminders));

        let dashboard = access.iter().find(|a| a.feature == Feature::Dashboard).unwrap();
        assert_eq!(dashboard.actions, vec![Action::Read]);
    }
}

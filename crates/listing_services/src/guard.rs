use account_services::types::Identity;
use uuid::Uuid;

use crate::types::{Campground, Comment, ListingError};

/// Outcome of the ownership check for a mutating request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The identity owns the resource or is an administrator
    Allow,
    /// No authenticated identity on the request
    DenyUnauthenticated,
    /// The claimed resource does not exist
    DenyNotFound,
    /// The identity is neither the owner nor an administrator
    DenyForbidden,
}

/// Implemented by resources that carry a single owning account.
pub trait Owned {
    /// The ID of the account that owns this resource.
    fn owner_id(&self) -> Uuid;
}

impl Owned for Campground {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Decides whether a mutating request may proceed.
///
/// Evaluated against a fresh fetch on every mutating request; the result is
/// never cached, so a transferred or deleted resource is re-checked against
/// current state.
pub fn authorize<R: Owned>(identity: Option<&Identity>, resource: Option<&R>) -> Access {
    let Some(identity) = identity else {
        return Access::DenyUnauthenticated;
    };

    let Some(resource) = resource else {
        return Access::DenyNotFound;
    };

    if resource.owner_id() == identity.id || identity.is_admin {
        Access::Allow
    } else {
        Access::DenyForbidden
    }
}

impl Access {
    /// Converts a deny into the matching error, naming the resource for the
    /// not-found case.
    pub fn into_result(self, resource: &'static str) -> Result<(), ListingError> {
        match self {
            Access::Allow => Ok(()),
            Access::DenyUnauthenticated => Err(ListingError::Unauthenticated),
            Access::DenyNotFound => Err(ListingError::NotFound(resource)),
            Access::DenyForbidden => Err(ListingError::Forbidden),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn identity(id: Uuid, is_admin: bool) -> Identity {
        Identity {
            id,
            username: "camper".to_string(),
            is_admin,
            is_paid: true,
        }
    }

    fn campground(owner_id: Uuid) -> Campground {
        Campground {
            id: Uuid::new_v4(),
            name: "Granite Flats".to_string(),
            price: 12.5,
            description: "Creekside sites under the pines".to_string(),
            location: None,
            latitude: None,
            longitude: None,
            image_url: None,
            image_public_id: None,
            owner_id,
            owner_username: "owner".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn comment(owner_id: Uuid) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            campground_id: Uuid::new_v4(),
            body: "Great spot".to_string(),
            owner_id,
            owner_username: "owner".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_is_allowed() {
        let owner = Uuid::new_v4();
        let access = authorize(Some(&identity(owner, false)), Some(&campground(owner)));

        assert_eq!(access, Access::Allow);
    }

    #[test]
    fn test_admin_is_allowed_on_foreign_resource() {
        let access = authorize(
            Some(&identity(Uuid::new_v4(), true)),
            Some(&campground(Uuid::new_v4())),
        );

        assert_eq!(access, Access::Allow);
    }

    #[test]
    fn test_non_owner_is_forbidden() {
        let access = authorize(
            Some(&identity(Uuid::new_v4(), false)),
            Some(&campground(Uuid::new_v4())),
        );

        assert_eq!(access, Access::DenyForbidden);
    }

    #[test]
    fn test_anonymous_is_denied_before_existence_is_checked() {
        let access = authorize::<Campground>(None, None);
        assert_eq!(access, Access::DenyUnauthenticated);

        // Even when the resource exists, absence of identity wins
        let access = authorize(None, Some(&campground(Uuid::new_v4())));
        assert_eq!(access, Access::DenyUnauthenticated);
    }

    #[test]
    fn test_missing_resource_is_not_found_for_any_identity() {
        let access = authorize::<Campground>(Some(&identity(Uuid::new_v4(), false)), None);
        assert_eq!(access, Access::DenyNotFound);

        let access = authorize::<Campground>(Some(&identity(Uuid::new_v4(), true)), None);
        assert_eq!(access, Access::DenyNotFound);
    }

    #[test]
    fn test_guard_applies_to_comments_the_same_way() {
        let owner = Uuid::new_v4();

        assert_eq!(
            authorize(Some(&identity(owner, false)), Some(&comment(owner))),
            Access::Allow
        );
        assert_eq!(
            authorize(Some(&identity(Uuid::new_v4(), false)), Some(&comment(owner))),
            Access::DenyForbidden
        );
    }

    #[test]
    fn test_into_result_maps_denials() {
        assert!(Access::Allow.into_result("Campground").is_ok());
        assert!(matches!(
            Access::DenyUnauthenticated.into_result("Campground"),
            Err(ListingError::Unauthenticated)
        ));
        assert!(matches!(
            Access::DenyNotFound.into_result("Comment"),
            Err(ListingError::NotFound("Comment"))
        ));
        assert!(matches!(
            Access::DenyForbidden.into_result("Campground"),
            Err(ListingError::Forbidden)
        ));
    }
}

use thiserror::Error;

/// Failure while registering a router or endpoint with the host.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The root router has an empty base.
    #[error("No api namespace specified in the parent router")]
    MissingNamespace,

    /// The root router has an empty version.
    #[error("No api version specified in the parent router")]
    MissingVersion,

    /// `has_cap` was given an empty capability.
    #[error("Invalid capability. Empty capability given")]
    EmptyCapability {
        /// Route of the offending endpoint.
        route: String,
    },

    /// The host refused the route.
    #[error("Unable to register route {route}: {reason}")]
    Rejected {
        /// Full route that was refused.
        route: String,
        /// Why the host refused it.
        reason: String,
    },
}

// Identity provider and profile store: the account-side collaborators.

pub mod cognito;
pub mod profiles;
pub mod traits;

pub use traits::{IdentityProvider, ProfileStore, ProfileWrite};

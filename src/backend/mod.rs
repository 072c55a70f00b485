//! Hosted backend boundary: ports, the REST client and an in-memory stand-in.

pub mod errors;
pub mod memory;
pub mod rest;
pub mod traits;

pub use errors::BackendError;
pub use memory::{BackendCall, BackendOperation, InMemoryBackend};
pub use rest::RestBackend;
pub use traits::{
    DataRoomStore, InvitationStore, ObjectStorage, ObjectUpload, OnboardingProcedure,
    OnboardingTransaction, OrganizationStore, ProfileStore, StoredObject,
};

#[cfg(any(test, feature = "testing"))]
pub use traits::{
    MockDataRoomStore, MockInvitationStore, MockObjectStorage, MockOnboardingProcedure,
    MockOrganizationStore, MockProfileStore,
};
